//! Camada de Vnodes.
//!
//! Submódulos:
//! - `vnode`: o nó, sua contagem de referências e o despacho de operações.
//! - `ops`: contrato `VnodeOps` dos backends e a tabela C-style `OpTable`.
//! - `devnode`: backend que expõe um `drivers::device::Device` como vnode.
//!
//! Nenhum sistema de arquivos concreto vive aqui; backends implementam
//! `VnodeOps` e, opcionalmente, `FileSystem`.

pub mod devnode;
pub mod ops;
pub mod vnode;

#[cfg(test)]
mod test;

pub use devnode::DeviceNode;
pub use ops::{OpTable, VnodeOps};
pub use vnode::{Vnode, VnodeKind};

use crate::sys::Errno;
use bitflags::bitflags;

bitflags! {
    /// Flags de abertura repassadas a `VnodeOps::open`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OpenFlags: u16 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const APPEND = 1 << 2;
        const CREATE = 1 << 3;
        const TRUNCATE = 1 << 4;
        const EXCLUSIVE = 1 << 5;
        const NONBLOCK = 1 << 6;
        const DIRECTORY = 1 << 7;
    }
}

impl OpenFlags {
    pub const READ_WRITE: Self = Self::READ.union(Self::WRITE);
}

/// Sistema de arquivos dono de um conjunto de vnodes.
pub trait FileSystem: Sync {
    /// Nome do tipo (ex: "devfs")
    fn name(&self) -> &str;

    /// Vnode raiz, se montado.
    fn root(&self) -> Option<&'static Vnode>;
}

/// Erro de construção/uso da camada de vnodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// Vnode criado sem tabela de operações
    MissingOps,
    /// Erro devolvido pelo backend
    Backend(Errno),
}

impl FsError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingOps => "Vnode sem tabela de operações",
            Self::Backend(errno) => errno.as_str(),
        }
    }
}

impl From<Errno> for FsError {
    fn from(errno: Errno) -> Self {
        Self::Backend(errno)
    }
}

impl core::fmt::Display for FsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type FsResult<T> = Result<T, FsError>;
