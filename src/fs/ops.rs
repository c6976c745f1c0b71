//! Operações de vnode.
//!
//! Backends implementam `VnodeOps` diretamente, ou preenchem uma `OpTable`
//! (ponteiros de função opcionais). Na tabela, invocar uma entrada ausente é
//! fatal: `Vnode::check` entra em pânico nomeando a operação e o nó.

use super::vnode::Vnode;
use super::OpenFlags;
use crate::sys::Errno;

/// Contrato de um backend de vnodes.
///
/// Valores de retorno são definidos pelo backend.
pub trait VnodeOps: Sync {
    fn open(&self, node: &Vnode, flags: OpenFlags) -> Result<(), Errno>;

    fn close(&self, node: &Vnode) -> Result<(), Errno>;

    /// Libera os recursos do backend quando a última referência cai.
    fn reclaim(&self, node: &Vnode) -> Result<(), Errno>;

    /// Lê a partir de `offset`. Retorna bytes lidos.
    fn read(&self, node: &Vnode, offset: u32, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Escreve a partir de `offset`. Retorna bytes escritos.
    fn write(&self, node: &Vnode, offset: u32, buf: &[u8]) -> Result<usize, Errno>;

    /// Procura `name` no diretório `node`.
    fn lookup(&self, node: &Vnode, name: &str) -> Result<&'static Vnode, Errno>;
}

pub type OpenFn = fn(&Vnode, OpenFlags) -> Result<(), Errno>;
pub type CloseFn = fn(&Vnode) -> Result<(), Errno>;
pub type ReclaimFn = fn(&Vnode) -> Result<(), Errno>;
pub type ReadFn = fn(&Vnode, u32, &mut [u8]) -> Result<usize, Errno>;
pub type WriteFn = fn(&Vnode, u32, &[u8]) -> Result<usize, Errno>;
pub type LookupFn = fn(&Vnode, &str) -> Result<&'static Vnode, Errno>;

/// Tabela de operações com entradas opcionais.
#[derive(Clone, Copy)]
pub struct OpTable {
    pub open: Option<OpenFn>,
    pub close: Option<CloseFn>,
    pub reclaim: Option<ReclaimFn>,
    pub read: Option<ReadFn>,
    pub write: Option<WriteFn>,
    pub lookup: Option<LookupFn>,
}

impl OpTable {
    /// Tabela sem nenhuma operação.
    pub const EMPTY: Self = Self {
        open: None,
        close: None,
        reclaim: None,
        read: None,
        write: None,
        lookup: None,
    };
}

impl Default for OpTable {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl VnodeOps for OpTable {
    fn open(&self, node: &Vnode, flags: OpenFlags) -> Result<(), Errno> {
        node.check("open", self.open)(node, flags)
    }

    fn close(&self, node: &Vnode) -> Result<(), Errno> {
        node.check("close", self.close)(node)
    }

    fn reclaim(&self, node: &Vnode) -> Result<(), Errno> {
        node.check("reclaim", self.reclaim)(node)
    }

    fn read(&self, node: &Vnode, offset: u32, buf: &mut [u8]) -> Result<usize, Errno> {
        node.check("read", self.read)(node, offset, buf)
    }

    fn write(&self, node: &Vnode, offset: u32, buf: &[u8]) -> Result<usize, Errno> {
        node.check("write", self.write)(node, offset, buf)
    }

    fn lookup(&self, node: &Vnode, name: &str) -> Result<&'static Vnode, Errno> {
        node.check("lookup", self.lookup)(node, name)
    }
}
