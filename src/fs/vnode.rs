//! Vnode - nó genérico da camada de arquivos.
//!
//! # Ciclo de vida
//!
//! ```text
//! init (refcount = 1) → incref/decref ... → decref até 0 → reclaim → Bad
//!                                   kill ─────────────────→ reclaim → Bad
//! ```
//!
//! Um nó `Bad` não aceita mais operações: usar um vnode depois do reclaim é
//! bug de kernel e entra em pânico, assim como decrementar uma contagem já
//! zerada.

use super::ops::VnodeOps;
use super::{FileSystem, FsError, FsResult, OpenFlags};
use crate::sync::without_interrupts;
use crate::sys::Errno;
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicU32, AtomicU8, Ordering};

/// Tipo do nó
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VnodeKind {
    Regular = 0,
    Directory = 1,
    CharDevice = 2,
    BlockDevice = 3,
    Symlink = 4,
    Fifo = 5,
    /// Nó invalidado (reclaim feito)
    Bad = 6,
}

impl VnodeKind {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Regular,
            1 => Self::Directory,
            2 => Self::CharDevice,
            3 => Self::BlockDevice,
            4 => Self::Symlink,
            5 => Self::Fifo,
            _ => Self::Bad,
        }
    }
}

/// Vnode
pub struct Vnode {
    /// Tipo do nó
    kind: AtomicU8,
    /// Referências vivas
    refcount: AtomicU32,
    /// Sistema de arquivos dono (não-owning)
    fs: Option<&'static dyn FileSystem>,
    /// Dados do backend (o backend é dono)
    data: AtomicPtr<()>,
    /// Operações do backend
    ops: &'static dyn VnodeOps,
}

impl Vnode {
    /// Cria um nó `Regular` com uma referência.
    ///
    /// Sem tabela de operações o nó não é criado.
    pub fn init(
        ops: Option<&'static dyn VnodeOps>,
        fs: Option<&'static dyn FileSystem>,
        data: *mut (),
    ) -> FsResult<Self> {
        let Some(ops) = ops else {
            crate::kerror!("(VFS) vnode_init: tabela de operações ausente");
            return Err(FsError::MissingOps);
        };

        Ok(Self {
            kind: AtomicU8::new(VnodeKind::Regular as u8),
            refcount: AtomicU32::new(1),
            fs,
            data: AtomicPtr::new(data),
            ops,
        })
    }

    // =========================================================================
    // ACESSORES
    // =========================================================================

    pub fn kind(&self) -> VnodeKind {
        VnodeKind::from_u8(self.kind.load(Ordering::Acquire))
    }

    pub fn set_kind(&self, kind: VnodeKind) {
        self.assert_alive("set_kind");
        self.kind.store(kind as u8, Ordering::Release);
    }

    pub fn is_bad(&self) -> bool {
        self.kind() == VnodeKind::Bad
    }

    pub fn refcount(&self) -> u32 {
        self.refcount.load(Ordering::Acquire)
    }

    pub fn fs(&self) -> Option<&'static dyn FileSystem> {
        self.fs
    }

    pub fn data(&self) -> *mut () {
        self.data.load(Ordering::Acquire)
    }

    pub fn set_data(&self, data: *mut ()) {
        self.data.store(data, Ordering::Release);
    }

    pub fn ops(&self) -> &'static dyn VnodeOps {
        self.ops
    }

    // =========================================================================
    // REFERÊNCIAS
    // =========================================================================

    pub fn incref(&self) {
        without_interrupts(|| {
            self.assert_alive("incref");
            let prev = self.refcount.load(Ordering::Relaxed);
            self.refcount.store(prev + 1, Ordering::Release);
        });
    }

    /// Solta uma referência; a última dispara o reclaim do backend.
    pub fn decref(&self) {
        let last = without_interrupts(|| {
            let prev = self.refcount.load(Ordering::Acquire);
            if prev == 0 {
                crate::kerror!("(VFS) Refcount underflow; vnode em ", self as *const Self as usize);
                panic!("vnode refcount underflow ({:p})", self);
            }
            self.refcount.store(prev - 1, Ordering::Release);
            prev == 1
        });

        if last {
            self.invalidate();
        }
    }

    /// Invalida o nó imediatamente, independente das referências.
    pub fn kill(&self) {
        if !self.is_bad() {
            crate::kdebug!("(VFS) vnode_kill: refs=", self.refcount());
            self.invalidate();
        }
    }

    fn invalidate(&self) {
        if self.is_bad() {
            return;
        }

        if let Err(errno) = self.ops.reclaim(self) {
            crate::kwarn!("(VFS) reclaim falhou: errno=", errno as i32);
        }
        self.kind.store(VnodeKind::Bad as u8, Ordering::Release);
        self.data.store(ptr::null_mut(), Ordering::Release);
    }

    // =========================================================================
    // DIAGNÓSTICO
    // =========================================================================

    /// Devolve a entrada da operação `op`; ausente é fatal.
    pub fn check<F>(&self, op: &str, entry: Option<F>) -> F {
        match entry {
            Some(f) => f,
            None => self.missing_op(op),
        }
    }

    fn missing_op(&self, op: &str) -> ! {
        crate::kerror!("(VFS) Operação de vnode ausente:");
        crate::kerror!(op);
        crate::kerror!("(VFS) vnode em ", self as *const Self as usize);
        panic!("vnode operation `{}` missing ({:p})", op, self);
    }

    fn assert_alive(&self, op: &str) {
        if self.is_bad() || self.refcount.load(Ordering::Acquire) == 0 {
            crate::kerror!("(VFS) vnode usado após reclaim:");
            crate::kerror!(op);
            crate::kerror!("(VFS) vnode em ", self as *const Self as usize);
            panic!("vnode used after reclaim: {} ({:p})", op, self);
        }
    }

    // =========================================================================
    // DESPACHO
    // =========================================================================

    pub fn open(&self, flags: OpenFlags) -> Result<(), Errno> {
        self.assert_alive("open");
        self.ops.open(self, flags)
    }

    pub fn close(&self) -> Result<(), Errno> {
        self.assert_alive("close");
        self.ops.close(self)
    }

    pub fn read(&self, offset: u32, buf: &mut [u8]) -> Result<usize, Errno> {
        self.assert_alive("read");
        self.ops.read(self, offset, buf)
    }

    pub fn write(&self, offset: u32, buf: &[u8]) -> Result<usize, Errno> {
        self.assert_alive("write");
        self.ops.write(self, offset, buf)
    }

    pub fn lookup(&self, name: &str) -> Result<&'static Vnode, Errno> {
        self.assert_alive("lookup");
        self.ops.lookup(self, name)
    }
}

impl core::fmt::Debug for Vnode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Vnode")
            .field("kind", &self.kind())
            .field("refcount", &self.refcount())
            .field("data", &self.data())
            .finish()
    }
}
