//! Tradução virtual → física no espaço de endereçamento do kernel.
//!
//! O alocador só precisa de uma operação da paginação: achar a entrada de
//! página de um endereço virtual para calcular o físico correspondente.

use super::config::{FRAME_SIZE, PAGE_OFFSET_BITS, PAGE_OFFSET_MASK};
use bitflags::bitflags;

bitflags! {
    /// Flags de uma entrada de page table i386.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PageFlags: u32 {
        const PRESENT = 1 << 0;
        const WRITABLE = 1 << 1;
        const USER = 1 << 2;
        const WRITE_THROUGH = 1 << 3;
        const NO_CACHE = 1 << 4;
        const ACCESSED = 1 << 5;
        const DIRTY = 1 << 6;
        const GLOBAL = 1 << 8;
    }
}

/// Entrada de page table decodificada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEntry {
    /// Número do frame físico
    pub frame: usize,
    pub flags: PageFlags,
}

impl PageEntry {
    pub const fn new(frame: usize, flags: PageFlags) -> Self {
        Self { frame, flags }
    }

    /// Decodifica uma PTE i386 crua (frame nos 20 bits altos).
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            frame: (raw >> PAGE_OFFSET_BITS) as usize,
            flags: PageFlags::from_bits_truncate(raw),
        }
    }

    pub fn is_present(&self) -> bool {
        self.flags.contains(PageFlags::PRESENT)
    }

    /// Endereço físico de `virt`, que deve pertencer a esta página.
    #[inline]
    pub fn physical(&self, virt: usize) -> usize {
        self.frame * FRAME_SIZE + (virt & PAGE_OFFSET_MASK)
    }
}

/// Resolve páginas do espaço de endereçamento do kernel.
pub trait PageResolver: Sync {
    /// Entrada de página que cobre `virt`.
    ///
    /// Com `create`, a tabela intermediária é criada se faltar.
    fn resolve_page(&self, virt: usize, create: bool) -> Option<PageEntry>;
}
