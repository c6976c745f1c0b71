//! Heap geral do kernel.
//!
//! Instalado no `KernelAllocator` quando a paginação já mapeou a região do
//! heap. `free` recebe só o endereço (como `kfree`), então cada bloco carrega
//! um cabeçalho com o `Layout` usado na alocação.

use super::error::{MmError, MmResult};
use core::alloc::Layout;
use core::mem::{align_of, size_of};
use core::ptr::NonNull;
use linked_list_allocator::Heap;

/// Contrato do heap instalado atrás do alocador do kernel.
pub trait KernelHeap: Send {
    /// Aloca `size` bytes alinhados a `align` (0 = sem requisito).
    fn alloc(&mut self, size: usize, align: usize) -> Option<usize>;

    /// Libera um bloco devolvido por `alloc`.
    fn free(&mut self, addr: usize) -> MmResult<()>;
}

/// Cabeçalho gravado imediatamente antes do endereço devolvido.
#[repr(C)]
#[derive(Clone, Copy)]
struct BlockHeader {
    /// Layout do bloco inteiro (cabeçalho + padding + dados)
    size: usize,
    align: usize,
}

const HEADER_SIZE: usize = size_of::<BlockHeader>();

/// Heap first-fit sobre `linked_list_allocator`.
pub struct LinkedHeap {
    inner: Heap,
}

impl LinkedHeap {
    pub const fn empty() -> Self {
        Self { inner: Heap::empty() }
    }

    /// Cria o heap sobre `[start, start + size)`.
    ///
    /// # Safety
    /// A região precisa estar mapeada, gravável e sem outro dono.
    pub unsafe fn new(start: usize, size: usize) -> Self {
        crate::kdebug!("(Heap) Região em ", start);
        crate::kdebug!("(Heap) Tamanho ", size);
        Self {
            inner: Heap::new(start as *mut u8, size),
        }
    }

    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn used(&self) -> usize {
        self.inner.used()
    }

    /// Deslocamento dos dados dentro do bloco: cabe o cabeçalho e respeita
    /// o alinhamento pedido.
    fn data_offset(align: usize) -> usize {
        (HEADER_SIZE + align - 1) & !(align - 1)
    }
}

// SAFETY: o heap é dono exclusivo da região; todo acesso passa pelo
// `Spinlock` do `KernelAllocator`.
unsafe impl Send for LinkedHeap {}

impl KernelHeap for LinkedHeap {
    fn alloc(&mut self, size: usize, align: usize) -> Option<usize> {
        let align = align.max(align_of::<BlockHeader>());
        if !align.is_power_of_two() {
            crate::kwarn!("(Heap) Alinhamento inválido: ", align);
            return None;
        }

        let offset = Self::data_offset(align);
        let total = offset.checked_add(size)?;
        let layout = Layout::from_size_align(total, align).ok()?;

        let block = self.inner.allocate_first_fit(layout).ok()?;
        let data = block.as_ptr() as usize + offset;

        // SAFETY: `data - HEADER_SIZE` está dentro do bloco recém alocado e
        // alinhado a `align_of::<BlockHeader>()`.
        unsafe {
            ((data - HEADER_SIZE) as *mut BlockHeader).write(BlockHeader {
                size: total,
                align,
            });
        }

        Some(data)
    }

    fn free(&mut self, addr: usize) -> MmResult<()> {
        if addr < HEADER_SIZE || addr % align_of::<BlockHeader>() != 0 {
            return Err(MmError::InvalidParameter);
        }

        // SAFETY: `addr` veio de `alloc`, que gravou o cabeçalho logo antes.
        let header = unsafe { ((addr - HEADER_SIZE) as *const BlockHeader).read() };
        let layout = Layout::from_size_align(header.size, header.align)
            .map_err(|_| MmError::InvalidParameter)?;
        let block = addr - Self::data_offset(header.align);

        let ptr = NonNull::new(block as *mut u8).ok_or(MmError::InvalidParameter)?;
        // SAFETY: bloco e layout são exatamente os da alocação original.
        unsafe { self.inner.deallocate(ptr, layout) };
        Ok(())
    }
}
