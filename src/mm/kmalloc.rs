//! Alocador do kernel em duas fases.
//!
//! 1. **Placement**: antes de existir heap, um cursor começa no fim da imagem
//!    do kernel e só avança. Nada é liberado; o físico é `cursor - voffset`
//!    (a imagem é mapeada linearmente a partir de `kernel_voffset`).
//! 2. **Heap**: depois de `install_heap`, toda alocação vai para o heap e o
//!    físico vem da page table do kernel. O cursor de placement congela.
//!
//! Toda entrada roda com interrupções desabilitadas (o estado fica atrás de
//! um `Spinlock`).

use super::config::FRAME_SIZE;
use super::error::{MmError, MmResult};
use super::heap::KernelHeap;
use super::paging::PageResolver;
use crate::sync::Spinlock;

/// Resultado de uma alocação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Endereço virtual do bloco
    pub virt: usize,
    /// Endereço físico, quando pedido
    pub phys: Option<usize>,
}

struct AllocatorState<H> {
    placement: usize,
    kernel_voffset: usize,
    placement_limit: Option<usize>,
    configured: bool,
    heap: Option<H>,
    resolver: Option<&'static dyn PageResolver>,
}

/// Alocador do kernel (placement → heap).
pub struct KernelAllocator<H: KernelHeap> {
    state: Spinlock<AllocatorState<H>>,
}

impl<H: KernelHeap> KernelAllocator<H> {
    /// Alocador ainda sem cursor; `setup` precisa rodar antes do uso.
    pub const fn new() -> Self {
        Self {
            state: Spinlock::new(AllocatorState {
                placement: 0,
                kernel_voffset: 0,
                placement_limit: None,
                configured: false,
                heap: None,
                resolver: None,
            }),
        }
    }

    /// Posiciona o cursor de placement no fim da imagem do kernel.
    ///
    /// `placement_limit` (exclusivo) limita a fase de placement; sem limite
    /// o cursor cresce livremente.
    pub fn setup(
        &self,
        kernel_end: usize,
        kernel_voffset: usize,
        placement_limit: Option<usize>,
    ) -> MmResult<()> {
        if kernel_end < kernel_voffset {
            return Err(MmError::InvalidParameter);
        }

        let mut state = self.state.lock();
        if state.configured {
            return Err(MmError::AlreadyInitialized);
        }

        state.placement = kernel_end;
        state.kernel_voffset = kernel_voffset;
        state.placement_limit = placement_limit;
        state.configured = true;

        crate::kdebug!("(MM) Placement a partir de ", kernel_end);
        Ok(())
    }

    /// Instala o heap geral. O cursor de placement congela daqui em diante.
    pub fn install_heap(&self, heap: H, resolver: &'static dyn PageResolver) -> MmResult<()> {
        let mut state = self.state.lock();
        if state.heap.is_some() {
            crate::kwarn!("(MM) install_heap: heap já instalado");
            return Err(MmError::AlreadyInitialized);
        }

        state.heap = Some(heap);
        state.resolver = Some(resolver);

        crate::kinfo!("(MM) Heap instalado; placement congelado em ", state.placement);
        Ok(())
    }

    pub fn has_heap(&self) -> bool {
        self.state.lock().heap.is_some()
    }

    /// Posição atual do cursor de placement.
    pub fn placement(&self) -> usize {
        self.state.lock().placement
    }

    /// Aloca `size` bytes.
    ///
    /// `alignment` 0 significa sem requisito. Com `want_physical` o endereço
    /// físico do início do bloco também é devolvido.
    pub fn allocate(
        &self,
        size: usize,
        alignment: usize,
        want_physical: bool,
    ) -> MmResult<Allocation> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(heap) = state.heap.as_mut() {
            let Some(virt) = heap.alloc(size, alignment) else {
                crate::kwarn!("(MM) Heap esgotado; tamanho pedido ", size);
                return Err(MmError::OutOfMemory);
            };

            let phys = if want_physical {
                let Some(entry) = state.resolver.and_then(|r| r.resolve_page(virt, false)) else {
                    // Sem físico o bloco não serve ao chamador: devolve ao heap
                    if heap.free(virt).is_err() {
                        crate::kerror!("(MM) Falha ao devolver bloco ao heap em ", virt);
                    }
                    crate::kwarn!("(MM) Bloco do heap sem mapeamento em ", virt);
                    return Err(MmError::NotMapped);
                };
                Some(entry.physical(virt))
            } else {
                None
            };

            crate::ktrace!("(MM) heap alloc em ", virt);
            return Ok(Allocation { virt, phys });
        }

        if !state.configured {
            crate::kerror!("(MM) Alocação antes do setup do placement");
            return Err(MmError::NotInitialized);
        }

        let mut cursor = state.placement;
        if alignment != 0 && cursor % alignment != 0 {
            cursor = (cursor - cursor % alignment)
                .checked_add(alignment)
                .ok_or(MmError::OutOfMemory)?;
        }

        let end = cursor.checked_add(size).ok_or(MmError::OutOfMemory)?;
        if let Some(limit) = state.placement_limit {
            if end > limit {
                crate::kwarn!("(MM) Placement esgotado; tamanho pedido ", size);
                return Err(MmError::OutOfMemory);
            }
        }

        let phys = want_physical.then(|| cursor - state.kernel_voffset);
        state.placement = end;

        crate::ktrace!("(MM) placement alloc em ", cursor);
        Ok(Allocation { virt: cursor, phys })
    }

    /// Libera um bloco do heap.
    ///
    /// Blocos da fase de placement nunca são liberados; sem heap instalado
    /// a chamada é recusada.
    pub fn free(&self, addr: usize) -> MmResult<()> {
        let mut state = self.state.lock();
        match state.heap.as_mut() {
            Some(heap) => heap.free(addr),
            None => {
                crate::kwarn!("(MM) kfree sem heap instalado: ", addr);
                Err(MmError::NotInitialized)
            }
        }
    }

    // =========================================================================
    // VARIANTES
    // =========================================================================

    pub fn kmalloc(&self, size: usize) -> MmResult<usize> {
        self.allocate(size, 0, false).map(|a| a.virt)
    }

    /// Alocação alinhada a frame.
    pub fn kmalloc_a(&self, size: usize) -> MmResult<usize> {
        self.allocate(size, FRAME_SIZE, false).map(|a| a.virt)
    }

    /// Retorna `(virtual, físico)`.
    pub fn kmalloc_p(&self, size: usize) -> MmResult<(usize, usize)> {
        self.allocate(size, 0, true).and_then(with_phys)
    }

    /// Alinhada a frame; retorna `(virtual, físico)`.
    pub fn kmalloc_ap(&self, size: usize) -> MmResult<(usize, usize)> {
        self.allocate(size, FRAME_SIZE, true).and_then(with_phys)
    }

    pub fn kfree(&self, addr: usize) -> MmResult<()> {
        self.free(addr)
    }
}

impl<H: KernelHeap> Default for KernelAllocator<H> {
    fn default() -> Self {
        Self::new()
    }
}

fn with_phys(a: Allocation) -> MmResult<(usize, usize)> {
    a.phys.map(|p| (a.virt, p)).ok_or(MmError::NotMapped)
}
