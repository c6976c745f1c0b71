//! # Memory Management Subsystem (MM)
//!
//! Alocação de memória do kernel, do boot até o heap.
//!
//! | Módulo    | Responsabilidade                                        |
//! |-----------|---------------------------------------------------------|
//! | `kmalloc` | Alocador em duas fases (placement → heap)               |
//! | `heap`    | Contrato `KernelHeap` + heap first-fit (`LinkedHeap`)   |
//! | `paging`  | Tradução virtual → física (`PageResolver`)              |
//! | `config`  | Constantes de tamanho                                   |
//! | `error`   | `MmError` / `MmResult`                                  |
//!
//! ## Ordem de inicialização
//!
//! 1. `KernelAllocator::setup` com o fim da imagem do kernel (boot).
//! 2. Estruturas de boot (page tables, IDT) saem do placement.
//! 3. `KernelAllocator::install_heap` quando a região do heap está mapeada.

pub mod config;
pub mod error;
pub mod heap;
pub mod kmalloc;
pub mod paging;


pub use config::{FRAME_SIZE, PAGE_OFFSET_MASK};
pub use error::{MmError, MmResult};
pub use heap::{KernelHeap, LinkedHeap};
pub use kmalloc::{Allocation, KernelAllocator};
pub use paging::{PageEntry, PageFlags, PageResolver};
