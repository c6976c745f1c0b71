//! Traits do Hardware Abstraction Layer (HAL).
//! Interfaces públicas que o núcleo usa para falar com a CPU.

pub mod cpu;

// Re-exportar para facilitar uso: `use crate::arch::traits::CpuOps;`
pub use cpu::CpuOps;
