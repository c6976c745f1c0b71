//! # Configuração do Módulo de Memória
//!
//! Constantes de tamanho usadas pelo alocador do kernel.

/// Tamanho de um frame físico / página (4 KiB)
pub const FRAME_SIZE: usize = 4096;

/// Bits de offset dentro de uma página
pub const PAGE_OFFSET_BITS: usize = 12;

/// Máscara do offset dentro da página
pub const PAGE_OFFSET_MASK: usize = FRAME_SIZE - 1;
