//! # Synchronization Primitives
//!
//! Primitivas de sincronização para o modelo single-core do núcleo.
//!
//! ```text
//! InterruptGuard → Seção crítica (cli/sti com estado salvo)
//! Spinlock       → Seção crítica + test-and-set
//! ```
//!
//! ## Regras
//!
//! - Todo estado compartilhado com handlers de interrupção fica atrás de `Spinlock`.
//! - Nunca invocar handlers registrados com um `Spinlock` adquirido.

/// Seção crítica (interrupções desabilitadas)
pub mod critical;

/// Spinlock (busy-wait, não dorme)
pub mod spinlock;

#[cfg(test)]
mod test;

pub use critical::{without_interrupts, InterruptGuard};
pub use spinlock::{Spinlock, SpinlockGuard};
