//! Seção crítica - interrupções desabilitadas durante uma região de código.
//!
//! Em single-core, os únicos atores concorrentes são o fluxo normal do kernel
//! e os handlers de interrupção. Desabilitar interrupções basta para que um
//! handler nunca observe uma estrutura no meio de uma mutação.

use crate::arch::{Cpu, CpuOps};

/// Guard de seção crítica.
///
/// Salva o estado do Interrupt Flag, executa `cli` e, ao sair do escopo,
/// restaura o estado salvo (só reabilita se estava habilitado). Aninhar
/// guards é seguro: o guard interno não reabilita nada.
pub struct InterruptGuard {
    were_enabled: bool,
}

impl InterruptGuard {
    /// Entra na seção crítica.
    #[inline]
    pub fn new() -> Self {
        let were_enabled = Cpu::are_interrupts_enabled();
        Cpu::disable_interrupts();
        Self { were_enabled }
    }

    /// As interrupções estavam habilitadas antes do guard?
    #[inline]
    pub fn were_enabled(&self) -> bool {
        self.were_enabled
    }
}

impl Default for InterruptGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InterruptGuard {
    #[inline]
    fn drop(&mut self) {
        if self.were_enabled {
            Cpu::enable_interrupts();
        }
    }
}

/// Executa `f` com interrupções desabilitadas.
///
/// O estado anterior é restaurado em qualquer caminho de saída, inclusive
/// retornos antecipados dentro de `f`.
#[inline]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = InterruptGuard::new();
    f()
}
