//! Tempo do kernel: ticks do timer e espera ativa.

use crate::drivers::pit::SystemTimer;

/// Frequência padrão do timer do sistema (Hz)
pub const TIMER_FREQ: u32 = 1000;

/// Fonte monotônica de ticks.
pub trait TickSource: Sync {
    fn ticks(&self) -> u64;
}

/// Converte milissegundos em ticks, arredondando para cima.
#[inline]
pub fn ms_to_ticks(ms: u64, frequency: u32) -> u64 {
    (ms * frequency as u64).div_ceil(1000)
}

/// Espera ativa de `ms` milissegundos contra `source`.
///
/// Não segura nenhum lock: os ticks precisam continuar chegando.
pub fn sleep_on(source: &dyn TickSource, frequency: u32, ms: u64) {
    let target = source.ticks().saturating_add(ms_to_ticks(ms, frequency));
    while source.ticks() < target {
        core::hint::spin_loop();
    }
}

/// Ticks desde o boot.
pub fn get_ticks_count() -> u64 {
    SystemTimer.ticks()
}

/// Espera ativa de `ms` milissegundos no timer do sistema.
pub fn sleep(ms: u64) {
    let frequency = crate::core::context::KERNEL.timer_frequency();
    sleep_on(&SystemTimer, frequency, ms);
}
