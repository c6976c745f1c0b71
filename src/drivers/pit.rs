//! Driver do PIT (Programmable Interval Timer) - Intel 8253/8254.
//!
//! Heartbeat do kernel: o canal 0 gera a IRQ 0 na frequência configurada e
//! `timer_tick` (registrado na IRQ 0 pelo `Kernel::init`) incrementa o
//! contador global de ticks.
//!
//! # Limitações
//! - Frequência base fixa de ~1.19 MHz.
//! - Divisor de 16 bits: frequências abaixo de ~18.2 Hz não são possíveis.

use crate::arch::TrapFrame;
use crate::core::time::TickSource;
use crate::sys::Errno;
use core::sync::atomic::{AtomicU64, Ordering};

/// Frequência base do oscilador do PIT (1.193182 MHz).
pub const BASE_FREQUENCY: u32 = 1_193_182;

// Portas de I/O do PIT
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const PORT_CHANNEL0: u16 = 0x40; // Canal 0 (System Timer)
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const PORT_COMMAND: u16 = 0x43; // Registrador de Comando

/// Canal 0, acesso lobyte/hibyte, modo 3 (onda quadrada), binário
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const CMD_SQUARE_WAVE: u8 = 0x36;

/// Contador global de ticks do sistema (Monotonic Clock).
/// Incrementado a cada interrupção do timer.
pub static TICKS: AtomicU64 = AtomicU64::new(0);

/// Calcula o divisor do canal 0 para `freq` Hz.
///
/// Retorna `(divisor, frequência real)`.
pub fn divisor_for(freq: u32) -> Result<(u16, u32), Errno> {
    if freq == 0 || freq > BASE_FREQUENCY {
        crate::kwarn!("(PIT) Frequência inválida: ", freq);
        return Err(Errno::EINVAL);
    }

    let divisor = BASE_FREQUENCY / freq;
    if divisor > u16::MAX as u32 {
        crate::kwarn!("(PIT) Divisor muito grande para a frequência ", freq);
        return Err(Errno::EINVAL);
    }

    Ok((divisor as u16, BASE_FREQUENCY / divisor))
}

/// Programa o canal 0 para `freq` Hz. Retorna a frequência real.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn init(freq: u32) -> Result<u32, Errno> {
    use crate::arch::x86::ports::outb;

    let (divisor, actual) = divisor_for(freq)?;
    crate::ktrace!("(PIT) init: divisor=", divisor);

    outb(PORT_COMMAND, CMD_SQUARE_WAVE);
    outb(PORT_CHANNEL0, (divisor & 0xFF) as u8);
    outb(PORT_CHANNEL0, (divisor >> 8) as u8);

    crate::kinfo!("(PIT) Frequência configurada (Hz): ", actual);
    Ok(actual)
}

/// Handler da IRQ 0.
pub fn timer_tick(_frame: &mut TrapFrame) {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

/// Ticks desde o boot.
#[inline]
pub fn ticks() -> u64 {
    TICKS.load(Ordering::Relaxed)
}

/// Fonte de tempo do sistema apoiada no contador do PIT.
pub struct SystemTimer;

impl TickSource for SystemTimer {
    fn ticks(&self) -> u64 {
        ticks()
    }
}
