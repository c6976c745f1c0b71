//! Implementação x86

pub mod cpu;
pub mod frame;
pub mod idt;
pub mod ports;

#[cfg(target_arch = "x86")]
pub mod entry;

pub use cpu::X86Cpu as Cpu;
pub use frame::TrapFrame;
