//! # Hardware Abstraction Layer (HAL)
//!
//! Única ponte entre o núcleo (lógica agnóstica) e o hardware real.
//!
//! 1. O núcleo importa `crate::arch::Cpu`.
//! 2. `Cpu` é um *type alias* para a implementação concreta (`x86::X86Cpu`).
//! 3. Em `cfg(test)` o alias aponta para `test::MockCpu`, que roda no host:
//!    `cli`/`sti` viram flags por thread e `hang()` vira `panic!`.

pub mod traits;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod x86;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use x86 as platform;


#[cfg(not(test))]
pub use platform::Cpu;
#[cfg(test)]
pub use test::MockCpu as Cpu;

pub use platform::TrapFrame;
pub use traits::*;
