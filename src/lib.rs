//! Ember Kernel Core.
//!
//! Ponto central de exportação dos módulos do núcleo do Ember.
//! Reúne os três subsistemas que carregam os invariantes críticos do kernel:
//!
//! - `interrupts`: registro de handlers por vetor e despacho de exceções/IRQs.
//! - `mm`: alocador de boot (bump) substituído pelo heap quando instalado.
//! - `fs`: camada de vnodes com contagem de referências e tabela de operações.
//!
//! Em testes (`cargo test`) o crate é compilado com `std` no host e a CPU é
//! substituída por um mock (`arch::test::MockCpu`).

#![cfg_attr(not(test), no_std)]

// --- Módulos de Baixo Nível (Hardware) ---
pub mod arch; // HAL (CPU, IDT, Portas, TrapFrame)
pub mod drivers; // Drivers de colaboradores (Serial, PIC, PIT, Device)

// --- Módulos Centrais ---
pub mod core; // Logging, Tempo, Contexto global, Panic
pub mod sync; // Seção crítica + Spinlock
pub mod sys; // Códigos de erro (Errno)

// --- Subsistemas ---
pub mod fs; // Camada de Vnodes
pub mod interrupts; // Registro e Despacho de Interrupções
pub mod mm; // Alocador de Boot / Heap

pub use crate::core::context::{BootConfig, Kernel};
