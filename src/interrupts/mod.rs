//! # Interrupts
//!
//! Registro de handlers por vetor e despacho de exceções/IRQs.
//!
//! ```text
//! vetor → stub (arch::x86::entry) → TrapFrame
//!       → InterruptManager::dispatch_fault / dispatch_irq
//!       → InterruptRegistry (cadeia do vetor) → handlers, em ordem de registro
//! ```
//!
//! ## Faixas de vetores
//!
//! | Vetores     | Origem                 | Despachante      |
//! |-------------|------------------------|------------------|
//! | 0..32       | Exceções da CPU        | `dispatch_fault` |
//! | 32..48      | IRQs do PIC remapeado  | `dispatch_irq`   |
//! | 0x80        | Syscall (`int 0x80`)   | `dispatch_fault` |
//!
//! As cadeias são indexadas pelo vetor. Handlers de IRQ são registrados em
//! `IRQ_BASE + irq` (ver `attach_irq`).

pub mod dispatch;
pub mod registry;

#[cfg(test)]
mod test;

pub use dispatch::{InterruptManager, SchedulerHook};
pub use registry::{Chain, HandlerSlot, InterruptRegistry, Isr};

// =============================================================================
// CONFIGURAÇÃO
// =============================================================================

/// Número de vetores da IDT
pub const IDT_NUM_ENTRIES: usize = 256;

/// Capacidade do pool de handlers de cada vetor
pub const MAX_HANDLERS: usize = 50;

/// Número de exceções reservadas pela CPU
pub const EXCEPTION_COUNT: u8 = 32;

/// Primeiro vetor de IRQ após o remapeamento do PIC
pub const IRQ_BASE: u8 = 32;

/// Linhas de IRQ do par de PICs 8259
pub const IRQ_COUNT: u8 = 16;

/// Vetor de system call
pub const SYSCALL_VECTOR: u8 = 0x80;

/// Vetor de double fault (sempre fatal)
pub const DOUBLE_FAULT_VECTOR: u8 = 8;

/// IRQ do timer (reservada para o hook do scheduler)
pub const TIMER_IRQ: u8 = 0;

/// Converte uma linha de IRQ no vetor correspondente.
#[inline]
pub const fn irq_vector(irq: u8) -> u8 {
    IRQ_BASE + irq
}

/// O vetor pertence à faixa de IRQs de hardware?
#[inline]
pub const fn is_irq_vector(vector: u8) -> bool {
    vector >= IRQ_BASE && vector < IRQ_BASE + IRQ_COUNT
}

/// Nomes das exceções da CPU, indexados pelo vetor.
pub const EXCEPTION_MESSAGES: [&str; EXCEPTION_COUNT as usize] = [
    "Division by zero",
    "Debug",
    "Non-maskable interrupt",
    "Breakpoint",
    "Detected overflow",
    "Out-of-bounds",
    "Invalid opcode",
    "No coprocessor",
    "Double fault",
    "Coprocessor segment overrun",
    "Bad TSS",
    "Segment not present",
    "Stack fault",
    "General protection fault",
    "Page fault",
    "Unknown interrupt",
    "Coprocessor fault",
    "Alignment check (486+)",
    "Machine check (Pentium/586+)",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
];

/// Nome legível de uma exceção; vetores fora da faixa de exceções não têm nome.
pub fn exception_name(vector: u8) -> Option<&'static str> {
    EXCEPTION_MESSAGES.get(vector as usize).copied()
}

// =============================================================================
// COLABORADOR: CONTROLADOR DE INTERRUPÇÕES
// =============================================================================

/// Contrato do controlador de interrupções (PIC 8259, APIC, mock).
pub trait InterruptController: Sync {
    /// Confirma a interrupção do vetor (EOI).
    /// Retorna `true` se a interrupção for espúria.
    fn acknowledge(&self, vector: u8) -> bool;

    /// Habilita (unmask) a linha de IRQ.
    fn enable_line(&self, irq: u8);

    /// Desabilita (mask) a linha de IRQ.
    fn disable_line(&self, irq: u8);

    /// Desabilita todas as linhas.
    fn disable_all(&self);
}

// =============================================================================
// ERROS
// =============================================================================

/// Erros do subsistema de interrupções
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqError {
    /// Todos os slots do vetor estão ocupados
    PoolExhausted,
    /// Linha de IRQ fora de 0..IRQ_COUNT
    InvalidIrq,
}

impl IrqError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoolExhausted => "Pool de handlers do vetor esgotado",
            Self::InvalidIrq => "Linha de IRQ inválida",
        }
    }
}

impl core::fmt::Display for IrqError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type IrqResult<T> = Result<T, IrqError>;
