//! Panic Handler.
//!
//! Quando o Rust detecta um estado irrecuperável (vnode sem operação,
//! contagem de referências corrompida), esta função é chamada.
//!
//! # Comportamento
//! 1. Desabilita interrupções (evita loop de panics).
//! 2. Loga o local na Serial.
//! 3. Trava a CPU (hlt loop).
//!
//! Só existe no alvo bare-metal; no host (testes) vale o handler da std.

use crate::arch::{Cpu, CpuOps};
use core::panic::PanicInfo;

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    Cpu::disable_interrupts();

    crate::kerror!("================ KERNEL PANIC ================");

    match info.location() {
        Some(location) => {
            crate::kerror!(location.file());
            crate::kerror!("Linha: ", location.line());
        }
        None => crate::kerror!("Local desconhecido"),
    }

    match info.message().as_str() {
        Some(reason) => crate::kerror!(reason),
        // Mensagens formatadas: o contexto foi logado antes do panic
        None => crate::kerror!("Mensagem formatada (ver log acima)"),
    }
    crate::kerror!("==============================================");

    Cpu::hang()
}
