/// Arquivo: x86/ports.rs
///
/// Propósito: Instruções de entrada/saída (I/O Ports) legadas do x86.
/// Usadas pelos colaboradores de hardware: PIC, PIT, Serial e o controlador
/// de teclado (reset da máquina).
///
/// Detalhes de Implementação:
/// - Usa `core::arch::asm!` para emitir instruções `in` e `out`.
/// - `io_wait` escreve na porta 0x80 para gerar um atraso de barramento.

/// Lê um byte de uma porta IO
#[inline]
pub fn inb(port: u16) -> u8 {
    let value: u8;
    // SAFETY: IO ports são operações privilegiadas mas seguras do ponto de vista de memória
    unsafe {
        core::arch::asm!(
            "in al, dx",
            in("dx") port,
            out("al") value,
            options(nomem, nostack, preserves_flags)
        );
    }
    value
}

/// Escreve um byte em uma porta IO
#[inline]
pub fn outb(port: u16, value: u8) {
    // SAFETY: IO ports são operações privilegiadas mas seguras do ponto de vista de memória
    unsafe {
        core::arch::asm!(
            "out dx, al",
            in("dx") port,
            in("al") value,
            options(nomem, nostack, preserves_flags)
        );
    }
}

/// Delay de IO (espera ciclo de barramento)
///
/// Usado quando o hardware precisa de um pequeno tempo para processar um comando
/// antes de receber o próximo (ex: remapeamento do PIC).
#[inline]
pub fn io_wait() {
    outb(0x80, 0);
}
