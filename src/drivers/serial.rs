// =============================================================================
// SERIAL DRIVER - ZERO OVERHEAD
// =============================================================================
//
// Driver de Porta Serial (COM1) usado como sink dos macros de log.
//
// ARQUITETURA:
// - SEM Spinlock - os macros são chamados de dentro de seções críticas
//   (alocador, despacho de interrupções) e não podem reentrar em lock
// - SEM core::fmt - apenas strings e valores hex
// - SEM alocação
//
// FUNÇÕES DISPONÍVEIS:
// - emit(byte)       : Envia um byte
// - emit_str(s)      : Envia string
// - emit_hex(v)      : Envia valor em hexadecimal (0x + 8 ou 16 dígitos)
// - emit_nl()        : Envia newline (\r\n)
//
// Em `cfg(test)` as mesmas funções escrevem num buffer por thread, que os
// testes inspecionam com `take_captured()`.
//
// =============================================================================

// Porta de dados da COM1
#[cfg(not(test))]
const COM1_DATA: u16 = 0x3F8;

// Porta de status da COM1 (Line Status Register)
#[cfg(not(test))]
const COM1_STATUS: u16 = 0x3FD;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

// =============================================================================
// BACKEND: HARDWARE
// =============================================================================

/// Inicializa a porta serial COM1 (UART 16550).
///
/// Configura: 38400 baud, 8N1, FIFO habilitado.
#[cfg(not(test))]
pub fn init() {
    use crate::arch::x86::ports::outb;

    outb(COM1_DATA + 1, 0x00); // Desabilitar interrupções da UART
    outb(COM1_DATA + 3, 0x80); // Habilitar DLAB
    outb(COM1_DATA, 0x03); // Divisor low byte (38400 baud)
    outb(COM1_DATA + 1, 0x00); // Divisor high byte
    outb(COM1_DATA + 3, 0x03); // 8 bits, sem paridade, 1 stop bit
    outb(COM1_DATA + 2, 0xC7); // FIFO habilitado, limpo, limite 14 bytes
    outb(COM1_DATA + 4, 0x0B); // RTS/DSR
}

/// Envia um byte, esperando o buffer de transmissão esvaziar.
#[cfg(not(test))]
#[inline]
pub fn emit(byte: u8) {
    use crate::arch::x86::ports::{inb, outb};

    // Bit 5 do LSR: buffer de transmissão vazio
    while inb(COM1_STATUS) & 0x20 == 0 {
        core::hint::spin_loop();
    }
    outb(COM1_DATA, byte);
}

// =============================================================================
// BACKEND: CAPTURA (TESTES)
// =============================================================================

#[cfg(test)]
std::thread_local! {
    static CAPTURED: std::cell::RefCell<std::vec::Vec<u8>> =
        const { std::cell::RefCell::new(std::vec::Vec::new()) };
}

#[cfg(test)]
pub fn init() {}

#[cfg(test)]
pub fn emit(byte: u8) {
    CAPTURED.with(|c| c.borrow_mut().push(byte));
}

/// Retorna (e limpa) tudo que foi emitido por esta thread.
#[cfg(test)]
pub fn take_captured() -> std::string::String {
    let bytes = CAPTURED.with(|c| core::mem::take(&mut *c.borrow_mut()));
    std::string::String::from_utf8_lossy(&bytes).into_owned()
}

// =============================================================================
// FUNÇÕES COMUNS
// =============================================================================

/// Envia uma string.
pub fn emit_str(s: &str) {
    for byte in s.bytes() {
        emit(byte);
    }
}

/// Envia newline (\r\n).
pub fn emit_nl() {
    emit(b'\r');
    emit(b'\n');
}

/// Envia um valor em hexadecimal com prefixo `0x`.
///
/// Valores que cabem em 32 bits usam 8 dígitos (registradores i386);
/// os demais usam 16.
pub fn emit_hex(value: u64) {
    let digits = if value > u32::MAX as u64 { 16 } else { 8 };

    emit(b'0');
    emit(b'x');
    for i in (0..digits).rev() {
        let nibble = ((value >> (i * 4)) & 0xF) as usize;
        emit(HEX_DIGITS[nibble]);
    }
}
