//! Implementação x86 das operações de CPU (HAL).
//!
//! Usa Assembly inline para controle de interrupções e halt. Compila tanto
//! para i386 quanto para x86_64; apenas a leitura de EFLAGS muda de forma.
//!
//! # Segurança
//! Assume execução em Ring 0. Executar `cli`/`sti`/`hlt` em modo usuário gera #GP.

use crate::arch::traits::CpuOps;
use crate::arch::x86::ports::{inb, outb};
use core::arch::asm;

/// Bit 9 de EFLAGS: Interrupt Flag
const EFLAGS_IF: usize = 1 << 9;

/// Controlador de teclado 8042 (usado para o reset da máquina)
const KBD_STATUS: u16 = 0x64;
const KBD_DATA: u16 = 0x60;
const KBD_CMD_RESET: u8 = 0xFE;

pub struct X86Cpu;

impl X86Cpu {
    /// Reinicia a máquina pulsando a linha de reset do 8042.
    ///
    /// Esvazia os buffers do controlador antes de enviar o comando; se o
    /// reset não acontecer, trava a CPU.
    pub fn reset() -> ! {
        Self::disable_interrupts();

        loop {
            let status = inb(KBD_STATUS);
            if status & 0x01 != 0 {
                let _ = inb(KBD_DATA);
            }
            if status & 0x02 == 0 {
                break;
            }
        }

        outb(KBD_STATUS, KBD_CMD_RESET);
        Self::hang()
    }
}

impl CpuOps for X86Cpu {
    /// Para a execução da CPU até a próxima interrupção (HLT).
    #[inline]
    fn halt() {
        unsafe {
            asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }

    /// Desabilita interrupções (CLI).
    ///
    /// Sem `nomem`: acessos à memória não podem sair da seção crítica.
    #[inline]
    fn disable_interrupts() {
        unsafe {
            asm!("cli", options(nostack));
        }
    }

    /// Habilita interrupções (STI).
    #[inline]
    fn enable_interrupts() {
        unsafe {
            asm!("sti", options(nostack));
        }
    }

    /// Verifica se as interrupções estão habilitadas (EFLAGS.IF).
    #[inline]
    fn are_interrupts_enabled() -> bool {
        let flags: usize;
        unsafe {
            // PUSHF empilha EFLAGS, POP retira para registrador.
            #[cfg(target_arch = "x86_64")]
            asm!("pushfq", "pop {}", out(reg) flags, options(nomem, preserves_flags));
            #[cfg(target_arch = "x86")]
            asm!("pushfd", "pop {}", out(reg) flags, options(nomem, preserves_flags));
        }
        (flags & EFLAGS_IF) != 0
    }
}
