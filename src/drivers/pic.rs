//! Driver do 8259 PIC (Programmable Interrupt Controller).
//!
//! Par mestre/escravo em cascata (escravo na IRQ 2 do mestre).
//!
//! # Remapeamento
//! Por padrão, o PIC usa vetores 0-15, que conflitam com exceções da CPU.
//! Remapeamos para 32-47.
//!
//! # IRQs espúrias
//! O PIC sinaliza a IRQ de menor prioridade (7 no mestre, 15 no escravo)
//! quando a requisição some antes do INTA. Nesses casos o bit correspondente
//! do ISR (In-Service Register) está zerado e NÃO se envia EOI ao chip que
//! gerou a espúria. Uma espúria do escravo ainda exige EOI no mestre, que
//! viu uma IRQ 2 legítima.

use crate::interrupts::{InterruptController, IRQ_BASE};
use crate::sync::Spinlock;

const PIC1_CMD: u16 = 0x20;
const PIC1_DATA: u16 = 0x21;
const PIC2_CMD: u16 = 0xA0;
const PIC2_DATA: u16 = 0xA1;

const PIC_EOI: u8 = 0x20;

/// OCW3: próxima leitura do comando retorna o ISR
const PIC_READ_ISR: u8 = 0x0B;

const ICW1_INIT: u8 = 0x11;
const ICW4_8086: u8 = 0x01;

/// Linha do mestre onde o escravo está ligado
const CASCADE_IRQ: u8 = 2;

/// Offset dos vetores do escravo
pub const PIC2_OFFSET: u8 = IRQ_BASE + 8;

/// Como confirmar uma IRQ, dado o ISR lido do chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// IRQ legítima: EOI no escravo (se for dele) e no mestre
    Eoi { slave: bool },
    /// Espúria do mestre (IRQ 7): nenhum EOI
    SpuriousMaster,
    /// Espúria do escravo (IRQ 15): EOI apenas no mestre
    SpuriousSlave,
}

/// Decide a confirmação de `irq` (0..16).
///
/// `isr` é o In-Service Register combinado (escravo nos 8 bits altos); só é
/// consultado para as linhas 7 e 15.
pub fn classify(irq: u8, isr: u16) -> Ack {
    match irq {
        7 if isr & (1 << 7) == 0 => Ack::SpuriousMaster,
        15 if isr & (1 << 15) == 0 => Ack::SpuriousSlave,
        _ => Ack::Eoi { slave: irq >= 8 },
    }
}

/// Cadeia de PICs (Master + Slave).
///
/// As máscaras ficam em cache atrás de um `Spinlock`; toda escrita nas
/// portas de dados passa por ele.
pub struct ChainedPics {
    masks: Spinlock<[u8; 2]>,
}

impl ChainedPics {
    /// Todas as linhas começam mascaradas.
    pub const fn new() -> Self {
        Self {
            masks: Spinlock::new([0xFF, 0xFF]),
        }
    }

    /// Máscaras atuais (mestre, escravo).
    pub fn masks(&self) -> [u8; 2] {
        *self.masks.lock()
    }
}

impl Default for ChainedPics {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HARDWARE
// =============================================================================

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod hw {
    use super::*;
    use crate::arch::x86::ports::{inb, io_wait, outb};

    impl ChainedPics {
        /// Remapeia o par de PICs para `IRQ_BASE` / `PIC2_OFFSET`.
        ///
        /// Todas as linhas terminam mascaradas, exceto a cascata.
        pub fn init(&self) {
            crate::kdebug!("(PIC) init: Remapeando IRQs para o vetor ", IRQ_BASE);

            let mut masks = self.masks.lock();

            // ICW1: início da sequência de inicialização
            outb(PIC1_CMD, ICW1_INIT);
            io_wait();
            outb(PIC2_CMD, ICW1_INIT);
            io_wait();

            // ICW2: offsets dos vetores
            outb(PIC1_DATA, IRQ_BASE);
            io_wait();
            outb(PIC2_DATA, PIC2_OFFSET);
            io_wait();
            crate::ktrace!("(PIC) init: ICW2 offset2=", PIC2_OFFSET);

            // ICW3: cascata
            outb(PIC1_DATA, 1 << CASCADE_IRQ);
            io_wait();
            outb(PIC2_DATA, CASCADE_IRQ);
            io_wait();

            // ICW4: modo 8086
            outb(PIC1_DATA, ICW4_8086);
            io_wait();
            outb(PIC2_DATA, ICW4_8086);
            io_wait();

            *masks = [0xFF & !(1 << CASCADE_IRQ), 0xFF];
            outb(PIC1_DATA, masks[0]);
            outb(PIC2_DATA, masks[1]);

            crate::kinfo!("(PIC) Inicializado e Remapeado");
        }

        /// In-Service Register combinado (escravo nos bits altos).
        pub fn read_isr(&self) -> u16 {
            outb(PIC1_CMD, PIC_READ_ISR);
            outb(PIC2_CMD, PIC_READ_ISR);
            ((inb(PIC2_CMD) as u16) << 8) | inb(PIC1_CMD) as u16
        }

        fn write_mask(&self, irq: u8, masked: bool) {
            let mut masks = self.masks.lock();
            let (chip, port) = if irq < 8 { (0, PIC1_DATA) } else { (1, PIC2_DATA) };
            let bit = 1 << (irq % 8);

            if masked {
                masks[chip] |= bit;
            } else {
                masks[chip] &= !bit;
            }
            outb(port, masks[chip]);
        }
    }

    impl InterruptController for ChainedPics {
        fn acknowledge(&self, vector: u8) -> bool {
            let irq = vector.wrapping_sub(IRQ_BASE);
            let isr = if irq == 7 || irq == 15 { self.read_isr() } else { 0 };

            match classify(irq, isr) {
                Ack::Eoi { slave } => {
                    if slave {
                        outb(PIC2_CMD, PIC_EOI);
                    }
                    outb(PIC1_CMD, PIC_EOI);
                    false
                }
                Ack::SpuriousMaster => true,
                Ack::SpuriousSlave => {
                    outb(PIC1_CMD, PIC_EOI);
                    true
                }
            }
        }

        fn enable_line(&self, irq: u8) {
            self.write_mask(irq, false);
        }

        fn disable_line(&self, irq: u8) {
            self.write_mask(irq, true);
        }

        fn disable_all(&self) {
            let mut masks = self.masks.lock();
            *masks = [0xFF, 0xFF];
            outb(PIC1_DATA, 0xFF);
            outb(PIC2_DATA, 0xFF);
            crate::kdebug!("(PIC) Todas as IRQs mascaradas");
        }
    }
}
