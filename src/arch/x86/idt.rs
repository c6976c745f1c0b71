/// Arquivo: x86/idt.rs
///
/// Propósito: Interrupt Descriptor Table (IDT) de 32 bits.
/// Liga cada vetor ao stub de entrada correspondente em `entry.rs`.
///
/// Detalhes de Implementação:
/// - `IdtEntry` segue o formato de gate i386 (8 bytes).
/// - Tabela estática de 256 entradas, mutável apenas na inicialização.
/// - `load` configura o registrador IDTR.
use core::mem::size_of;

/// Seletor do segmento de código do kernel (GDT índice 1)
pub const KERNEL_CODE_SEL: u16 = 0x08;

/// Present | Ring 0 | Interrupt Gate 32-bit
pub const GATE_KERNEL_INT32: u8 = 0x8E;
/// Present | Ring 3 | Interrupt Gate 32-bit (syscall via `int 0x80`)
pub const GATE_USER_INT32: u8 = 0xEE;

/// Entrada da IDT (8 bytes em i386)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, packed)]
pub struct IdtEntry {
    base_low: u16,
    selector: u16,
    zero: u8,
    flags: u8, // 0-3: tipo do gate, 4: storage, 5-6: ring, 7: present
    base_high: u16,
}

impl IdtEntry {
    /// Cria uma entrada vazia (não presente)
    pub const fn missing() -> Self {
        Self {
            base_low: 0,
            selector: 0,
            zero: 0,
            flags: 0,
            base_high: 0,
        }
    }

    /// Cria uma entrada presente apontando para um stub
    pub const fn new(handler: u32, selector: u16, flags: u8) -> Self {
        Self {
            base_low: (handler & 0xFFFF) as u16,
            selector,
            zero: 0,
            flags,
            base_high: (handler >> 16) as u16,
        }
    }

    /// Endereço do handler codificado na entrada.
    pub fn handler(&self) -> u32 {
        (self.base_low as u32) | ((self.base_high as u32) << 16)
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }
}

/// A Tabela IDT propriamente dita
#[repr(C, align(8))]
pub struct Idt {
    entries: [IdtEntry; 256],
}

impl Idt {
    pub const fn new() -> Self {
        Self {
            entries: [IdtEntry::missing(); 256],
        }
    }

    /// Define o gate do vetor indicado
    pub fn set_entry(&mut self, vector: u8, handler: u32, flags: u8) {
        self.entries[vector as usize] = IdtEntry::new(handler, KERNEL_CODE_SEL, flags);
    }

    pub fn entry(&self, vector: u8) -> IdtEntry {
        self.entries[vector as usize]
    }

    /// Carrega a IDT na CPU (lidt)
    ///
    /// # Safety
    ///
    /// A tabela deve ter tempo de vida 'static e os stubs referenciados devem existir.
    pub unsafe fn load(&'static self) {
        let descriptor = IdtDescriptor {
            limit: (size_of::<Self>() - 1) as u16,
            base: self as *const Self as usize,
        };
        core::arch::asm!("lidt [{}]", in(reg) &descriptor, options(readonly, nostack, preserves_flags));
    }
}

/// Descritor para LIDT
#[repr(C, packed)]
struct IdtDescriptor {
    limit: u16,
    base: usize,
}
