//! Stubs de Interrupção em Assembly (i386).
//!
//! Cada vetor tem um stub que normaliza a stack (código de erro falso quando
//! a CPU não empilha um), empilha o número do vetor e salta para o stub comum.
//! O stub comum monta o `TrapFrame`, chama o despachante Rust e retoma a
//! execução a partir do frame que ele devolver.

use crate::arch::x86::idt::{Idt, GATE_KERNEL_INT32, GATE_USER_INT32};
use crate::interrupts::{IRQ_BASE, IRQ_COUNT, SYSCALL_VECTOR};
use core::arch::global_asm;
use spin::Once;

global_asm!(
    r#"
.macro ISR_NOERR num
.global ember_isr\num
ember_isr\num:
    push 0
    push \num
    jmp ember_isr_common
.endm

.macro ISR_ERR num
.global ember_isr\num
ember_isr\num:
    push \num
    jmp ember_isr_common
.endm

.macro IRQ_STUB irq
.global ember_irq\irq
ember_irq\irq:
    push 0
    push (32 + \irq)
    jmp ember_irq_common
.endm

.macro TRAP_COMMON name, handler
\name:
    pusha
    push ds
    push es
    push fs
    push gs
    mov ax, 0x10
    mov ds, ax
    mov es, ax
    mov fs, ax
    mov gs, ax
    push esp
    call \handler
    mov esp, eax
    pop gs
    pop fs
    pop es
    pop ds
    popa
    add esp, 8
    iretd
.endm

.section .text
ISR_NOERR 0
ISR_NOERR 1
ISR_NOERR 2
ISR_NOERR 3
ISR_NOERR 4
ISR_NOERR 5
ISR_NOERR 6
ISR_NOERR 7
ISR_ERR   8
ISR_NOERR 9
ISR_ERR   10
ISR_ERR   11
ISR_ERR   12
ISR_ERR   13
ISR_ERR   14
ISR_NOERR 15
ISR_NOERR 16
ISR_ERR   17
ISR_NOERR 18
ISR_NOERR 19
ISR_NOERR 20
ISR_ERR   21
ISR_NOERR 22
ISR_NOERR 23
ISR_NOERR 24
ISR_NOERR 25
ISR_NOERR 26
ISR_NOERR 27
ISR_NOERR 28
ISR_ERR   29
ISR_ERR   30
ISR_NOERR 31
ISR_NOERR 128

IRQ_STUB 0
IRQ_STUB 1
IRQ_STUB 2
IRQ_STUB 3
IRQ_STUB 4
IRQ_STUB 5
IRQ_STUB 6
IRQ_STUB 7
IRQ_STUB 8
IRQ_STUB 9
IRQ_STUB 10
IRQ_STUB 11
IRQ_STUB 12
IRQ_STUB 13
IRQ_STUB 14
IRQ_STUB 15

TRAP_COMMON ember_isr_common, isr_handler
TRAP_COMMON ember_irq_common, irq_handler

.section .rodata
.balign 4
.global ember_isr_table
ember_isr_table:
    .long ember_isr0, ember_isr1, ember_isr2, ember_isr3
    .long ember_isr4, ember_isr5, ember_isr6, ember_isr7
    .long ember_isr8, ember_isr9, ember_isr10, ember_isr11
    .long ember_isr12, ember_isr13, ember_isr14, ember_isr15
    .long ember_isr16, ember_isr17, ember_isr18, ember_isr19
    .long ember_isr20, ember_isr21, ember_isr22, ember_isr23
    .long ember_isr24, ember_isr25, ember_isr26, ember_isr27
    .long ember_isr28, ember_isr29, ember_isr30, ember_isr31

.global ember_irq_table
ember_irq_table:
    .long ember_irq0, ember_irq1, ember_irq2, ember_irq3
    .long ember_irq4, ember_irq5, ember_irq6, ember_irq7
    .long ember_irq8, ember_irq9, ember_irq10, ember_irq11
    .long ember_irq12, ember_irq13, ember_irq14, ember_irq15

.section .text
"#
);

extern "C" {
    static ember_isr_table: [u32; 32];
    static ember_irq_table: [u32; IRQ_COUNT as usize];
    fn ember_isr128();
}

static IDT: Once<Idt> = Once::new();

/// Monta a IDT com todos os stubs e a carrega na CPU.
///
/// # Safety
///
/// Deve ser chamado uma única vez, no boot, com interrupções desabilitadas
/// e a GDT do kernel (seletores 0x08/0x10) já carregada.
pub unsafe fn init_idt() {
    let idt = IDT.call_once(|| {
        let mut idt = Idt::new();

        for (vector, stub) in ember_isr_table.iter().enumerate() {
            idt.set_entry(vector as u8, *stub, GATE_KERNEL_INT32);
        }
        for (irq, stub) in ember_irq_table.iter().enumerate() {
            idt.set_entry(IRQ_BASE + irq as u8, *stub, GATE_KERNEL_INT32);
        }
        idt.set_entry(SYSCALL_VECTOR, ember_isr128 as usize as u32, GATE_USER_INT32);

        idt
    });

    idt.load();
    crate::kinfo!("(Arch) IDT carregada");
}
