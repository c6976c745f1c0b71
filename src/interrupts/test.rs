//! Testes do registro e dos despachantes de interrupção

#![cfg(test)]

use super::*;
use crate::arch::TrapFrame;
use crate::drivers::serial::take_captured;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::cell::RefCell;
use std::vec::Vec;

// =============================================================================
// INFRAESTRUTURA
// =============================================================================

std::thread_local! {
    static CALLS: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
}

fn record(id: u32) {
    CALLS.with(|c| c.borrow_mut().push(id));
}

fn calls() -> Vec<u32> {
    CALLS.with(|c| core::mem::take(&mut *c.borrow_mut()))
}

fn h1(_: &mut TrapFrame) {
    record(1);
}

fn h2(_: &mut TrapFrame) {
    record(2);
}

fn h3(_: &mut TrapFrame) {
    record(3);
}

fn h4(_: &mut TrapFrame) {
    record(4);
}

/// Controlador simulado: reporta IRQ espúria quando configurado.
struct MockPic {
    spurious: AtomicBool,
    acks: AtomicU32,
    mask: AtomicU32,
}

impl MockPic {
    const fn new() -> Self {
        Self {
            spurious: AtomicBool::new(false),
            acks: AtomicU32::new(0),
            mask: AtomicU32::new(0),
        }
    }
}

impl InterruptController for MockPic {
    fn acknowledge(&self, _vector: u8) -> bool {
        self.acks.fetch_add(1, Ordering::Relaxed);
        self.spurious.load(Ordering::Relaxed)
    }

    fn enable_line(&self, irq: u8) {
        self.mask.fetch_and(!(1 << irq), Ordering::Relaxed);
    }

    fn disable_line(&self, irq: u8) {
        self.mask.fetch_or(1 << irq, Ordering::Relaxed);
    }

    fn disable_all(&self) {
        self.mask.store(0xFFFF, Ordering::Relaxed);
    }
}

fn manager() -> std::boxed::Box<InterruptManager<MockPic>> {
    std::boxed::Box::new(InterruptManager::new(MockPic::new()))
}

// =============================================================================
// REGISTRO
// =============================================================================

#[test]
fn handlers_run_in_attach_order() {
    let mgr = manager();
    calls();

    assert_eq!(mgr.attach(3, h1), Ok(1));
    assert_eq!(mgr.attach(3, h2), Ok(2));
    assert_eq!(mgr.attach(3, h3), Ok(3));

    mgr.dispatch_fault(&mut TrapFrame::for_vector(3));
    assert_eq!(calls(), [1, 2, 3]);
}

#[test]
fn detach_middle_keeps_order() {
    let mgr = manager();
    calls();

    mgr.attach(3, h1).unwrap();
    mgr.attach(3, h2).unwrap();
    mgr.attach(3, h3).unwrap();
    assert!(mgr.detach(3, h2));

    mgr.dispatch_fault(&mut TrapFrame::for_vector(3));
    assert_eq!(calls(), [1, 3]);
    assert_eq!(mgr.chain(3).len(), 2);
}

#[test]
fn detach_head_moves_head() {
    let mut reg = InterruptRegistry::new();

    reg.attach(14, h1).unwrap();
    reg.attach(14, h2).unwrap();
    assert!(reg.detach(14, h1));

    let head = reg.lookup_head(14).expect("cadeia não deveria estar vazia");
    assert_eq!(head.handler().map(|h| h as usize), Some(h2 as Isr as usize));
    assert_eq!(head.index(), 2);
    assert_eq!(reg.len(14), 1);
}

#[test]
fn detach_sole_element_empties_chain() {
    let mut reg = InterruptRegistry::new();

    reg.attach(6, h1).unwrap();
    assert!(reg.detach(6, h1));
    assert!(reg.lookup_head(6).is_none());
    assert!(reg.is_empty(6));

    // Cadeia nova: índice volta a 1
    assert_eq!(reg.attach(6, h2), Ok(1));
}

#[test]
fn detach_missing_handler_is_noop() {
    let mut reg = InterruptRegistry::new();

    assert!(!reg.detach(5, h1));
    reg.attach(5, h1).unwrap();
    assert!(!reg.detach(5, h2));
    assert_eq!(reg.len(5), 1);
}

#[test]
fn detach_duplicate_removes_latest_first() {
    let mut reg = InterruptRegistry::new();

    reg.attach(1, h1).unwrap();
    reg.attach(1, h2).unwrap();
    reg.attach(1, h1).unwrap();
    assert!(reg.detach(1, h1));

    let order: Vec<u32> = reg.iter(1).map(|s| s.index()).collect();
    assert_eq!(order, [1, 2]);
}

#[test]
fn full_pool_does_not_touch_other_vectors() {
    let mut reg = InterruptRegistry::new();
    reg.attach(4, h4).unwrap();

    for _ in 0..MAX_HANDLERS {
        reg.attach(3, h1).unwrap();
    }
    take_captured();

    assert_eq!(reg.attach(3, h2), Err(IrqError::PoolExhausted));
    assert!(take_captured().contains("pool de handlers cheio"));

    assert_eq!(reg.len(3), MAX_HANDLERS);
    assert_eq!(reg.len(4), 1);
    let head = reg.lookup_head(4).unwrap();
    assert_eq!(head.vector(), 4);
    assert_eq!(head.index(), 1);
}

#[test]
fn freed_slot_is_reused() {
    let mut reg = InterruptRegistry::new();

    for _ in 0..MAX_HANDLERS {
        reg.attach(9, h1).unwrap();
    }
    assert!(reg.detach(9, h1));
    assert_eq!(reg.attach(9, h2), Ok(MAX_HANDLERS as u32));
    assert_eq!(reg.attach(9, h3), Err(IrqError::PoolExhausted));
}

#[test]
fn attach_irq_uses_remapped_vector() {
    let mgr = manager();

    mgr.attach_irq(1, h1).unwrap();
    assert!(mgr.lookup_head(irq_vector(1)).is_some());
    assert!(mgr.lookup_head(1).is_none());
    assert_eq!(mgr.attach_irq(IRQ_COUNT, h1), Err(IrqError::InvalidIrq));
    assert_eq!(mgr.detach_irq(1, h1), Ok(true));
}

// =============================================================================
// EXCEÇÕES
// =============================================================================

#[test]
fn exception_names_table() {
    assert_eq!(exception_name(0), Some("Division by zero"));
    assert_eq!(exception_name(14), Some("Page fault"));
    assert_eq!(exception_name(31), Some("Reserved"));
    assert_eq!(exception_name(SYSCALL_VECTOR), None);
}

#[test]
#[should_panic(expected = "cpu hang")]
fn fault_without_handler_is_fatal() {
    let mgr = manager();
    mgr.dispatch_fault(&mut TrapFrame::for_vector(13));
}

#[test]
fn fatal_fault_logs_name_and_dump() {
    let mgr = manager();
    take_captured();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        mgr.dispatch_fault(&mut TrapFrame::for_vector(14));
    }));
    assert!(result.is_err());

    let log = take_captured();
    assert!(log.contains("Unhandled exception #0x0000000e"));
    assert!(log.contains("Page fault"));
    assert!(log.contains("eax: "));
}

#[test]
fn double_fault_is_fatal_even_with_handler() {
    let mgr = manager();
    mgr.attach(DOUBLE_FAULT_VECTOR, h1).unwrap();
    calls();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        mgr.dispatch_fault(&mut TrapFrame::for_vector(DOUBLE_FAULT_VECTOR));
    }));
    assert!(result.is_err());
    // O handler ainda roda antes da parada
    assert_eq!(calls(), [1]);
}

#[test]
#[should_panic(expected = "cpu hang")]
fn irq_vector_in_fault_path_is_fatal() {
    let mgr = manager();
    mgr.attach(IRQ_BASE + 2, h1).unwrap();
    mgr.dispatch_fault(&mut TrapFrame::for_vector(IRQ_BASE + 2));
}

fn set_return_value(frame: &mut TrapFrame) {
    frame.eax = 0x1234;
}

#[test]
fn syscall_vector_runs_handlers() {
    let mgr = manager();
    mgr.attach(SYSCALL_VECTOR, set_return_value).unwrap();

    let mut frame = TrapFrame::for_vector(SYSCALL_VECTOR);
    let esp = mgr.dispatch_fault(&mut frame);

    assert_eq!(frame.eax, 0x1234);
    assert_eq!(esp, &frame as *const TrapFrame as usize);
}

// =============================================================================
// IRQs
// =============================================================================

#[test]
fn spurious_irq_runs_nothing() {
    let mgr = manager();
    mgr.attach_irq(7, h1).unwrap();
    mgr.controller().spurious.store(true, Ordering::Relaxed);
    calls();
    take_captured();

    mgr.dispatch_irq(&mut TrapFrame::for_vector(irq_vector(7)));

    assert!(calls().is_empty());
    assert!(!take_captured().contains("No handler"));
    assert_eq!(mgr.controller().acks.load(Ordering::Relaxed), 1);
}

#[test]
fn irq_without_handler_warns() {
    let mgr = manager();
    take_captured();

    mgr.dispatch_irq(&mut TrapFrame::for_vector(irq_vector(5)));
    assert!(take_captured().contains("No handler for IRQ #0x00000005"));
}

#[test]
fn timer_irq_without_handler_is_silent() {
    let mgr = manager();
    take_captured();

    mgr.dispatch_irq(&mut TrapFrame::for_vector(irq_vector(TIMER_IRQ)));
    assert!(!take_captured().contains("No handler"));
}

fn switch_stack(_esp: usize) -> usize {
    record(100);
    0xC0DE_0000
}

#[test]
fn scheduler_hook_runs_before_timer_handlers() {
    let mgr = manager();
    mgr.set_scheduler_hook(Some(switch_stack));
    mgr.attach_irq(TIMER_IRQ, h1).unwrap();
    calls();

    let esp = mgr.dispatch_irq(&mut TrapFrame::for_vector(irq_vector(TIMER_IRQ)));

    assert_eq!(esp, 0xC0DE_0000);
    assert_eq!(calls(), [100, 1]);
}

#[test]
fn scheduler_hook_ignored_on_other_irqs() {
    let mgr = manager();
    mgr.set_scheduler_hook(Some(switch_stack));
    mgr.attach_irq(1, h2).unwrap();
    calls();

    let mut frame = TrapFrame::for_vector(irq_vector(1));
    let esp = mgr.dispatch_irq(&mut frame);

    assert_eq!(esp, &frame as *const TrapFrame as usize);
    assert_eq!(calls(), [2]);
}

#[test]
#[should_panic(expected = "cpu hang")]
fn exception_vector_in_irq_path_is_fatal() {
    let mgr = manager();
    mgr.dispatch_irq(&mut TrapFrame::for_vector(3));
}

#[test]
fn irq_lines_are_validated() {
    let mgr = manager();

    assert_eq!(mgr.disable_irq(3), Ok(()));
    assert_eq!(mgr.controller().mask.load(Ordering::Relaxed), 1 << 3);
    assert_eq!(mgr.enable_irq(3), Ok(()));
    assert_eq!(mgr.controller().mask.load(Ordering::Relaxed), 0);
    assert_eq!(mgr.enable_irq(16), Err(IrqError::InvalidIrq));

    mgr.disable_irqs();
    assert_eq!(mgr.controller().mask.load(Ordering::Relaxed), 0xFFFF);
}

// =============================================================================
// REENTRÂNCIA
// =============================================================================

static REENTRANT: InterruptManager<MockPic> = InterruptManager::new(MockPic::new());

fn one_shot(_: &mut TrapFrame) {
    record(7);
    REENTRANT.detach(irq_vector(4), one_shot);
}

fn attach_more(_: &mut TrapFrame) {
    record(8);
    let _ = REENTRANT.attach(irq_vector(6), h4);
}

#[test]
fn handlers_may_change_registry_during_dispatch() {
    calls();

    REENTRANT.attach_irq(4, one_shot).unwrap();
    REENTRANT.attach_irq(4, h2).unwrap();
    REENTRANT.dispatch_irq(&mut TrapFrame::for_vector(irq_vector(4)));
    assert_eq!(calls(), [7, 2]);

    // O one_shot saiu da cadeia
    REENTRANT.dispatch_irq(&mut TrapFrame::for_vector(irq_vector(4)));
    assert_eq!(calls(), [2]);

    // Anexar durante o despacho não afeta a execução corrente
    REENTRANT.attach_irq(6, attach_more).unwrap();
    REENTRANT.dispatch_irq(&mut TrapFrame::for_vector(irq_vector(6)));
    assert_eq!(calls(), [8]);
    REENTRANT.dispatch_irq(&mut TrapFrame::for_vector(irq_vector(6)));
    assert_eq!(calls(), [8, 4]);
}

#[test]
fn dispatch_restores_interrupt_state() {
    use crate::arch::test::MockCpu;
    use crate::arch::CpuOps;

    let mgr = manager();
    mgr.attach(SYSCALL_VECTOR, h1).unwrap();

    MockCpu::set_interrupts(true);
    mgr.dispatch_fault(&mut TrapFrame::for_vector(SYSCALL_VECTOR));
    assert!(MockCpu::are_interrupts_enabled());
}
