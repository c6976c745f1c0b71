//! Testes das primitivas de sincronização

#![cfg(test)]

use super::*;
use crate::arch::test::MockCpu;
use crate::arch::CpuOps;

#[test]
fn guard_restores_enabled_state() {
    MockCpu::set_interrupts(true);
    {
        let guard = InterruptGuard::new();
        assert!(guard.were_enabled());
        assert!(!MockCpu::are_interrupts_enabled());
    }
    assert!(MockCpu::are_interrupts_enabled());
}

#[test]
fn nested_guard_does_not_reenable_early() {
    MockCpu::set_interrupts(true);
    let outer = InterruptGuard::new();
    {
        let inner = InterruptGuard::new();
        assert!(!inner.were_enabled());
    }
    assert!(!MockCpu::are_interrupts_enabled());
    drop(outer);
    assert!(MockCpu::are_interrupts_enabled());
}

#[test]
fn guard_keeps_disabled_state() {
    MockCpu::set_interrupts(false);
    without_interrupts(|| ());
    assert!(!MockCpu::are_interrupts_enabled());
}

#[test]
fn without_interrupts_restores_on_early_return() {
    MockCpu::set_interrupts(true);
    let value = without_interrupts(|| {
        if MockCpu::are_interrupts_enabled() {
            return 1;
        }
        2
    });
    assert_eq!(value, 2);
    assert!(MockCpu::are_interrupts_enabled());
}

#[test]
fn spinlock_disables_interrupts_while_held() {
    MockCpu::set_interrupts(true);
    let lock = Spinlock::new(5u32);
    {
        let mut guard = lock.lock();
        *guard += 1;
        assert!(lock.is_locked());
        assert!(!MockCpu::are_interrupts_enabled());
        assert!(lock.try_lock().is_none());
        // try_lock falho não pode reabilitar interrupções
        assert!(!MockCpu::are_interrupts_enabled());
    }
    assert!(!lock.is_locked());
    assert!(MockCpu::are_interrupts_enabled());
    assert_eq!(*lock.lock(), 6);
}
