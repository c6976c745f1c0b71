//! Testes dos drivers (lógica pura, sem acesso a portas)

#![cfg(test)]

use super::device::{probe_all, Device, DriverInit};
use super::pic::{classify, Ack};
use super::pit::{divisor_for, timer_tick, BASE_FREQUENCY};
use super::serial::{emit_hex, emit_str, take_captured};
use crate::arch::TrapFrame;
use crate::core::time::TickSource;
use crate::sys::Errno;

#[test]
fn serial_hex_formats() {
    take_captured();
    emit_hex(0x1f);
    emit_str(" ");
    emit_hex(0x1_0000_0000);
    assert_eq!(take_captured(), "0x0000001f 0x0000000100000000");
}

#[test]
fn pic_regular_irq_gets_eoi() {
    assert_eq!(classify(1, 0), Ack::Eoi { slave: false });
    assert_eq!(classify(12, 0), Ack::Eoi { slave: true });
}

#[test]
fn pic_detects_spurious_lines() {
    assert_eq!(classify(7, 0), Ack::SpuriousMaster);
    assert_eq!(classify(7, 1 << 7), Ack::Eoi { slave: false });
    assert_eq!(classify(15, 1 << 2), Ack::SpuriousSlave);
    assert_eq!(classify(15, 1 << 15), Ack::Eoi { slave: true });
}

#[test]
fn pit_divisor() {
    assert_eq!(divisor_for(1000), Ok((1193, 1000)));
    assert_eq!(divisor_for(0), Err(Errno::EINVAL));
    // Abaixo de ~18.2 Hz o divisor não cabe em 16 bits
    assert_eq!(divisor_for(10), Err(Errno::EINVAL));
    assert_eq!(divisor_for(BASE_FREQUENCY), Ok((1, BASE_FREQUENCY)));
}

#[test]
fn pit_tick_advances_counter() {
    let timer = super::pit::SystemTimer;
    let before = timer.ticks();
    timer_tick(&mut TrapFrame::for_vector(32));
    timer_tick(&mut TrapFrame::for_vector(32));
    // Outros testes também podem tickar em paralelo
    assert!(timer.ticks() >= before + 2);
}

struct NullDevice;

impl Device for NullDevice {
    fn name(&self) -> &str {
        "null"
    }

    fn read(&self, _buf: &mut [u8]) -> usize {
        0
    }

    fn write(&self, buf: &[u8]) -> usize {
        buf.len()
    }
}

static NULL: NullDevice = NullDevice;

fn null_init() -> Option<&'static dyn Device> {
    Some(&NULL)
}

fn absent_init() -> Option<&'static dyn Device> {
    None
}

#[test]
fn probe_registers_present_devices() {
    let drivers: [DriverInit; 3] = [null_init, absent_init, null_init];
    let mut names = std::vec::Vec::new();

    let found = probe_all(&drivers, |dev| names.push(dev.name()));

    assert_eq!(found, 2);
    assert_eq!(names, ["null", "null"]);
}
