//! Testes da camada de vnodes

#![cfg(test)]

use super::*;
use crate::drivers::device::Device;
use crate::drivers::serial::take_captured;
use crate::sys::Errno;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::boxed::Box;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

// =============================================================================
// BACKEND DE TESTE
// =============================================================================

std::thread_local! {
    static RECLAIMS: Cell<usize> = const { Cell::new(0) };
}

fn reclaims() -> usize {
    RECLAIMS.with(|c| c.get())
}

fn count_reclaim(_node: &Vnode) -> Result<(), Errno> {
    RECLAIMS.with(|c| c.set(c.get() + 1));
    Ok(())
}

fn zero_read(_node: &Vnode, _offset: u32, buf: &mut [u8]) -> Result<usize, Errno> {
    buf.fill(0);
    Ok(buf.len())
}

fn deny_open(_node: &Vnode, flags: OpenFlags) -> Result<(), Errno> {
    if flags.contains(OpenFlags::WRITE) {
        Err(Errno::EROFS)
    } else {
        Ok(())
    }
}

static CHILD_OPS: OpTable = OpTable {
    reclaim: Some(count_reclaim),
    ..OpTable::EMPTY
};

fn child_lookup(_node: &Vnode, name: &str) -> Result<&'static Vnode, Errno> {
    if name == "child" {
        let node = Vnode::init(Some(&CHILD_OPS), None, core::ptr::null_mut())
            .map_err(|_| Errno::EIO)?;
        Ok(Box::leak(Box::new(node)))
    } else {
        Err(Errno::ENOENT)
    }
}

static FULL_OPS: OpTable = OpTable {
    open: Some(deny_open),
    close: None,
    reclaim: Some(count_reclaim),
    read: Some(zero_read),
    write: None,
    lookup: Some(child_lookup),
};

static NO_READ_OPS: OpTable = OpTable {
    reclaim: Some(count_reclaim),
    ..OpTable::EMPTY
};

fn node(ops: &'static OpTable) -> Vnode {
    Vnode::init(Some(ops), None, core::ptr::null_mut()).unwrap()
}

// =============================================================================
// CONSTRUÇÃO
// =============================================================================

#[test]
fn init_defaults() {
    let vn = node(&FULL_OPS);
    assert_eq!(vn.kind(), VnodeKind::Regular);
    assert_eq!(vn.refcount(), 1);
    assert!(vn.fs().is_none());
    assert!(vn.data().is_null());
}

#[test]
fn init_without_ops_fails() {
    let result = Vnode::init(None, None, core::ptr::null_mut());
    assert_eq!(result.err(), Some(FsError::MissingOps));
}

struct DevFs;

impl FileSystem for DevFs {
    fn name(&self) -> &str {
        "devfs"
    }

    fn root(&self) -> Option<&'static Vnode> {
        None
    }
}

static DEVFS: DevFs = DevFs;

#[test]
fn init_keeps_fs_and_payload() {
    let mut payload = 42u32;
    let data = &mut payload as *mut u32 as *mut ();

    let vn = Vnode::init(Some(&FULL_OPS), Some(&DEVFS), data).unwrap();
    assert_eq!(vn.fs().map(|fs| fs.name()), Some("devfs"));
    assert_eq!(vn.data(), data);
}

// =============================================================================
// REFERÊNCIAS
// =============================================================================

#[test]
fn reclaim_runs_once_on_last_decref() {
    let vn = node(&FULL_OPS);
    let base = reclaims();

    vn.incref();
    assert_eq!(vn.refcount(), 2);

    vn.decref();
    assert_eq!(reclaims(), base);
    assert!(!vn.is_bad());

    vn.decref();
    assert_eq!(reclaims(), base + 1);
    assert_eq!(vn.kind(), VnodeKind::Bad);
    assert!(vn.data().is_null());
}

#[test]
#[should_panic(expected = "refcount underflow")]
fn decref_past_zero_panics() {
    let vn = node(&FULL_OPS);
    vn.decref();
    vn.decref();
}

#[test]
#[should_panic(expected = "used after reclaim")]
fn read_after_reclaim_panics() {
    let vn = node(&FULL_OPS);
    vn.decref();
    let mut buf = [0u8; 4];
    let _ = vn.read(0, &mut buf);
}

#[test]
#[should_panic(expected = "used after reclaim")]
fn incref_after_reclaim_panics() {
    let vn = node(&FULL_OPS);
    vn.decref();
    vn.incref();
}

#[test]
fn kill_reclaims_immediately() {
    let vn = node(&FULL_OPS);
    vn.incref();
    let base = reclaims();

    vn.kill();
    assert_eq!(reclaims(), base + 1);
    assert!(vn.is_bad());

    // Referências restantes caem sem novo reclaim
    vn.kill();
    vn.decref();
    vn.decref();
    assert_eq!(reclaims(), base + 1);
}

#[test]
fn refcount_restores_interrupts() {
    use crate::arch::test::MockCpu;
    use crate::arch::CpuOps;

    let vn = node(&FULL_OPS);
    MockCpu::set_interrupts(true);
    let before = MockCpu::disable_count();

    vn.incref();
    vn.decref();

    assert!(MockCpu::disable_count() >= before + 2);
    assert!(MockCpu::are_interrupts_enabled());
}

// =============================================================================
// DESPACHO
// =============================================================================

#[test]
fn dispatch_reaches_backend() {
    let vn = node(&FULL_OPS);
    let mut buf = [0xAAu8; 8];

    assert_eq!(vn.read(0, &mut buf), Ok(8));
    assert_eq!(buf, [0; 8]);
    assert_eq!(vn.open(OpenFlags::READ), Ok(()));
    assert_eq!(vn.open(OpenFlags::READ_WRITE), Err(Errno::EROFS));
}

#[test]
fn lookup_returns_child() {
    let dir = node(&FULL_OPS);
    dir.set_kind(VnodeKind::Directory);

    let child = dir.lookup("child").unwrap();
    assert_eq!(child.refcount(), 1);
    assert!(matches!(dir.lookup("missing"), Err(Errno::ENOENT)));
}

#[test]
#[should_panic(expected = "operation `read` missing")]
fn read_without_entry_panics() {
    let vn = node(&NO_READ_OPS);
    let mut buf = [0u8; 4];
    let _ = vn.read(0, &mut buf);
}

#[test]
#[should_panic(expected = "operation `write` missing")]
fn write_without_entry_panics() {
    let vn = node(&FULL_OPS);
    let _ = vn.write(0, b"abc");
}

#[test]
#[should_panic(expected = "operation `close` missing")]
fn check_panics_on_absent_operation() {
    let vn = node(&FULL_OPS);
    let _ = vn.check("close", FULL_OPS.close);
}

#[test]
fn missing_operation_is_logged_before_panic() {
    let vn = node(&NO_READ_OPS);
    take_captured();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut buf = [0u8; 4];
        let _ = vn.read(0, &mut buf);
    }));

    assert!(result.is_err());
    let log = take_captured();
    assert!(log.contains("Operação de vnode ausente"));
    assert!(log.contains("read"));
}

#[test]
fn use_after_reclaim_is_logged_before_panic() {
    let vn = node(&FULL_OPS);
    vn.decref();
    take_captured();

    let result = catch_unwind(AssertUnwindSafe(|| vn.lookup("child")));

    assert!(result.is_err());
    let log = take_captured();
    assert!(log.contains("vnode usado após reclaim"));
    assert!(log.contains("lookup"));
}

#[test]
fn refcount_underflow_is_logged_before_panic() {
    let vn = node(&FULL_OPS);
    vn.decref();
    take_captured();

    let result = catch_unwind(AssertUnwindSafe(|| vn.decref()));

    assert!(result.is_err());
    assert!(take_captured().contains("Refcount underflow"));
}

#[test]
fn check_accepts_present_operation() {
    let vn = node(&FULL_OPS);
    let read = vn.check("read", FULL_OPS.read);
    let mut buf = [0xFFu8; 2];
    assert_eq!(read(&vn, 0, &mut buf), Ok(2));
    assert_eq!(buf, [0; 2]);
}

// =============================================================================
// NÓ DE DISPOSITIVO
// =============================================================================

struct LoopDevice {
    written: AtomicUsize,
}

impl Device for LoopDevice {
    fn name(&self) -> &str {
        "loop"
    }

    fn read(&self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(3);
        buf[..n].copy_from_slice(&b"abc"[..n]);
        n
    }

    fn write(&self, buf: &[u8]) -> usize {
        self.written.fetch_add(buf.len(), Ordering::Relaxed);
        buf.len()
    }
}

static LOOP: LoopDevice = LoopDevice {
    written: AtomicUsize::new(0),
};
static LOOP_NODE: DeviceNode = DeviceNode::new(&LOOP);

#[test]
fn device_node_forwards_io() {
    let vn = LOOP_NODE.vnode(Some(&DEVFS)).unwrap();
    assert_eq!(vn.kind(), VnodeKind::CharDevice);

    let mut buf = [0u8; 8];
    assert_eq!(vn.read(100, &mut buf), Ok(3));
    assert_eq!(&buf[..3], b"abc");

    assert_eq!(vn.write(0, b"hello"), Ok(5));
    assert!(LOOP.written.load(Ordering::Relaxed) >= 5);

    assert!(matches!(vn.lookup("x"), Err(Errno::ENOTDIR)));
    assert_eq!(vn.open(OpenFlags::READ_WRITE), Ok(()));
    assert_eq!(vn.close(), Ok(()));

    vn.decref();
    assert!(vn.is_bad());
}
