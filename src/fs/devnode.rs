//! Nó de dispositivo.
//!
//! Expõe um `Device` (driver de caractere) pela camada de vnodes: leitura e
//! escrita vão direto para o driver, o offset é ignorado.

use super::ops::VnodeOps;
use super::vnode::{Vnode, VnodeKind};
use super::{FileSystem, FsResult, OpenFlags};
use crate::drivers::device::Device;
use crate::sys::Errno;

pub struct DeviceNode {
    device: &'static dyn Device,
}

impl DeviceNode {
    pub const fn new(device: &'static dyn Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &'static dyn Device {
        self.device
    }

    /// Cria um vnode `CharDevice` servido por este backend.
    pub fn vnode(&'static self, fs: Option<&'static dyn FileSystem>) -> FsResult<Vnode> {
        let node = Vnode::init(Some(self), fs, core::ptr::null_mut())?;
        node.set_kind(VnodeKind::CharDevice);
        crate::ktrace!("(VFS) devnode criado");
        Ok(node)
    }
}

impl VnodeOps for DeviceNode {
    fn open(&self, _node: &Vnode, _flags: OpenFlags) -> Result<(), Errno> {
        Ok(())
    }

    fn close(&self, _node: &Vnode) -> Result<(), Errno> {
        Ok(())
    }

    fn reclaim(&self, _node: &Vnode) -> Result<(), Errno> {
        // O dispositivo vive além do nó
        Ok(())
    }

    fn read(&self, _node: &Vnode, _offset: u32, buf: &mut [u8]) -> Result<usize, Errno> {
        Ok(self.device.read(buf))
    }

    fn write(&self, _node: &Vnode, _offset: u32, buf: &[u8]) -> Result<usize, Errno> {
        Ok(self.device.write(buf))
    }

    fn lookup(&self, _node: &Vnode, _name: &str) -> Result<&'static Vnode, Errno> {
        Err(Errno::ENOTDIR)
    }
}
