pub mod bank_switch;
pub mod input_latch;

pub use bank_switch::BankSwitch;
pub use input_latch::{InputLatch, LatchHandle};

/// Memory-mapped hardware serviced by callbacks instead of raw storage.
///
/// Handlers receive the absolute bus address. They run synchronously on
/// the interpreter's call stack and must not step a CPU themselves.
pub trait DeviceHandler {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Side-effect-free read used for logging and digests.
    fn peek(&self, _addr: u16) -> u8 {
        0
    }
}

/// A device assembled from a pair of closures.
pub struct FnDevice<R, W> {
    read: R,
    write: W,
}

impl<R, W> FnDevice<R, W>
where
    R: FnMut(u16) -> u8,
    W: FnMut(u16, u8),
{
    pub fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R, W> DeviceHandler for FnDevice<R, W>
where
    R: FnMut(u16) -> u8,
    W: FnMut(u16, u8),
{
    fn read(&mut self, addr: u16) -> u8 {
        (self.read)(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        (self.write)(addr, data)
    }
}

/// Build a [`FnDevice`] from a read and a write callback.
pub fn from_fns<R, W>(read: R, write: W) -> FnDevice<R, W>
where
    R: FnMut(u16) -> u8,
    W: FnMut(u16, u8),
{
    FnDevice::new(read, write)
}
