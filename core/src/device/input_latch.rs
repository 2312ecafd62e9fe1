use std::cell::Cell;
use std::rc::Rc;

use super::DeviceHandler;

/// Input port whose value is latched by the owner (e.g. a joystick or coin
/// switch bank) and sampled by the CPU.
///
/// The value lives behind a shared handle so the collaborator can change it
/// between `step` calls while the map owns the device. Writes from the CPU
/// acknowledge the port and reset the value to `idle`.
pub struct InputLatch {
    value: Rc<Cell<u8>>,
    reads: Rc<Cell<u32>>,
    idle: u8,
}

/// Owner-side view of an [`InputLatch`].
#[derive(Clone)]
pub struct LatchHandle {
    value: Rc<Cell<u8>>,
    reads: Rc<Cell<u32>>,
}

impl InputLatch {
    /// Create a latch reading `idle` until the owner sets a value.
    pub fn new(idle: u8) -> (Self, LatchHandle) {
        let value = Rc::new(Cell::new(idle));
        let reads = Rc::new(Cell::new(0));
        let handle = LatchHandle {
            value: Rc::clone(&value),
            reads: Rc::clone(&reads),
        };
        (Self { value, reads, idle }, handle)
    }
}

impl LatchHandle {
    pub fn set(&self, value: u8) {
        self.value.set(value);
    }

    pub fn get(&self) -> u8 {
        self.value.get()
    }

    /// Number of CPU reads since the latch was created.
    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl DeviceHandler for InputLatch {
    fn read(&mut self, _addr: u16) -> u8 {
        self.reads.set(self.reads.get().wrapping_add(1));
        self.value.get()
    }

    fn write(&mut self, _addr: u16, _data: u8) {
        self.value.set(self.idle);
    }

    fn peek(&self, _addr: u16) -> u8 {
        self.value.get()
    }
}
