pub mod core;
pub mod cpu;
pub mod device;
pub mod memory;

pub mod prelude {
    pub use crate::core::{Bus, Endian, PendingInterrupts};
    pub use crate::cpu::{Cpu, Exit, StepResult};
    pub use crate::device::DeviceHandler;
    pub use crate::memory::{MemoryError, MemoryMap, MemoryMapBuilder, SegmentKind};
}
