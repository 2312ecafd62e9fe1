pub mod bus;

pub use bus::{Bus, Endian, PendingInterrupts};
