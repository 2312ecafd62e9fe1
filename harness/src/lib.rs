//! Run-log harness: records a CPU's register and memory state instruction
//! by instruction and replays a recorded log against the interpreter.

pub mod config;
pub mod digest;
pub mod error;
pub mod image;
pub mod registry;
pub mod run;
pub mod runlog;
pub mod snapshot;
pub mod target;

pub use config::RunConfig;
pub use error::HarnessError;
pub use run::{Replay, record, replay};
pub use runlog::{MemInit, RunLog, State};
pub use target::{Session, Target};
