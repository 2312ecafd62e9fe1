//! TOML run configuration.
//!
//! ```toml
//! load_addr = 0x1000
//! instructions = 100
//! digest = true
//!
//! [[memory]]
//! base = 0
//! size = 0x10000
//! writeable = true
//!
//! [registers]
//! pc = 0x1000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::runlog::MemInit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub load_addr: u16,
    pub instructions: usize,
    /// Digest memory after every instruction that dirtied it, not only at
    /// the first and last state.
    pub digest: bool,
    pub memory: Vec<MemInit>,
    /// CPU-specific starting registers in run-log layout. Absent means the
    /// CPU's power-on state.
    pub registers: Option<toml::Table>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            load_addr: 0x1000,
            instructions: 100,
            digest: true,
            memory: vec![MemInit {
                base: 0,
                size: 0x10000,
                writeable: true,
            }],
            registers: None,
        }
    }
}

impl RunConfig {
    pub fn from_toml(text: &str) -> Result<Self, HarnessError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        Self::from_toml(&text)
    }

    /// Starting registers as JSON, ready for a CPU's snapshot type.
    pub fn registers_json(&self) -> Result<Option<serde_json::Value>, HarnessError> {
        self.registers
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(HarnessError::from)
    }
}
