//! Run-log file format.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use eightbit_core::memory::{MemoryMap, MemoryMapBuilder};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// One memory block of the run. Writeable blocks are RAM, the rest ROM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemInit {
    pub base: u16,
    pub size: usize,
    pub writeable: bool,
}

/// Machine state before the first instruction and after each one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub regs: serde_json::Value,
    /// Memory digest; only present when memory was hashed at this state.
    pub digest: Option<String>,
    /// Cycles consumed since the start of the run.
    pub cycles: u64,
    /// The five bytes at PC.
    pub mem: [u8; 5],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub file_name: String,
    pub load_addr: u16,
    pub memory: Vec<MemInit>,
    pub states: Vec<State>,
}

impl RunLog {
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn save(&self, path: &Path) -> Result<(), HarnessError> {
        let file = File::create(path).map_err(|e| HarnessError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| HarnessError::io(path, e))
    }

    /// Build the run's memory map from its block list.
    pub fn memory_map(&self) -> Result<MemoryMap, HarnessError> {
        build_memory(&self.memory)
    }

    /// Where the program image lives: `file_name` as written when it
    /// exists, otherwise relative to the log's own directory.
    pub fn image_path(&self, log_path: &Path) -> PathBuf {
        let name = Path::new(&self.file_name);
        if name.is_absolute() || name.exists() {
            return name.to_path_buf();
        }
        match log_path.parent() {
            Some(dir) => dir.join(name),
            None => name.to_path_buf(),
        }
    }
}

pub fn build_memory(blocks: &[MemInit]) -> Result<MemoryMap, HarnessError> {
    let mut builder = MemoryMapBuilder::new();
    for block in blocks {
        if block.writeable {
            builder.ram(block.base, block.size);
        } else {
            builder.rom(block.base, block.size);
        }
    }
    Ok(builder.build()?)
}
