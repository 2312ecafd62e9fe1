use std::io;
use std::path::PathBuf;

use eightbit_core::memory::MemoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: invalid ZIP: {source}", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{}: archive contains no files", path.display())]
    EmptyArchive { path: PathBuf },

    #[error("invalid run configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid run log: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("bad register value: {0}")]
    Registers(String),

    #[error("run log has no states")]
    EmptyLog,

    #[error("mismatch after {step} instructions: {field} is {actual}, log has {expected}")]
    Mismatch {
        step: usize,
        field: &'static str,
        expected: String,
        actual: String,
    },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }
}
