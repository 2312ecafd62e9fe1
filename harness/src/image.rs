//! Program image loading: raw binaries, gzip files and ZIP archives.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::HarnessError;

/// Read a program image. `.gz` files are inflated; `.zip` archives yield
/// their first file entry. Anything else is taken as raw bytes.
pub fn load_image(path: &Path) -> Result<Vec<u8>, HarnessError> {
    match extension(path).as_deref() {
        Some("gz") => load_gzip(path),
        Some("zip") => load_from_zip(path),
        _ => std::fs::read(path).map_err(|e| HarnessError::io(path, e)),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn load_gzip(path: &Path) -> Result<Vec<u8>, HarnessError> {
    let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .map_err(|e| HarnessError::io(path, e))?;
    Ok(data)
}

fn load_from_zip(path: &Path) -> Result<Vec<u8>, HarnessError> {
    let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|source| HarnessError::Zip {
        path: path.to_path_buf(),
        source,
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|source| HarnessError::Zip {
            path: path.to_path_buf(),
            source,
        })?;

        // Skip directories
        if entry.is_dir() {
            continue;
        }

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| HarnessError::io(path, e))?;
        return Ok(data);
    }

    Err(HarnessError::EmptyArchive {
        path: path.to_path_buf(),
    })
}
