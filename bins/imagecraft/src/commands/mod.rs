//! CLI command implementations

pub mod batch;
pub mod inspect;
pub mod transform;

use imagecraft_core::{Error, Result};
use std::path::Path;

/// Read an input file, mapping a missing file to a friendly error.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }
    Ok(std::fs::read(path)?)
}
