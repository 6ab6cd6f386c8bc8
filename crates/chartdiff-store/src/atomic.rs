//! Atomic write primitives
//!
//! Uses temp→rename pattern so a report file is never observed half-written

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result};
use std::fs;
use std::path::Path;

/// Atomically write bytes to a file, creating parent directories
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create_output_dir", e))?;
        }
    }

    // Temp file lives beside the target so the rename stays on one filesystem
    let mut temp_name = target_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = target_path.with_file_name(temp_name);

    fs::write(&temp_path, content).map_err(|e| io_error("write_output_temp", e))?;
    fs::rename(&temp_path, target_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        io_error("rename_output_temp", e)
    })?;

    Ok(())
}
