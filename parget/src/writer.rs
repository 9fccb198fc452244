//! Positional writes into the shared destination file.
//!
//! Every write opens its own handle, so concurrent tasks never share file
//! state. Safety across tasks comes from the planner's guarantee that
//! assigned ranges are pairwise disjoint; the writer itself takes no locks.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{DownloadError, DownloadResult};

/// Create (or truncate) the destination file and pre-size it.
///
/// Parent directories are created as needed. Pre-sizing with `set_len`
/// means later positional writes never race to extend the file.
pub fn prepare_destination(path: &Path, total_len: u64) -> DownloadResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| DownloadError::Create {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let file = File::create(path).map_err(|e| DownloadError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;
    file.set_len(total_len).map_err(|e| DownloadError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Write `data` at `offset`, leaving every byte outside
/// `[offset, offset + data.len())` untouched.
///
/// The destination must already exist (see [`prepare_destination`]). An
/// empty block is a successful no-op, which is how degenerate ranges from
/// the planner complete.
pub fn write_at(path: &Path, offset: u64, data: &[u8]) -> DownloadResult<()> {
    if data.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| DownloadError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

    file.seek(SeekFrom::Start(offset))
        .map_err(|e| DownloadError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

    file.write_all(data).map_err(|e| DownloadError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
