/*!
 * Opening destination files, creating them and their parents on demand
 */

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;

use crate::error::{IoResultExt, Result};

fn open_rw(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}

/// Open `path` for reading and writing, creating the file if needed.
///
/// Parent directories are only created after a first open fails. Concurrent
/// workers may race on the same directories.
pub fn open_or_create(path: &Path) -> Result<File> {
    match open_rw(path) {
        Ok(f) => Ok(f),
        Err(first) => {
            let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
                return Err(first).op("create", path);
            };
            fs::create_dir_all(parent).op("create directory", parent)?;
            open_rw(path).op("create", path)
        }
    }
}

/// Open an existing file read-only. A missing file is `Ok(None)`.
pub fn open_existing(path: &Path) -> Result<Option<File>> {
    match File::open(path) {
        Ok(f) => Ok(Some(f)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).op("open", path),
    }
}
