/*!
 * File timestamp updates after a download
 */

use crate::error::{Result, SyncError};
use filetime::{set_file_handle_times, FileTime};
use std::fs::File;
use std::path::Path;
use std::time::SystemTime;

/// Set the modification time of an open file, leaving its access time alone
pub fn set_modified(file: &File, path: &Path, modified: SystemTime) -> Result<()> {
    set_file_handle_times(file, None, Some(FileTime::from_system_time(modified)))
        .map_err(|e| SyncError::file_op("set modification time of", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::materialize;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_set_modified() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.jar");
        let f = materialize::open_or_create(&path).unwrap();

        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        set_modified(&f, &path, when).unwrap();
        drop(f);

        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), when);
    }
}
