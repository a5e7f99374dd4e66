/*!
 * Reusing a verified file from a previous installation
 *
 * A migration first tries an atomic rename and falls back to copying. The
 * source is removed only after a copy has fully succeeded.
 */

use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, info, warn};

use super::materialize;
use crate::error::{IoResultExt, Result, SyncError};

/// How a migration leg completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The source was renamed onto the destination
    Moved,
    /// The content was copied; `source_removed` is false when the source was
    /// kept on purpose or its removal failed
    Copied { source_removed: bool },
}

/// Copy the whole of `src` over `dst`, starting both at offset 0.
///
/// `dst` is truncated to the copied length so stale trailing bytes from an
/// older, longer file do not survive.
pub fn copy_whole_file(dst: &mut File, src: &mut File) -> io::Result<u64> {
    src.seek(SeekFrom::Start(0))?;
    dst.seek(SeekFrom::Start(0))?;
    let n = io::copy(src, dst)?;
    dst.set_len(n)?;
    Ok(n)
}

/// Move or copy a verified `source` file onto `dest_path`.
///
/// Both handles are consumed. With `keep_source` unset the handles are closed
/// and a rename is attempted; if it fails (cross-device, permissions, ...) both
/// files are reopened and the content is copied instead, after which the
/// source is removed. With `keep_source` set the open handles are reused for
/// the copy and the source is left in place.
pub fn migrate(
    source: File,
    source_path: &Path,
    dest: File,
    dest_path: &Path,
    keep_source: bool,
) -> Result<MigrationOutcome> {
    migrate_with(source, source_path, dest, dest_path, keep_source, |from, to| {
        fs::rename(from, to)
    })
}

pub(crate) fn migrate_with<F>(
    source: File,
    source_path: &Path,
    dest: File,
    dest_path: &Path,
    keep_source: bool,
    rename: F,
) -> Result<MigrationOutcome>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let (mut source, mut dest) = if keep_source {
        (source, dest)
    } else {
        drop(source);
        drop(dest);

        match rename(source_path, dest_path) {
            Ok(()) => {
                info!(
                    src = %source_path.display(),
                    dst = %dest_path.display(),
                    "Moved existing file"
                );
                return Ok(MigrationOutcome::Moved);
            }
            Err(e) => debug!(
                src = %source_path.display(),
                dst = %dest_path.display(),
                error = %e,
                "Rename failed, falling back to copy"
            ),
        }

        let dest = materialize::open_or_create(dest_path)?;
        let source = File::open(source_path).op("open", source_path)?;
        (source, dest)
    };

    copy_whole_file(&mut dest, &mut source)
        .map_err(|e| SyncError::file_op("copy into", dest_path, e))?;

    info!(
        src = %source_path.display(),
        dst = %dest_path.display(),
        "Copied existing file"
    );

    drop(source);
    drop(dest);

    if keep_source {
        return Ok(MigrationOutcome::Copied {
            source_removed: false,
        });
    }

    match fs::remove_file(source_path) {
        Ok(()) => {
            info!(path = %source_path.display(), "Removed migration source file");
            Ok(MigrationOutcome::Copied {
                source_removed: true,
            })
        }
        Err(e) => {
            warn!(
                path = %source_path.display(),
                error = %e,
                "Failed to remove migration source file"
            );
            Ok(MigrationOutcome::Copied {
                source_removed: false,
            })
        }
    }
}
