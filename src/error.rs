/*!
 * Error types for modsync
 */

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL: i32 = 1;

#[derive(Debug, Error)]
pub enum SyncError {
    /// I/O error without a specific file attached
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A file operation failed on a specific path
    #[error("Failed to {op} {}: {source}", path.display())]
    FileOp {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Manifest retrieval or interpretation failed
    #[error("Manifest error: {0}")]
    Manifest(#[from] modsync_manifest::Error),

    /// Network transfer failed
    #[error("Fetch of {url} failed: {message}")]
    Fetch { url: String, message: String },

    /// Remote answered with a non-success status
    #[error("Fetch of {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// A pipeline channel was closed while work was still being handed over
    #[error("Pipeline channel closed: {0}")]
    ChannelClosed(&'static str),

    /// A worker thread could not be started
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(io::Error),
}

impl SyncError {
    /// Attach an operation name and a path to an I/O error
    pub fn file_op(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        SyncError::FileOp {
            op,
            path: path.into(),
            source,
        }
    }

    /// Check if this error came from the network side of a transfer
    pub fn is_network_error(&self) -> bool {
        match self {
            SyncError::Fetch { .. } | SyncError::HttpStatus { .. } => true,
            SyncError::Manifest(e) => e.is_network_error(),
            _ => false,
        }
    }
}

/// Extension for tagging `io::Result` values with the failed operation
pub(crate) trait IoResultExt<T> {
    fn op(self, op: &'static str, path: &std::path::Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn op(self, op: &'static str, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| SyncError::file_op(op, path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_file_op_display() {
        let err = SyncError::file_op(
            "open",
            "/srv/pack/mods/a.jar",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to open /srv/pack/mods/a.jar: no such file"
        );
    }

    #[test]
    fn test_io_result_ext_tags_path() {
        let res: io::Result<()> = Err(io::Error::other("boom"));
        match res.op("rename", Path::new("x/y")) {
            Err(SyncError::FileOp { op, path, .. }) => {
                assert_eq!(op, "rename");
                assert_eq!(path, PathBuf::from("x/y"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_network_classification() {
        assert!(SyncError::HttpStatus {
            url: "https://example.invalid/a".to_string(),
            status: 404,
        }
        .is_network_error());
        assert!(!SyncError::Config("bad".to_string()).is_network_error());
        assert!(!SyncError::Io(io::Error::other("x")).is_network_error());
        assert!(!SyncError::file_op("copy into", "mods/a.jar", io::Error::other("full"))
            .is_network_error());
    }

    #[test]
    fn test_manifest_network_errors_propagate() {
        let err = SyncError::from(modsync_manifest::Error::Status {
            url: "https://api.modpacks.ch/public/modpack/1".to_string(),
            status: 503,
        });
        assert!(err.is_network_error());

        let err = SyncError::from(modsync_manifest::Error::NoVersions { modpack_id: 1 });
        assert!(!err.is_network_error());
    }
}
