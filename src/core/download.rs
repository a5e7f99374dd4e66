/*!
 * Download jobs: the hand-off from precheck to the network stage
 */

use std::fs::File;
use std::path::PathBuf;
use std::time::SystemTime;

use tracing::{info, warn};

use super::metadata::set_modified;
use super::migrate::copy_whole_file;
use crate::error::{IoResultExt, Result, SyncError};

/// What a fetch reports back about the transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchResponse {
    /// Bytes written into the destination
    pub bytes: u64,
    /// Remote modification time, when the server sent a parsable one
    pub modified: Option<SystemTime>,
}

/// Network transfer of one URL into an already open file
///
/// Implementations write the body starting at the file's current position
/// (always offset 0 for download jobs). Retries, if any, are the
/// implementation's business.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, user_agent: Option<&str>, dst: &mut File) -> Result<FetchResponse>;
}

/// An open destination and where it lives
#[derive(Debug)]
pub struct TargetFile {
    pub file: File,
    pub path: PathBuf,
}

impl TargetFile {
    pub fn new(file: File, path: impl Into<PathBuf>) -> Self {
        Self {
            file,
            path: path.into(),
        }
    }
}

/// A file that has to come from the network
///
/// Owns its handles: whoever holds the job is the only one touching them, and
/// dropping the job closes them.
#[derive(Debug)]
pub struct DownloadJob {
    pub url: String,
    pub user_agent: Option<String>,
    pub target: TargetFile,
    /// Receives a copy of the downloaded content
    pub secondary: Option<TargetFile>,
}

impl DownloadJob {
    /// Fetch once, duplicate into the secondary target, then stamp both files
    /// with the remote modification time.
    ///
    /// A failed fetch leaves whatever was written in place; the next run's
    /// verification rejects the partial file.
    pub fn run(self, fetcher: &dyn Fetcher) -> Result<u64> {
        let DownloadJob {
            url,
            user_agent,
            mut target,
            secondary,
        } = self;

        let response = fetcher.fetch(&url, user_agent.as_deref(), &mut target.file)?;
        target.file.set_len(response.bytes).op("truncate", &target.path)?;

        let mut targets = vec![target];
        if let Some(mut secondary) = secondary {
            copy_whole_file(&mut secondary.file, &mut targets[0].file)
                .map_err(|e| SyncError::file_op("copy into", &secondary.path, e))?;
            targets.push(secondary);
        }

        for t in &targets {
            if let Some(modified) = response.modified {
                if let Err(e) = set_modified(&t.file, &t.path, modified) {
                    warn!(error = %e, "Failed to apply remote modification time");
                }
            }
            info!(url = %url, path = %t.path.display(), bytes = response.bytes, "Downloaded file");
        }

        Ok(response.bytes)
    }
}
