/*!
 * Precheck: decide whether a manifest file has to be downloaded at all
 *
 * A precheck job short-circuits the download when:
 * - the file already exists at the destination (and the secondary
 *   destination, if any); a valid copy at only one of the two is copied over
 *   to the other;
 * - the file exists at the migration source, in which case it is moved or
 *   copied into place.
 *
 * Anything else becomes a [`DownloadJob`] carrying the already open
 * destination handles.
 */

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use tracing::{info, warn};

use super::checksum::ContentCheck;
use super::download::{DownloadJob, TargetFile};
use super::materialize;
use super::migrate::{self, copy_whole_file};
use crate::error::{IoResultExt, Result, SyncError};

/// Everything needed to place one manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecheckJob {
    /// Where to fetch the file from if no local copy can be reused
    pub download_url: String,

    /// User-Agent override for the download request
    pub user_agent: Option<String>,

    /// Destination of the file
    pub destination: PathBuf,

    /// Second place that must end up with an identical copy
    pub secondary_destination: Option<PathBuf>,

    /// Same file in a previous installation, possibly absent or outdated
    pub migrate_from: Option<PathBuf>,

    /// Copy from the migration source instead of moving it
    pub preserve_migration_source: bool,

    /// Expected size and digest
    pub check: ContentCheck,
}

/// What a precheck job did with its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecheckOutcome {
    /// Every destination already held valid content
    Skipped,
    /// One destination was valid and was copied to the other
    Reconciled,
    /// Content came from the migration source
    Migrated,
    /// Handed to the download stage
    Queued,
    /// An error ended the job; it has been logged
    Failed,
}

impl PrecheckJob {
    /// Run the job, sending at most one download job to `downloads`.
    ///
    /// Errors are logged here and never propagate: one file failing does not
    /// affect any other.
    pub fn run(&self, downloads: &Sender<DownloadJob>) -> PrecheckOutcome {
        let result = match &self.secondary_destination {
            None => self.run_single(downloads),
            Some(secondary) => self.run_dual(secondary, downloads),
        };

        result.unwrap_or_else(|e| {
            warn!(
                path = %self.destination.display(),
                error = %e,
                "Precheck failed"
            );
            PrecheckOutcome::Failed
        })
    }

    fn run_single(&self, downloads: &Sender<DownloadJob>) -> Result<PrecheckOutcome> {
        let (dest, valid) = self.open_destination(&self.destination)?;
        if valid {
            info!(path = %self.destination.display(), "Skipping existing file");
            return Ok(PrecheckOutcome::Skipped);
        }

        let target = TargetFile::new(dest, &self.destination);

        let Some(migrate_from) = &self.migrate_from else {
            return self.queue(downloads, target, None);
        };
        let Some(source) = self.open_migration_source(migrate_from)? else {
            return self.queue(downloads, target, None);
        };

        migrate::migrate(
            source,
            migrate_from,
            target.file,
            &self.destination,
            self.preserve_migration_source,
        )?;
        Ok(PrecheckOutcome::Migrated)
    }

    fn run_dual(
        &self,
        secondary: &Path,
        downloads: &Sender<DownloadJob>,
    ) -> Result<PrecheckOutcome> {
        let (first, first_valid) = self.open_destination(&self.destination)?;
        let (second, second_valid) = self.open_destination(secondary)?;

        match (first_valid, second_valid) {
            (true, true) => {
                info!(
                    path = %self.destination.display(),
                    secondary_path = %secondary.display(),
                    "Skipping existing files"
                );
                Ok(PrecheckOutcome::Skipped)
            }
            (true, false) => Ok(reconcile(first, &self.destination, second, secondary)),
            (false, true) => Ok(reconcile(second, secondary, first, &self.destination)),
            (false, false) => {
                let first = TargetFile::new(first, &self.destination);
                let second = TargetFile::new(second, secondary);

                let source = match &self.migrate_from {
                    Some(path) => self.open_migration_source(path)?.map(|f| (f, path)),
                    None => None,
                };
                match source {
                    Some((source, source_path)) => {
                        Ok(self.fan_out(source, source_path, first, second))
                    }
                    None => self.queue(downloads, first, Some(second)),
                }
            }
        }
    }

    /// Copy a verified migration source into the first destination, then
    /// migrate it into the second.
    ///
    /// The second leg may only consume the source when the first leg
    /// succeeded; otherwise it is forced to copy so the source survives.
    fn fan_out(
        &self,
        mut source: File,
        source_path: &Path,
        mut first: TargetFile,
        second: TargetFile,
    ) -> PrecheckOutcome {
        let first_failed = match copy_whole_file(&mut first.file, &mut source) {
            Ok(_) => {
                info!(
                    src = %source_path.display(),
                    dst = %first.path.display(),
                    "Copied existing file"
                );
                false
            }
            Err(e) => {
                warn!(
                    src = %source_path.display(),
                    dst = %first.path.display(),
                    error = %e,
                    "Failed to copy file"
                );
                true
            }
        };
        drop(first);

        let keep_source = self.preserve_migration_source || first_failed;
        match migrate::migrate(source, source_path, second.file, &second.path, keep_source) {
            Ok(_) if first_failed => PrecheckOutcome::Failed,
            Ok(_) => PrecheckOutcome::Migrated,
            Err(e) => {
                warn!(
                    src = %source_path.display(),
                    dst = %second.path.display(),
                    error = %e,
                    "Failed to migrate file"
                );
                PrecheckOutcome::Failed
            }
        }
    }

    /// Open or create a destination and check its content
    fn open_destination(&self, path: &Path) -> Result<(File, bool)> {
        let mut file = materialize::open_or_create(path)?;
        let valid = self.check.verify(&mut file).op("verify", path)?;
        Ok((file, valid))
    }

    /// Open the migration source without creating it. `None` when it is
    /// absent or does not match.
    fn open_migration_source(&self, path: &Path) -> Result<Option<File>> {
        let Some(mut file) = materialize::open_existing(path)? else {
            return Ok(None);
        };
        if self.check.verify(&mut file).op("verify", path)? {
            Ok(Some(file))
        } else {
            Ok(None)
        }
    }

    fn queue(
        &self,
        downloads: &Sender<DownloadJob>,
        mut target: TargetFile,
        mut secondary: Option<TargetFile>,
    ) -> Result<PrecheckOutcome> {
        target.file.seek(SeekFrom::Start(0)).op("rewind", &target.path)?;
        if let Some(secondary) = secondary.as_mut() {
            secondary.file.seek(SeekFrom::Start(0)).op("rewind", &secondary.path)?;
        }

        downloads
            .send(DownloadJob {
                url: self.download_url.clone(),
                user_agent: self.user_agent.clone(),
                target,
                secondary,
            })
            .map_err(|_| SyncError::ChannelClosed("download jobs"))?;
        Ok(PrecheckOutcome::Queued)
    }
}

/// Copy a valid destination over an invalid one. A failure is logged only;
/// the copy is not re-verified.
fn reconcile(mut src: File, src_path: &Path, mut dst: File, dst_path: &Path) -> PrecheckOutcome {
    match copy_whole_file(&mut dst, &mut src) {
        Ok(_) => {
            info!(
                src = %src_path.display(),
                dst = %dst_path.display(),
                "Copied existing file"
            );
            PrecheckOutcome::Reconciled
        }
        Err(e) => {
            warn!(
                src = %src_path.display(),
                dst = %dst_path.display(),
                error = %e,
                "Failed to copy file"
            );
            PrecheckOutcome::Failed
        }
    }
}
