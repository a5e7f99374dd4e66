/*!
 * One sync run: manifests in, installed files out
 */

use std::sync::Arc;

use modsync_manifest::{Error as ManifestError, ModpackClient};
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::core::concurrency::CancelToken;
use crate::core::download::Fetcher;
use crate::core::pipeline::Pipeline;
use crate::error::{Result, SyncError};
use crate::plan::{precheck_job, PlanOptions};

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub modpack_id: i64,
    pub version_id: i64,
    /// Entries in the version's file list
    pub files: usize,
    /// Entries handed to the pipeline
    pub submitted: usize,
    /// Entries that belong to no configured side
    pub ignored: usize,
    /// Entries rejected because of a bad path, digest or URL
    pub invalid: usize,
    /// Submission stopped early because of cancellation
    pub cancelled: bool,
}

/// Resolve the requested modpack version and bring the configured
/// installations in line with it.
///
/// Per-file failures are logged by the workers and do not fail the run.
/// Only manifest retrieval and pipeline setup errors are returned.
pub fn sync_modpack(
    config: &SyncConfig,
    client: &dyn ModpackClient,
    fetcher: Arc<dyn Fetcher>,
    cancel: &CancelToken,
) -> Result<SyncReport> {
    let modpack = client.modpack_manifest(config.modpack_id)?;
    info!(
        modpack_id = modpack.id,
        name = %modpack.name,
        synopsis = %modpack.synopsis,
        versions = modpack.versions.len(),
        "Got modpack manifest"
    );

    let version_id = match config.version_id {
        Some(id) if id != 0 => id,
        _ => modpack
            .latest_version()
            .map(|v| v.id)
            .ok_or(SyncError::Manifest(ManifestError::NoVersions {
                modpack_id: config.modpack_id,
            }))?,
    };

    let version = client.version_manifest(config.modpack_id, version_id)?;
    let targets: Vec<String> = version
        .targets
        .iter()
        .map(|t| format!("{} {}", t.name, t.version))
        .collect();
    info!(
        modpack_id = version.parent,
        version_id = version.id,
        name = %version.name,
        kind = %version.kind,
        updated = ?version.updated_at(),
        file_count = version.files.len(),
        targets = ?targets,
        "Got modpack version manifest"
    );

    let mut report = SyncReport {
        modpack_id: config.modpack_id,
        version_id,
        files: version.files.len(),
        ..Default::default()
    };

    if !config.has_targets() {
        info!("No client or server path given, nothing to download");
        return Ok(report);
    }

    let opts = PlanOptions::from_config(config);
    let pipeline = Pipeline::start(
        config.precheck_concurrency,
        config.download_concurrency,
        fetcher,
        cancel.clone(),
    )?;
    info!(
        precheck_workers = pipeline.precheck_workers(),
        download_workers = pipeline.download_workers(),
        "Started pipeline"
    );

    let mut failure = None;
    for file in &version.files {
        if cancel.is_cancelled() {
            info!("Cancelled, not submitting remaining files");
            report.cancelled = true;
            break;
        }

        match precheck_job(file, &opts) {
            Ok(Some(job)) => match pipeline.submit(job) {
                Ok(()) => report.submitted += 1,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            },
            Ok(None) => report.ignored += 1,
            Err(e) => {
                warn!(
                    name = %file.name,
                    path = %file.path,
                    error = %e,
                    "Failed to create precheck job"
                );
                report.invalid += 1;
            }
        }
    }

    pipeline.wait();
    if let Some(e) = failure {
        return Err(e);
    }

    info!(
        submitted = report.submitted,
        ignored = report.ignored,
        invalid = report.invalid,
        "Sync finished"
    );
    Ok(report)
}
