/*!
 * Fixed pools of worker threads draining a channel
 *
 * Each fleet consumes an input receiver and, for the precheck fleet, owns the
 * sender of the next stage. Workers stop once the input channel is closed and
 * drained; `wait` joins them and only then drops the output sender, so the
 * next stage sees its input close exactly once, after the last item.
 */

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, warn};

use super::concurrency::CancelToken;
use super::download::{DownloadJob, Fetcher};
use super::precheck::PrecheckJob;
use crate::error::{Result, SyncError};

/// Spawn `count` named workers calling `handler` for every received item.
///
/// Items received after cancellation are dropped unprocessed. They are still
/// taken off the channel so a producer blocked on a rendezvous send is
/// released.
fn spawn_workers<T, F>(
    role: &'static str,
    count: usize,
    jobs: Receiver<T>,
    cancel: CancelToken,
    handler: F,
) -> Result<Vec<JoinHandle<()>>>
where
    T: Send + 'static,
    F: Fn(T) + Clone + Send + 'static,
{
    let count = count.max(1);
    let mut handles = Vec::with_capacity(count);

    for i in 0..count {
        let jobs = jobs.clone();
        let cancel = cancel.clone();
        let handler = handler.clone();

        let handle = thread::Builder::new()
            .name(format!("{}-{}", role, i))
            .spawn(move || {
                for job in jobs.iter() {
                    if cancel.is_cancelled() {
                        continue;
                    }
                    handler(job);
                }
            })
            .map_err(SyncError::Spawn)?;
        handles.push(handle);
    }

    Ok(handles)
}

fn join_all(role: &str, workers: Vec<JoinHandle<()>>) {
    for worker in workers {
        if worker.join().is_err() {
            error!(role, "Worker thread panicked");
        }
    }
}

/// Workers running [`PrecheckJob`]s and forwarding download jobs
pub struct PrecheckFleet {
    workers: Vec<JoinHandle<()>>,
    downloads: Option<Sender<DownloadJob>>,
}

impl PrecheckFleet {
    /// Start `workers` precheck threads reading from `jobs`.
    ///
    /// Close `jobs` (drop every sender) once all jobs are submitted, then call
    /// [`PrecheckFleet::wait`], which closes `downloads`.
    pub fn spawn(
        workers: usize,
        jobs: Receiver<PrecheckJob>,
        downloads: Sender<DownloadJob>,
        cancel: CancelToken,
    ) -> Result<Self> {
        let worker_downloads = downloads.clone();
        let workers = spawn_workers("precheck", workers, jobs, cancel, move |job: PrecheckJob| {
            let outcome = job.run(&worker_downloads);
            debug!(path = %job.destination.display(), ?outcome, "Precheck finished");
        })?;

        Ok(Self {
            workers,
            downloads: Some(downloads),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait for every worker to exit, then close the download channel
    pub fn wait(mut self) {
        join_all("precheck", std::mem::take(&mut self.workers));
        self.downloads.take();
    }
}

/// Workers fetching [`DownloadJob`]s
pub struct DownloadFleet {
    workers: Vec<JoinHandle<()>>,
}

impl DownloadFleet {
    pub fn spawn(
        workers: usize,
        jobs: Receiver<DownloadJob>,
        fetcher: Arc<dyn Fetcher>,
        cancel: CancelToken,
    ) -> Result<Self> {
        let workers = spawn_workers("download", workers, jobs, cancel, move |job: DownloadJob| {
            let url = job.url.clone();
            let path = job.target.path.clone();
            match job.run(fetcher.as_ref()) {
                Ok(_) => {}
                Err(e) if e.is_network_error() => warn!(
                    url = %url,
                    path = %path.display(),
                    error = %e,
                    "Failed to download file"
                ),
                Err(e) => error!(
                    url = %url,
                    path = %path.display(),
                    error = %e,
                    "Failed to write downloaded file"
                ),
            }
        })?;

        Ok(Self { workers })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait for every worker to exit. Returns once the download channel has
    /// been closed by the precheck stage and drained.
    pub fn wait(self) {
        join_all("download", self.workers);
    }
}
