/*!
 * Precheck → download pipeline
 */

use std::sync::Arc;

use crossbeam_channel::{bounded, Sender};

use super::concurrency::{resolve_workers, CancelToken};
use super::download::Fetcher;
use super::fleet::{DownloadFleet, PrecheckFleet};
use super::precheck::PrecheckJob;
use crate::error::{Result, SyncError};

/// Both worker fleets, connected by a rendezvous channel.
///
/// A precheck worker that produces a download job blocks until a download
/// worker takes it, so prechecks never run far ahead of the network and
/// never pile up open file handles.
pub struct Pipeline {
    jobs: Option<Sender<PrecheckJob>>,
    precheck: PrecheckFleet,
    download: DownloadFleet,
}

impl Pipeline {
    /// Start the pipeline.
    ///
    /// `precheck_workers` of 0 uses one worker per CPU core.
    pub fn start(
        precheck_workers: usize,
        download_workers: usize,
        fetcher: Arc<dyn Fetcher>,
        cancel: CancelToken,
    ) -> Result<Self> {
        let (job_tx, job_rx) = bounded(0);
        let (download_tx, download_rx) = bounded(0);

        let download =
            DownloadFleet::spawn(download_workers, download_rx, fetcher, cancel.clone())?;
        let precheck = PrecheckFleet::spawn(
            resolve_workers(precheck_workers),
            job_rx,
            download_tx,
            cancel,
        )?;

        Ok(Self {
            jobs: Some(job_tx),
            precheck,
            download,
        })
    }

    /// Hand a job to the next free precheck worker, blocking until one takes it
    pub fn submit(&self, job: PrecheckJob) -> Result<()> {
        self.jobs
            .as_ref()
            .ok_or(SyncError::ChannelClosed("precheck jobs"))?
            .send(job)
            .map_err(|_| SyncError::ChannelClosed("precheck jobs"))
    }

    pub fn precheck_workers(&self) -> usize {
        self.precheck.worker_count()
    }

    pub fn download_workers(&self) -> usize {
        self.download.worker_count()
    }

    /// Close submission and block until every file has been prechecked and,
    /// where needed, downloaded.
    pub fn wait(mut self) {
        self.jobs.take();
        self.precheck.wait();
        self.download.wait();
    }
}
