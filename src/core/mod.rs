/*!
 * Core sync machinery: verification, migration and the worker pipeline
 */

pub mod checksum;
pub mod concurrency;
pub mod download;
pub mod fleet;
pub mod materialize;
pub mod metadata;
pub mod migrate;
pub mod pipeline;
pub mod precheck;

pub use checksum::{ContentCheck, DigestAlgorithm};
pub use concurrency::CancelToken;
pub use download::{DownloadJob, FetchResponse, Fetcher, TargetFile};
pub use migrate::MigrationOutcome;
pub use pipeline::Pipeline;
pub use precheck::{PrecheckJob, PrecheckOutcome};
