/*!
 * modsync - modpack file synchronisation
 *
 * Brings a client and/or server modpack directory up to date with a published
 * modpack version:
 * - SHA-1 verification of files already on disk
 * - Reuse of files from a previous installation (rename, or copy across devices)
 * - Reconciliation between client and server directories without network traffic
 * - A bounded two-stage precheck → download worker pipeline
 */

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod plan;
pub mod protocol;
pub mod sync;

// Re-export commonly used types
pub use config::{LogLevel, SyncConfig};
pub use core::{CancelToken, Fetcher, Pipeline, PrecheckJob};
pub use error::{Result, SyncError};
pub use protocol::HttpFetcher;
pub use sync::{sync_modpack, SyncReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
