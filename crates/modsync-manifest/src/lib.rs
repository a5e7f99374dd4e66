//! Modpack manifests for modsync
//!
//! Types for the modpack and modpack version documents served by the
//! modpacks.ch API, the helpers that turn a file entry into an install path,
//! a download URL and a SHA-1 digest, and a blocking HTTP client.
//!
//! # Example
//!
//! ```no_run
//! use modsync_manifest::{HttpModpackClient, ModpackApi, ModpackClient};
//!
//! let client = HttpModpackClient::new(reqwest::blocking::Client::new(), ModpackApi::Public);
//! let modpack = client.modpack_manifest(101)?;
//! if let Some(version) = modpack.latest_version() {
//!     let manifest = client.version_manifest(modpack.id, version.id)?;
//!     for file in &manifest.files {
//!         println!("{} -> {}", file.relative_path()?.display(), file.download_url()?);
//!     }
//! }
//! # Ok::<(), modsync_manifest::Error>(())
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpModpackClient, ModpackApi, ModpackClient, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use types::{
    CurseForgeRef, ModpackAuthor, ModpackManifest, ModpackVersion, ModpackVersionFile,
    ModpackVersionManifest, ModpackVersionSpecs, ModpackVersionTarget, SHA1_LEN,
};
