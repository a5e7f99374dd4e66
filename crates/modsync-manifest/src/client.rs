//! Blocking client for the modpacks.ch API

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::types::{ModpackManifest, ModpackVersionManifest};

/// Public API root
pub const DEFAULT_BASE_URL: &str = "https://api.modpacks.ch/public";

/// Source of modpack manifests
pub trait ModpackClient: Send + Sync {
    fn modpack_manifest(&self, modpack_id: i64) -> Result<ModpackManifest>;

    fn version_manifest(&self, modpack_id: i64, version_id: i64) -> Result<ModpackVersionManifest>;
}

/// Which id namespace a modpack id lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModpackApi {
    /// modpacks.ch public modpack ids
    #[default]
    Public,
    /// CurseForge project ids
    CurseForge,
}

impl ModpackApi {
    fn segment(self) -> &'static str {
        match self {
            ModpackApi::Public => "modpack",
            ModpackApi::CurseForge => "curseforge",
        }
    }
}

/// [`ModpackClient`] over HTTP
///
/// The `reqwest` client is injected so callers share one connection pool
/// (and one User-Agent) with file downloads.
#[derive(Debug, Clone)]
pub struct HttpModpackClient {
    http: Client,
    base_url: String,
    api: ModpackApi,
}

impl HttpModpackClient {
    pub fn new(http: Client, api: ModpackApi) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api,
        }
    }

    /// Point the client at another API root (trailing slashes are ignored)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn modpack_url(&self, modpack_id: i64) -> String {
        format!("{}/{}/{}", self.base_url, self.api.segment(), modpack_id)
    }

    pub fn version_url(&self, modpack_id: i64, version_id: i64) -> String {
        format!("{}/{}", self.modpack_url(modpack_id), version_id)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl ModpackClient for HttpModpackClient {
    fn modpack_manifest(&self, modpack_id: i64) -> Result<ModpackManifest> {
        self.get_json(&self.modpack_url(modpack_id))
    }

    fn version_manifest(&self, modpack_id: i64, version_id: i64) -> Result<ModpackVersionManifest> {
        self.get_json(&self.version_url(modpack_id, version_id))
    }
}
