//! Modpack and modpack version manifests
//!
//! Shapes follow the JSON returned by the modpacks.ch API. Missing fields
//! deserialize to their defaults and unknown fields are ignored.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length of a SHA-1 digest in bytes
pub const SHA1_LEN: usize = 20;

/// Response of `GET /{api}/{modpack_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModpackManifest {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub updated: i64,
    pub synopsis: String,
    pub description: String,
    pub authors: Vec<ModpackAuthor>,
    /// Newest first
    pub versions: Vec<ModpackVersion>,
    pub installs: i64,
    pub plays: i64,
    pub featured: bool,
    pub status: String,
    pub provider: String,
    pub private: bool,
}

impl ModpackManifest {
    /// The newest published version, if any
    pub fn latest_version(&self) -> Option<&ModpackVersion> {
        self.versions.first()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModpackAuthor {
    pub id: i64,
    pub name: String,
    pub website: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModpackVersion {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub updated: i64,
    pub specs: ModpackVersionSpecs,
    pub targets: Vec<ModpackVersionTarget>,
    pub private: bool,
}

/// Memory recommendations, in MiB
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModpackVersionSpecs {
    pub id: i64,
    pub minimum: i64,
    pub recommended: i64,
}

/// Game, loader or runtime a version is built for
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModpackVersionTarget {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub updated: i64,
}

/// Response of `GET /{api}/{modpack_id}/{version_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModpackVersionManifest {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub updated: i64,
    /// Modpack this version belongs to
    pub parent: i64,
    pub files: Vec<ModpackVersionFile>,
    pub specs: ModpackVersionSpecs,
    pub targets: Vec<ModpackVersionTarget>,
    pub changelog: String,
    pub status: String,
    pub private: bool,
}

impl ModpackVersionManifest {
    /// Last update time, when the timestamp is in range
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.updated, 0)
    }
}

/// CurseForge origin of a file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CurseForgeRef {
    pub project: i64,
    pub file: i64,
}

/// One entry of a version's file list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModpackVersionFile {
    pub id: i64,
    pub version: String,
    /// Directory relative to the install root, usually with a leading `./`
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub mirrors: Vec<String>,
    /// Hex-encoded SHA-1 of the content
    pub sha1: String,
    pub size: u64,
    pub clientonly: bool,
    pub serveronly: bool,
    pub optional: bool,
    pub updated: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curseforge: Option<CurseForgeRef>,
}

impl ModpackVersionFile {
    /// Location of the file below an install root.
    ///
    /// `.` components are dropped. Absolute paths, drive prefixes and `..`
    /// are rejected so a manifest can never write outside the root.
    pub fn relative_path(&self) -> Result<PathBuf> {
        let joined = Path::new(&self.path).join(&self.name);
        let invalid = || Error::InvalidPath {
            path: joined.display().to_string(),
        };

        let mut out = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) => out.push(part),
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid())
                }
            }
        }

        if out.as_os_str().is_empty() || self.name.is_empty() {
            return Err(invalid());
        }
        Ok(out)
    }

    /// Where to fetch the content from.
    ///
    /// Falls back to the CurseForge CDN layout when the API leaves `url` empty.
    pub fn download_url(&self) -> Result<String> {
        if !self.url.is_empty() {
            return Ok(self.url.clone());
        }
        match self.curseforge {
            Some(cf) if cf.file > 0 && !self.name.is_empty() => Ok(format!(
                "https://edge.forgecdn.net/files/{}/{}/{}",
                cf.file / 1000,
                cf.file % 1000,
                self.name
            )),
            _ => Err(Error::MissingUrl {
                name: self.name.clone(),
            }),
        }
    }

    /// Decoded SHA-1 digest
    pub fn sha1_digest(&self) -> Result<Vec<u8>> {
        let invalid = || Error::InvalidDigest {
            name: self.name.clone(),
            digest: self.sha1.clone(),
        };
        let digest = hex::decode(self.sha1.trim()).map_err(|_| invalid())?;
        if digest.len() != SHA1_LEN {
            return Err(invalid());
        }
        Ok(digest)
    }

    pub fn applies_to_client(&self) -> bool {
        !self.serveronly
    }

    pub fn applies_to_server(&self) -> bool {
        !self.clientonly
    }

    /// CurseForge project id, if the file came from CurseForge
    pub fn curseforge_project(&self) -> Option<i64> {
        self.curseforge.map(|cf| cf.project)
    }
}
