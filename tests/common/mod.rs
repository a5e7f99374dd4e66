//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use modsync::core::{ContentCheck, DigestAlgorithm, FetchResponse, Fetcher, PrecheckJob};
use modsync::error::{Result, SyncError};
use walkdir::WalkDir;

pub const HELLO: &[u8] = b"hello world";
pub const HELLO_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";

/// Serves fixed bodies from memory and records every requested URL
#[derive(Default)]
pub struct MemoryFetcher {
    bodies: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn serving(urls: &[&str]) -> Self {
        let mut fetcher = Self::default();
        for url in urls {
            fetcher.bodies.insert(url.to_string(), HELLO.to_vec());
        }
        fetcher
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        let mut urls = self.requested.lock().unwrap().clone();
        urls.sort();
        urls
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, url: &str, _user_agent: Option<&str>, dst: &mut File) -> Result<FetchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(url.to_string());
        let body = self.bodies.get(url).ok_or_else(|| SyncError::HttpStatus {
            url: url.to_string(),
            status: 404,
        })?;
        dst.write_all(body)?;
        Ok(FetchResponse {
            bytes: body.len() as u64,
            modified: None,
        })
    }
}

pub fn url(name: &str) -> String {
    format!("https://cdn.example/mods/{}", name)
}

pub fn hello_check() -> ContentCheck {
    ContentCheck::new(DigestAlgorithm::Sha1, hex::decode(HELLO_SHA1).unwrap(), HELLO.len() as u64)
}

/// Job for `name` under `root/client`, optionally mirrored to `root/server`
/// and migrated from `root/old`
pub fn job(root: &Path, name: &str, server: bool, migrate: bool) -> PrecheckJob {
    PrecheckJob {
        download_url: url(name),
        user_agent: None,
        destination: root.join("client").join(name),
        secondary_destination: server.then(|| root.join("server").join(name)),
        migrate_from: migrate.then(|| root.join("old").join(name)),
        preserve_migration_source: false,
        check: hello_check(),
    }
}

pub fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Every regular file under `root` with its contents, sorted by path
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut out: Vec<(PathBuf, Vec<u8>)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let contents = fs::read(e.path()).unwrap();
            (e.into_path(), contents)
        })
        .collect();
    out.sort();
    out
}
