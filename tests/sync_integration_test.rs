/*!
 * End-to-end sync runs against an in-memory modpack API
 */

mod common;

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use common::{snapshot, url, write, MemoryFetcher, HELLO, HELLO_SHA1};
use modsync::{sync_modpack, CancelToken, SyncConfig};
use modsync_manifest::{
    CurseForgeRef, ModpackClient, ModpackManifest, ModpackVersion, ModpackVersionFile,
    ModpackVersionManifest,
};

struct StaticClient {
    version: ModpackVersionManifest,
}

impl ModpackClient for StaticClient {
    fn modpack_manifest(&self, modpack_id: i64) -> modsync_manifest::Result<ModpackManifest> {
        Ok(ModpackManifest {
            id: modpack_id,
            name: "Test Pack".to_string(),
            versions: vec![ModpackVersion {
                id: self.version.id,
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    fn version_manifest(
        &self,
        _modpack_id: i64,
        _version_id: i64,
    ) -> modsync_manifest::Result<ModpackVersionManifest> {
        Ok(self.version.clone())
    }
}

fn mod_file(name: &str) -> ModpackVersionFile {
    ModpackVersionFile {
        path: "./mods/".to_string(),
        name: name.to_string(),
        url: url(name),
        sha1: HELLO_SHA1.to_string(),
        size: HELLO.len() as u64,
        ..Default::default()
    }
}

fn pack() -> StaticClient {
    let mut client_side = mod_file("shaders.jar");
    client_side.clientonly = true;
    let mut ignored_on_server = mod_file("dashboard.jar");
    ignored_on_server.curseforge = Some(CurseForgeRef {
        project: 555,
        file: 1,
    });
    let mut config = mod_file("server.properties");
    config.path = "./".to_string();
    config.serveronly = true;

    StaticClient {
        version: ModpackVersionManifest {
            id: 42,
            parent: 7,
            files: vec![
                mod_file("core.jar"),
                mod_file("carried-over.jar"),
                client_side,
                ignored_on_server,
                config,
            ],
            ..Default::default()
        },
    }
}

fn fetcher() -> Arc<MemoryFetcher> {
    Arc::new(MemoryFetcher::serving(&[
        &url("core.jar"),
        &url("carried-over.jar"),
        &url("shaders.jar"),
        &url("dashboard.jar"),
        &url("server.properties"),
    ]))
}

#[test]
fn test_sync_from_config_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(&root.join("old/mods/carried-over.jar"), HELLO);

    let config_path = root.join("modsync.toml");
    fs::write(
        &config_path,
        format!(
            "modpack_id = 7\n\
             client_path = {:?}\n\
             server_path = {:?}\n\
             migrate_from_path = {:?}\n\
             download_concurrency = 3\n\
             precheck_concurrency = 2\n\
             server_ignore_curseforge_projects = [555]\n",
            root.join("client"),
            root.join("server"),
            root.join("old"),
        ),
    )
    .unwrap();
    let config = SyncConfig::from_file(&config_path).unwrap();
    config.validate().unwrap();

    let fetcher = fetcher();
    let report = sync_modpack(&config, &pack(), fetcher.clone(), &CancelToken::new()).unwrap();

    assert_eq!(report.version_id, 42);
    assert_eq!(report.submitted, 5);
    assert_eq!(report.invalid, 0);
    assert_eq!(
        fetcher.requested(),
        vec![
            url("core.jar"),
            url("dashboard.jar"),
            url("server.properties"),
            url("shaders.jar"),
        ]
    );

    let client = root.join("client");
    let server = root.join("server");
    for name in ["core.jar", "carried-over.jar", "shaders.jar", "dashboard.jar"] {
        assert_eq!(fs::read(client.join("mods").join(name)).unwrap(), HELLO);
    }
    for name in ["core.jar", "carried-over.jar"] {
        assert_eq!(fs::read(server.join("mods").join(name)).unwrap(), HELLO);
    }
    assert_eq!(fs::read(server.join("server.properties")).unwrap(), HELLO);
    assert!(!server.join("mods/shaders.jar").exists());
    assert!(!server.join("mods/dashboard.jar").exists());
    assert!(!client.join("server.properties").exists());
    assert!(!root.join("old/mods/carried-over.jar").exists());
}

#[test]
fn test_repeated_sync_is_stable() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config = SyncConfig {
        modpack_id: 7,
        client_path: Some(root.join("client")),
        server_path: Some(root.join("server")),
        download_concurrency: 2,
        ..Default::default()
    };

    let first = fetcher();
    sync_modpack(&config, &pack(), first.clone(), &CancelToken::new()).unwrap();
    assert_eq!(first.calls(), 5);
    let before = snapshot(root);

    let second = fetcher();
    let report = sync_modpack(&config, &pack(), second.clone(), &CancelToken::new()).unwrap();

    assert_eq!(report.submitted, 5);
    assert_eq!(second.calls(), 0);
    assert_eq!(snapshot(root), before);
}

#[test]
fn test_corrupted_file_is_repaired() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config = SyncConfig {
        modpack_id: 7,
        client_path: Some(root.join("client")),
        ..Default::default()
    };
    sync_modpack(&config, &pack(), fetcher(), &CancelToken::new()).unwrap();

    write(&root.join("client/mods/core.jar"), b"hello wor");
    let repair = fetcher();
    sync_modpack(&config, &pack(), repair.clone(), &CancelToken::new()).unwrap();

    assert_eq!(repair.requested(), vec![url("core.jar")]);
    assert_eq!(fs::read(root.join("client/mods/core.jar")).unwrap(), HELLO);
}
