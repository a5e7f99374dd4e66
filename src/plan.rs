/*!
 * Turning manifest file entries into precheck jobs
 */

use std::path::PathBuf;

use modsync_manifest::ModpackVersionFile;

use crate::config::SyncConfig;
use crate::core::checksum::{ContentCheck, DigestAlgorithm};
use crate::core::precheck::PrecheckJob;
use crate::error::Result;

/// Install roots and policies applied to every file of a version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanOptions {
    pub client_path: Option<PathBuf>,
    pub server_path: Option<PathBuf>,
    pub migrate_from_path: Option<PathBuf>,
    pub preserve_migration_source: bool,
    /// CurseForge projects never installed on the server side
    pub server_ignore_curseforge_projects: Vec<i64>,
    pub user_agent: Option<String>,
}

impl PlanOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            client_path: config.client_path.clone(),
            server_path: config.server_path.clone(),
            migrate_from_path: config.migrate_from_path.clone(),
            preserve_migration_source: config.preserve_migration_source,
            server_ignore_curseforge_projects: config.server_ignore_curseforge_projects.clone(),
            user_agent: None,
        }
    }

    fn server_ignores(&self, file: &ModpackVersionFile) -> bool {
        file.curseforge_project()
            .is_some_and(|p| self.server_ignore_curseforge_projects.contains(&p))
    }
}

/// Build the precheck job for one file.
///
/// Returns `Ok(None)` when the file belongs to no configured side. When only
/// the server side applies, the server path becomes the primary destination.
pub fn precheck_job(file: &ModpackVersionFile, opts: &PlanOptions) -> Result<Option<PrecheckJob>> {
    let client = opts
        .client_path
        .as_ref()
        .filter(|_| file.applies_to_client());
    let server = opts
        .server_path
        .as_ref()
        .filter(|_| file.applies_to_server() && !opts.server_ignores(file));

    let (primary, secondary) = match (client, server) {
        (Some(client), server) => (client, server),
        (None, Some(server)) => (server, None),
        (None, None) => return Ok(None),
    };

    let relative = file.relative_path()?;
    let digest = file.sha1_digest()?;
    let download_url = file.download_url()?;

    Ok(Some(PrecheckJob {
        download_url,
        user_agent: opts.user_agent.clone(),
        destination: primary.join(&relative),
        secondary_destination: secondary.map(|root| root.join(&relative)),
        migrate_from: opts.migrate_from_path.as_ref().map(|root| root.join(&relative)),
        preserve_migration_source: opts.preserve_migration_source,
        check: ContentCheck::new(DigestAlgorithm::Sha1, digest, file.size),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use modsync_manifest::CurseForgeRef;
    use std::path::Path;

    fn entry() -> ModpackVersionFile {
        ModpackVersionFile {
            path: "./mods/".to_string(),
            name: "a.jar".to_string(),
            url: "https://cdn.example/a.jar".to_string(),
            sha1: "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed".to_string(),
            size: 11,
            curseforge: Some(CurseForgeRef {
                project: 4242,
                file: 1,
            }),
            ..Default::default()
        }
    }

    fn both_sides() -> PlanOptions {
        PlanOptions {
            client_path: Some(PathBuf::from("/pack/client")),
            server_path: Some(PathBuf::from("/pack/server")),
            ..Default::default()
        }
    }

    #[test]
    fn test_both_sides() {
        let job = precheck_job(&entry(), &both_sides()).unwrap().unwrap();

        assert_eq!(job.destination, Path::new("/pack/client/mods/a.jar"));
        assert_eq!(
            job.secondary_destination.as_deref(),
            Some(Path::new("/pack/server/mods/a.jar"))
        );
        assert_eq!(job.migrate_from, None);
        assert_eq!(job.download_url, "https://cdn.example/a.jar");
        assert_eq!(job.check.size, 11);
        assert_eq!(job.check.algorithm, DigestAlgorithm::Sha1);
        assert_eq!(hex::encode(&job.check.digest), entry().sha1);
    }

    #[test]
    fn test_migration_source_joined() {
        let mut opts = both_sides();
        opts.migrate_from_path = Some(PathBuf::from("/old"));
        opts.preserve_migration_source = true;

        let job = precheck_job(&entry(), &opts).unwrap().unwrap();

        assert_eq!(job.migrate_from.as_deref(), Some(Path::new("/old/mods/a.jar")));
        assert!(job.preserve_migration_source);
    }

    #[test]
    fn test_clientonly_skips_server() {
        let mut file = entry();
        file.clientonly = true;

        let job = precheck_job(&file, &both_sides()).unwrap().unwrap();

        assert_eq!(job.destination, Path::new("/pack/client/mods/a.jar"));
        assert!(job.secondary_destination.is_none());
    }

    #[test]
    fn test_serveronly_promotes_server() {
        let mut file = entry();
        file.serveronly = true;

        let job = precheck_job(&file, &both_sides()).unwrap().unwrap();

        assert_eq!(job.destination, Path::new("/pack/server/mods/a.jar"));
        assert!(job.secondary_destination.is_none());
    }

    #[test]
    fn test_ignored_project_on_server() {
        let mut opts = both_sides();
        opts.server_ignore_curseforge_projects = vec![4242];

        let job = precheck_job(&entry(), &opts).unwrap().unwrap();
        assert!(job.secondary_destination.is_none());

        opts.client_path = None;
        assert!(precheck_job(&entry(), &opts).unwrap().is_none());
    }

    #[test]
    fn test_no_applicable_side() {
        let mut file = entry();
        file.serveronly = true;
        let opts = PlanOptions {
            client_path: Some(PathBuf::from("/pack/client")),
            ..Default::default()
        };
        assert!(precheck_job(&file, &opts).unwrap().is_none());
        assert!(precheck_job(&entry(), &PlanOptions::default()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_entries() {
        let mut escaping = entry();
        escaping.path = "../../".to_string();
        assert!(matches!(
            precheck_job(&escaping, &both_sides()),
            Err(SyncError::Manifest(_))
        ));

        let mut bad_digest = entry();
        bad_digest.sha1 = "abc".to_string();
        assert!(precheck_job(&bad_digest, &both_sides()).is_err());

        let mut no_url = entry();
        no_url.url.clear();
        no_url.curseforge = None;
        assert!(precheck_job(&no_url, &both_sides()).is_err());
    }

    #[test]
    fn test_options_from_config() {
        let config = SyncConfig {
            modpack_id: 1,
            client_path: Some(PathBuf::from("c")),
            migrate_from_path: Some(PathBuf::from("m")),
            server_ignore_curseforge_projects: vec![7],
            ..Default::default()
        };
        let opts = PlanOptions::from_config(&config);
        assert_eq!(opts.client_path, Some(PathBuf::from("c")));
        assert_eq!(opts.server_path, None);
        assert_eq!(opts.migrate_from_path, Some(PathBuf::from("m")));
        assert_eq!(opts.server_ignore_curseforge_projects, vec![7]);
    }
}
