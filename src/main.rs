/*!
 * modsync CLI
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use modsync::{
    config::{LogLevel, SyncConfig},
    error::{EXIT_FATAL, EXIT_SUCCESS},
    logging,
    protocol::{build_client, HttpFetcher},
    sync_modpack, CancelToken,
};
use modsync_manifest::{HttpModpackClient, ModpackApi};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "modsync")]
#[command(
    version,
    about = "Download, verify and migrate modpack client and server files",
    long_about = None
)]
struct Cli {
    /// ID of the modpack to download
    #[arg(long, value_name = "ID")]
    modpack_id: Option<i64>,

    /// Download this version instead of the latest one
    #[arg(long, value_name = "ID")]
    version_id: Option<i64>,

    /// Install the client side into this directory
    #[arg(long, value_name = "DIR")]
    client_path: Option<PathBuf>,

    /// Install the server side into this directory
    #[arg(long, value_name = "DIR")]
    server_path: Option<PathBuf>,

    /// Reuse files from a previous installation at this directory
    #[arg(long, value_name = "DIR")]
    migrate_from_path: Option<PathBuf>,

    /// Migrate by copying instead of moving files
    #[arg(long)]
    preserve_migration_source: bool,

    /// The modpack ID is a CurseForge project ID
    #[arg(long)]
    curseforge: bool,

    /// Number of concurrent downloads
    #[arg(long, value_name = "N")]
    download_concurrency: Option<usize>,

    /// Number of precheck workers (0 = number of CPU cores)
    #[arg(long, value_name = "N")]
    precheck_concurrency: Option<usize>,

    /// Comma-separated CurseForge project IDs left out of the server
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    server_ignore_curseforge_projects: Vec<i64>,

    /// User-Agent for API and download requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Manifest API base URL
    #[arg(long, value_name = "URL")]
    api_base_url: Option<String>,

    /// Log level
    #[arg(long, value_enum)]
    log_level: Option<LogLevelArg>,

    /// Write JSON logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Load settings from a TOML file; command-line values take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

impl Cli {
    /// Overlay command-line values on a base configuration
    fn apply(self, mut config: SyncConfig) -> SyncConfig {
        if let Some(id) = self.modpack_id {
            config.modpack_id = id;
        }
        if self.version_id.is_some() {
            config.version_id = self.version_id;
        }
        if self.client_path.is_some() {
            config.client_path = self.client_path;
        }
        if self.server_path.is_some() {
            config.server_path = self.server_path;
        }
        if self.migrate_from_path.is_some() {
            config.migrate_from_path = self.migrate_from_path;
        }
        config.preserve_migration_source |= self.preserve_migration_source;
        config.curseforge |= self.curseforge;
        if let Some(n) = self.download_concurrency {
            config.download_concurrency = n;
        }
        if let Some(n) = self.precheck_concurrency {
            config.precheck_concurrency = n;
        }
        if !self.server_ignore_curseforge_projects.is_empty() {
            config.server_ignore_curseforge_projects = self.server_ignore_curseforge_projects;
        }
        if self.user_agent.is_some() {
            config.user_agent = self.user_agent;
        }
        if self.api_base_url.is_some() {
            config.api_base_url = self.api_base_url;
        }
        if let Some(level) = self.log_level {
            config.log_level = level.into();
        }
        if self.log_file.is_some() {
            config.log_file = self.log_file;
        }
        config.verbose |= self.verbose;
        config
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    let base_config = match cli.config.take() {
        Some(path) => SyncConfig::from_file(&path)?,
        None => SyncConfig::default(),
    };
    let config = cli.apply(base_config);
    config.validate()?;

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let cancel = CancelToken::new();
    spawn_signal_listener(cancel.clone(), || std::process::exit(EXIT_FATAL))
        .context("failed to install signal handler")?;

    let http = build_client(&config.effective_user_agent())?;
    let api = if config.curseforge {
        ModpackApi::CurseForge
    } else {
        ModpackApi::Public
    };
    let mut client = HttpModpackClient::new(http.clone(), api);
    if let Some(ref base_url) = config.api_base_url {
        client = client.with_base_url(base_url.as_str());
    }
    let fetcher = Arc::new(HttpFetcher::new(http));

    let report = sync_modpack(&config, &client, fetcher, &cancel).map_err(|e| {
        if e.is_network_error() {
            error!(error = %e, "Could not reach the modpack API");
        } else {
            error!(error = %e, "Sync failed");
        }
        anyhow::Error::new(e).context(format!("failed to sync modpack {}", config.modpack_id))
    })?;

    if report.cancelled {
        warn!(submitted = report.submitted, "Sync interrupted");
    }
    Ok(())
}

/// SIGINT and SIGTERM, registered up front so no signal is missed between
/// installation and the first wait
struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl ShutdownSignals {
    /// Must be called inside a runtime context
    fn register() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }
        #[cfg(windows)]
        {
            Ok(Self {
                ctrl_c: tokio::signal::windows::ctrl_c()?,
            })
        }
        #[cfg(not(any(unix, windows)))]
        {
            Ok(Self {})
        }
    }

    async fn recv(&mut self) {
        #[cfg(unix)]
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
        }
        #[cfg(windows)]
        self.ctrl_c.recv().await;
        #[cfg(not(any(unix, windows)))]
        std::future::pending::<()>().await;
    }
}

/// Cancel `cancel` on the first SIGINT or SIGTERM, run `on_repeat` on the
/// second.
///
/// After the first signal workers finish the file in hand and drop everything
/// still queued. The second signal is the way out of a stalled transfer.
fn spawn_signal_listener<F>(cancel: CancelToken, on_repeat: F) -> anyhow::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut signals = {
        let _guard = runtime.enter();
        ShutdownSignals::register()?
    };

    let handle = thread::Builder::new()
        .name("signal".to_string())
        .spawn(move || {
            runtime.block_on(async {
                signals.recv().await;
                info!("Received exit signal, finishing files in progress");
                cancel.cancel();

                signals.recv().await;
                warn!("Received second exit signal, exiting now");
            });
            on_repeat();
        })?;

    Ok(handle)
}
