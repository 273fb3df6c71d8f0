// # zonesyncd - run-once DNS record-set reconciler
//
// CRITICAL RULES:
// - This is a THIN integration layer ONLY
// - DO NOT add reconcile logic, DNS logic, or retry logic here
// - All reconcile logic MUST be in zonesync-core
//
// The zonesyncd binary is responsible for:
// 1. Reading daemon settings from environment variables
// 2. Initializing logging (stdout, optional rolling file)
// 3. Loading the YAML configuration document
// 4. Registering providers and address sources
// 5. Running one reconcile pass and writing the audit log
//
// ## Configuration
//
// - `ZONESYNC_CONFIG`: Path to the YAML document (default `config.yaml`)
// - `ZONESYNC_LOG_LEVEL`: Log filter (default `info`)
// - `ZONESYNC_LOG_DIR`: Directory for a daily rolling log file (optional)
// - `ZONESYNC_MODE`: `dry-run` to inspect without mutating
// - `ZONESYNC_ACCESS_KEY` / `ZONESYNC_SECRET_KEY`: Override the document's credentials
//
// ## Example
//
// ```bash
// export ZONESYNC_CONFIG=/etc/zonesync/config.yaml
// export ZONESYNC_SECRET_KEY=your_secret
// export ZONESYNC_LOG_DIR=/var/log/zonesync
//
// zonesyncd
// ```
//
// ## Exit Codes
//
// Per-domain failures are logged and do not change the exit code.

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use zonesync_core::{EngineEvent, PluginRegistry, SyncConfig, SyncEngine};

/// Rolling log files kept on disk
const LOG_FILES_RETAINED: usize = 7;

/// Exit codes for different termination scenarios
///
/// - 0: Pass completed (including per-domain failures)
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ZonesyncExitCode {
    /// Pass completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Settings read from the environment
struct DaemonConfig {
    config_path: String,
    log_level: String,
    log_dir: Option<String>,
    dry_run: bool,
    access_key: Option<String>,
    secret_key: Option<String>,
}

impl DaemonConfig {
    /// Load settings from environment variables
    fn from_env() -> Self {
        Self {
            config_path: env::var("ZONESYNC_CONFIG").unwrap_or_else(|_| "config.yaml".to_string()),
            log_level: env::var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: env::var("ZONESYNC_LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            dry_run: env::var("ZONESYNC_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run"),
            access_key: env::var("ZONESYNC_ACCESS_KEY").ok().filter(|k| !k.is_empty()),
            secret_key: env::var("ZONESYNC_SECRET_KEY").ok().filter(|k| !k.is_empty()),
        }
    }

    /// Apply environment overrides to the loaded document
    fn apply_overrides(&self, config: &mut SyncConfig) {
        if let Some(key) = &self.access_key {
            config.provider.credentials.key = key.clone();
        }
        if let Some(secret) = &self.secret_key {
            config.provider.credentials.secret = secret.clone();
        }
        if self.dry_run {
            config.engine.dry_run = true;
        }
    }
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(daemon: &DaemonConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&daemon.log_level)
        .with_context(|| format!("ZONESYNC_LOG_LEVEL '{}' is not valid", daemon.log_level))?;

    let (file_layer, guard) = match &daemon.log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("zonesync")
                .filename_suffix("log")
                .max_log_files(LOG_FILES_RETAINED)
                .build(dir)
                .with_context(|| format!("Failed to open log directory {}", dir))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(guard)
}

fn main() -> ExitCode {
    let daemon = DaemonConfig::from_env();

    let _guard = match init_tracing(&daemon) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    info!("Starting zonesyncd");

    let config = match load_config(&daemon) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(config)).into()
}

/// Load, override and validate the configuration document
fn load_config(daemon: &DaemonConfig) -> Result<SyncConfig> {
    let mut config = SyncConfig::from_file(&daemon.config_path)?;
    daemon.apply_overrides(&mut config);
    config.validate()?;

    info!(
        "Configuration loaded: {} domain(s), provider {}, region {}",
        config.domains.len(),
        config.provider.type_name(),
        config.provider.region
    );
    Ok(config)
}

/// Build the engine and run one pass
async fn run(config: SyncConfig) -> ZonesyncExitCode {
    let registry = PluginRegistry::new();

    #[cfg(feature = "huaweicloud")]
    {
        info!("Registering Huawei Cloud provider");
        zonesync_provider_huaweicloud::register(&registry);
    }

    #[cfg(feature = "csv")]
    {
        info!("Registering CSV address source");
        zonesync_source_csv::register(&registry);
    }

    let (engine, event_rx) = match build_engine(&registry, config) {
        Ok(built) => built,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return ZonesyncExitCode::ConfigError;
        }
    };

    let audit = tokio::spawn(drain_audit_events(event_rx));

    let report = engine.run_once().await;
    // Closes the event channel so the audit task finishes
    drop(engine);

    if let Err(e) = audit.await {
        error!("Audit log task failed: {}", e);
        return ZonesyncExitCode::RuntimeError;
    }

    if report.failed() > 0 {
        warn!("{} domain(s) failed, see log for details", report.failed());
    }
    if report.incomplete() > 0 {
        warn!(
            "{} domain(s) still have duplicate record sets after deletion failures",
            report.incomplete()
        );
    }
    info!(
        "zonesyncd finished: {} done, {} skipped, {} failed",
        report.done(),
        report.skipped(),
        report.failed()
    );

    ZonesyncExitCode::Completed
}

fn build_engine(
    registry: &PluginRegistry,
    config: SyncConfig,
) -> Result<(SyncEngine, mpsc::Receiver<EngineEvent>)> {
    let provider = registry
        .create_provider(&config.provider)
        .context("Failed to create DNS provider")?;
    let address_source = registry
        .create_address_source(&config.address_source)
        .context("Failed to create address source")?;

    Ok(SyncEngine::new(provider, address_source, config)?)
}

/// Write every engine event as one JSON line under the `audit` target
async fn drain_audit_events(mut event_rx: mpsc::Receiver<EngineEvent>) {
    while let Some(event) = event_rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(line) => info!(target: "audit", "{}", line),
            Err(e) => warn!("Failed to serialize audit event {:?}: {}", event, e),
        }
    }
}
