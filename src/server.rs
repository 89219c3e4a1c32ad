//! Process bootstrap: logging, storage, scheduler, recovery and the HTTP
//! server, torn down in reverse on shutdown.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hookcron_api::{ApiServer, AppState, ListenConfig};
use hookcron_config::{Config, LoggingConfig, StorageConfig};
use hookcron_core::{DispatchConfig, HttpActionFactory, JobReconciler, MemoryJobStore};
use hookcron_protocols::{JobStore, StoreError};
use hookcron_scheduler::SchedulerBridge;
use hookcron_store_sqlite::SqliteJobStore;

use crate::signal::SignalHandler;

type BoxError = Box<dyn std::error::Error>;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize tracing with console and optional daily-rolling file output.
///
/// `RUST_LOG` takes precedence over `logging.level`.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), BoxError> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    let (text_layer, json_layer) = if logging.json {
        (None, Some(fmt::layer().json().with_target(true)))
    } else {
        (Some(fmt::layer().with_target(true).with_ansi(true)), None)
    };

    let file_layer = match &logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("hookcron")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = LOG_GUARD.set(guard);
            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Open the configured job store.
pub(crate) async fn open_store(storage: &StorageConfig) -> Result<Arc<dyn JobStore>, StoreError> {
    match storage.backend.as_str() {
        "memory" => {
            warn!("Using in-memory job storage, jobs will not survive a restart");
            Ok(Arc::new(MemoryJobStore::new()))
        }
        _ => {
            info!(path = %storage.path.display(), "Opening SQLite job store");
            Ok(Arc::new(SqliteJobStore::open(&storage.path).await?))
        }
    }
}

pub(crate) fn dispatch_config(config: &Config) -> DispatchConfig {
    let mut dispatch = DispatchConfig {
        timeout: Duration::from_secs(config.dispatch.timeout_seconds),
        ..DispatchConfig::default()
    };
    if let Some(user_agent) = &config.dispatch.user_agent {
        dispatch.user_agent = user_agent.clone();
    }
    dispatch
}

/// Run until a shutdown signal arrives.
pub(crate) async fn run_server(config: Config) -> Result<(), BoxError> {
    info!("Starting hookcron v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config.storage).await?;

    let bridge = SchedulerBridge::new();
    bridge.start();

    let actions = Arc::new(HttpActionFactory::new(&dispatch_config(&config), store.clone())?);
    let reconciler = JobReconciler::new(store, bridge.clone(), actions);

    if let Err(e) = reconciler.recover().await {
        error!(error = %e, "Startup recovery failed");
        bridge.stop().await;
        return Err(e.into());
    }

    let signals = SignalHandler::new();
    signals.setup_os_signals()?;

    let listen = ListenConfig::new(config.server.host.clone(), config.server.port);
    let server = ApiServer::new(listen, Arc::new(AppState::new(reconciler)));
    let served = server.run(signals.shutdown_requested()).await;
    if let Err(e) = &served {
        error!(error = %e, "API server failed");
    } else if !signals.is_shutdown_requested() {
        warn!("API server exited without a shutdown request");
    }

    drain(&bridge, config.shutdown.drain_timeout_seconds).await;
    info!("hookcron stopped");

    served.map_err(Into::into)
}

/// Stop the bridge, bounding the wait for in-flight firings when configured.
async fn drain(bridge: &SchedulerBridge, timeout_seconds: Option<u64>) {
    info!(in_flight_limit = ?timeout_seconds, "Draining scheduler");
    match timeout_seconds {
        Some(secs) => {
            if tokio::time::timeout(Duration::from_secs(secs), bridge.stop())
                .await
                .is_err()
            {
                warn!(timeout_seconds = secs, "Drain timed out, abandoning in-flight firings");
            }
        }
        None => bridge.stop().await,
    }
}
