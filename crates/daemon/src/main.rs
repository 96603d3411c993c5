//! kvmd - Main Entry Point
//! Update orchestration daemon: JSON-RPC start/status over the update subsystem

mod config;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use kvmd_api_rpc::{server::RpcServerConfig, RpcServer};
use kvmd_core::application::{StatusOracle, UpdateLauncher};
use kvmd_core::port::time_provider::SystemTimeProvider;
use kvmd_core::port::{LaunchLock, LivenessProbe, ProcessLauncher, ResultStore};
use kvmd_infra_fs::{FlockLaunchLock, FsResultStore};
use kvmd_infra_system::{ProcessTableProbe, ServiceLauncher};

use crate::config::DaemonConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() -> Result<()> {
    let log_format = std::env::var("KVMD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("kvmd=info"))?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    init_logging()?;
    info!("kvmd v{} starting...", VERSION);

    // 2. Load configuration
    let config = DaemonConfig::from_env()?;
    info!(
        log_dir = %config.log_dir.display(),
        state_dir = %config.state_dir.display(),
        update_script = %config.update_script.display(),
        update_command = %config.update_command,
        result_max_age_secs = ?config.result_max_age.map(|d| d.as_secs()),
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let mut fs_store = FsResultStore::new(&config.log_dir);
    if let Some(max_age) = config.result_max_age {
        fs_store = fs_store.with_legacy_max_age(max_age, Arc::new(SystemTimeProvider));
    }
    let store: Arc<dyn ResultStore> = Arc::new(fs_store);
    let probe: Arc<dyn LivenessProbe> = Arc::new(ProcessTableProbe::new(&config.update_script));
    let process_launcher: Arc<dyn ProcessLauncher> =
        Arc::new(ServiceLauncher::from_command_line(&config.update_command)?);
    let lock: Arc<dyn LaunchLock> = Arc::new(FlockLaunchLock::in_dir(&config.state_dir));

    let oracle = Arc::new(StatusOracle::new(probe.clone(), store.clone()));
    let launcher = Arc::new(UpdateLauncher::new(probe, store, process_launcher, lock));

    // 4. Report what survived the last restart
    match oracle.get_status().await {
        Ok(report) => info!(status = %report.status, error = ?report.error, "Current update status"),
        Err(e) => tracing::warn!(error = %e, "Could not determine update status at startup"),
    }

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let rpc_handle = RpcServer::new(rpc_config, launcher, oracle)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!("System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown; a running update is not ours to stop
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");

    Ok(())
}
