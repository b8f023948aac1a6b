use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use multisig_indexer::config::Config;
use multisig_indexer::health::{self, HealthState};
use multisig_indexer::rpc::RpcClient;
use multisig_indexer::scanner::{self, ScannerStatus};
use multisig_indexer::store::Gateway;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Config is loaded before logging is initialized so its own log
    // level / log-to-file settings can drive the subscriber.
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("startup configuration invalid: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config)?;
    tracing::info!("multisig indexer starting");

    let gw = match Gateway::connect(&config.store_url, &config.store_schema, 10).await {
        Ok(gw) => Arc::new(gw),
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to store");
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(gw.pool()).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }
    tracing::info!(schema = %config.store_schema, "store migrations complete");

    let rpc = match RpcClient::new(
        &config.rpc_url,
        config.rate_limit_requests,
        config.rate_limit_window_ms,
        config.timestamp_cache_size,
    ) {
        Ok(rpc) => Arc::new(rpc),
        Err(e) => {
            tracing::error!(error = %e, "failed to construct RPC client");
            std::process::exit(1);
        }
    };

    let config = Arc::new(config);
    let shutdown = CancellationToken::new();
    let status = ScannerStatus::new();

    let mut handles = Vec::new();

    {
        let config = config.clone();
        let gw = gw.clone();
        let rpc = rpc.clone();
        let status = status.clone();
        let shutdown = shutdown.clone();

        let scanner_handle = tokio::spawn(async move {
            let result = match (config.backfill_from, config.backfill_to) {
                (Some(from), Some(to)) => {
                    tracing::info!(from, to, "running standalone backfill");
                    scanner::run_backfill_only(config, gw, rpc, status, shutdown, from, to).await
                }
                _ => scanner::run(config, gw, rpc, status, shutdown).await,
            };
            if let Err(e) = result {
                tracing::error!(error = %e, "scanner task failed");
            }
        });
        handles.push(scanner_handle);
    }

    if config.health_enabled {
        let health_state = HealthState::new(gw.clone(), rpc.clone(), status.clone(), config.confirmation_depth, config.max_blocks_behind);
        let port = config.health_port;
        let shutdown = shutdown.clone();

        let health_handle = tokio::spawn(async move {
            if let Err(e) = health::serve(health_state, port, shutdown).await {
                tracing::error!(error = %e, "health server failed");
            }
        });
        handles.push(health_handle);
    }

    tracing::info!("indexer running, press Ctrl+C to stop");
    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, stopping tasks");
    shutdown.cancel();

    let deadline = tokio::time::Duration::from_secs(10);
    let joined = tokio::time::timeout(deadline, join_all_handles(handles)).await;

    match joined {
        Ok(()) => {
            tracing::info!("multisig indexer stopped gracefully");
            Ok(())
        }
        Err(_) => {
            tracing::error!("shutdown deadline exceeded, exiting non-zero");
            std::process::exit(1);
        }
    }
}

async fn join_all_handles(handles: Vec<tokio::task::JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

fn init_logging(config: &Config) -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).json();

    if config.log_to_file {
        let file = std::fs::OpenOptions::new().create(true).append(true).open("indexer.log")?;
        builder.with_writer(std::sync::Mutex::new(file)).init();
    } else {
        builder.init();
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
