mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::rpc::RpcClient;
use crate::scanner::ScannerStatus;
use crate::store::Gateway;

pub use types::HealthResponse;

/// Shared state behind all three probe endpoints. Holds only what's
/// needed to re-run the two checks the readiness and full health
/// endpoints both depend on — no separate "ready" vs "health" query path.
pub struct HealthState {
    gw: Arc<Gateway>,
    rpc: Arc<RpcClient>,
    scanner: Arc<ScannerStatus>,
    confirmation_depth: u64,
    max_blocks_behind: u64,
}

impl HealthState {
    pub fn new(
        gw: Arc<Gateway>,
        rpc: Arc<RpcClient>,
        scanner: Arc<ScannerStatus>,
        confirmation_depth: u64,
        max_blocks_behind: u64,
    ) -> Arc<Self> {
        Arc::new(Self { gw, rpc, scanner, confirmation_depth, max_blocks_behind })
    }

    /// The two calls every endpoint is built from: current chain tip and
    /// the persisted checkpoint. `/ready` and `/health` both derive their
    /// verdicts from this single pair rather than querying twice each.
    /// Run independently so an RPC failure can't mask the store's own
    /// status, and vice versa.
    async fn probe(&self) -> (Result<u64, String>, Result<i64, String>) {
        let rpc_result = self.rpc.block_number().await.map_err(|e| e.to_string());
        let store_result = self
            .gw
            .get_checkpoint()
            .await
            .map(|c| c.last_indexed_block)
            .map_err(|e| e.to_string());
        (rpc_result, store_result)
    }
}

pub fn router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/live", get(live))
        .route("/ready", get(ready))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: Arc<HealthState>, port: u16, shutdown: tokio_util::sync::CancellationToken) -> eyre::Result<()> {
    let app = router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "health server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("health server shutting down");
        })
        .await?;

    Ok(())
}

/// Liveness never depends on anything external — it only proves the
/// process is scheduling tasks at all.
async fn live() -> StatusCode {
    StatusCode::OK
}

async fn ready(State(state): State<Arc<HealthState>>) -> StatusCode {
    if !state.scanner.is_running() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    let (rpc_result, store_result) = state.probe().await;
    if let Err(e) = &rpc_result {
        tracing::warn!(error = %e, "readiness rpc probe failed");
    }
    if let Err(e) = &store_result {
        tracing::warn!(error = %e, "readiness store probe failed");
    }
    if rpc_result.is_ok() && store_result.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn health(State(state): State<Arc<HealthState>>) -> (StatusCode, Json<HealthResponse>) {
    let is_syncing = state.scanner.is_syncing();
    let tracked_wallets = state.scanner.tracked_wallets();

    let (rpc_result, store_result) = state.probe().await;

    let (current_block, rpc_ok) = match rpc_result {
        Ok(block) => (block, true),
        Err(e) => {
            tracing::warn!(error = %e, "health rpc probe failed");
            (0, false)
        }
    };
    let (last_indexed_block, store_ok) = match store_result {
        Ok(last) => (last as u64, true),
        Err(e) => {
            tracing::warn!(error = %e, "health store probe failed");
            (0, false)
        }
    };

    let blocks_behind = current_block
        .saturating_sub(last_indexed_block)
        .saturating_sub(state.confirmation_depth);

    let falling_behind = blocks_behind > state.max_blocks_behind && !is_syncing;
    let healthy = rpc_ok && store_ok && state.scanner.is_running() && !falling_behind;

    let response = HealthResponse {
        status: if healthy { "healthy".to_string() } else { "unhealthy".to_string() },
        current_block,
        last_indexed_block,
        blocks_behind,
        is_syncing,
        tracked_wallets,
        rpc_ok,
        store_ok,
    };

    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(response))
}
