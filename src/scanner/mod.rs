pub mod status;
pub mod tracked;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use alloy::rpc::types::Log;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, ModuleAddresses};
use crate::decoder;
use crate::decoder::DecodedEvent;
use crate::error::IndexError;
use crate::handlers;
use crate::rpc::RpcClient;
use crate::store::Gateway;

pub use status::ScannerStatus;
pub use tracked::TrackedWallets;

/// Runs the full pipeline: startup backfill (if the chain has moved on
/// since the last checkpoint), then the live poll loop, until cancelled.
pub async fn run(
    config: Arc<Config>,
    gw: Arc<Gateway>,
    rpc: Arc<RpcClient>,
    status: Arc<ScannerStatus>,
    shutdown: CancellationToken,
) -> Result<(), IndexError> {
    status.set_running(true);
    let modules = config.module_addresses();
    let factory_address =
        Address::from_str(&config.factory_address).map_err(|_| IndexError::Config("FACTORY_ADDRESS is not a well-formed address".into()))?;

    let mut tracked = TrackedWallets::new(status.tracked_counter());
    let known = gw.get_all_wallet_addresses().await?;
    tracked.reload(known);

    let checkpoint = gw.get_checkpoint().await?;
    let tip = rpc.block_number().await?;
    let safe_block = tip.saturating_sub(config.confirmation_depth);
    let start_block = std::cmp::max(checkpoint.last_indexed_block as u64 + 1, config.start_block);

    if start_block <= safe_block {
        tracing::info!(start_block, safe_block, "starting backfill");
        backfill_range(start_block, safe_block, &config, &gw, &rpc, &modules, factory_address, &mut tracked, &status, &shutdown).await?;
    }

    if !shutdown.is_cancelled() {
        poll_loop(&config, &gw, &rpc, &modules, factory_address, &mut tracked, &status, &shutdown).await;
    }

    status.set_running(false);
    tracing::info!("scanner stopped");
    Ok(())
}

/// Iterates `[start, end]` in batches of `config.batch_size`, marking
/// `isSyncing` for the duration. A batch that fails is retried in place
/// after a short delay rather than advancing past it, since the
/// checkpoint only moves on success.
#[allow(clippy::too_many_arguments)]
async fn backfill_range(
    start: u64,
    end: u64,
    config: &Config,
    gw: &Gateway,
    rpc: &RpcClient,
    modules: &ModuleAddresses,
    factory_address: Address,
    tracked: &mut TrackedWallets,
    status: &ScannerStatus,
    shutdown: &CancellationToken,
) -> Result<(), IndexError> {
    status.set_syncing(true);
    let mut current = start;

    while current <= end {
        if shutdown.is_cancelled() {
            break;
        }
        let batch_end = std::cmp::min(current + config.batch_size - 1, end);

        match index_range(current, batch_end, gw, rpc, config, modules, factory_address, tracked).await {
            Ok(()) => current = batch_end + 1,
            Err(e) => {
                tracing::error!(from = current, to = batch_end, error = %e, "backfill batch failed, will not advance");
                status.set_syncing(false);
                return Err(e);
            }
        }
    }

    status.set_syncing(false);
    Ok(())
}

/// Cooperative, single-threaded poll loop. A failed range is logged and
/// left for the next tick to retry, since the checkpoint wasn't moved.
#[allow(clippy::too_many_arguments)]
async fn poll_loop(
    config: &Config,
    gw: &Gateway,
    rpc: &RpcClient,
    modules: &ModuleAddresses,
    factory_address: Address,
    tracked: &mut TrackedWallets,
    status: &ScannerStatus,
    shutdown: &CancellationToken,
) {
    let interval = Duration::from_millis(config.poll_interval_ms);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => break,
        }
        if shutdown.is_cancelled() {
            break;
        }

        let checkpoint = match gw.get_checkpoint().await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "failed to read checkpoint, will retry next tick");
                continue;
            }
        };
        let tip = match rpc.block_number().await {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "failed to read chain tip, will retry next tick");
                continue;
            }
        };

        let safe_block = tip.saturating_sub(config.confirmation_depth);
        let last = checkpoint.last_indexed_block as u64;

        if safe_block <= last {
            continue;
        }

        if safe_block - last > config.batch_size {
            tracing::warn!(last, safe_block, "gap exceeds batch size, reloading tracked wallets and backfilling");
            match gw.get_all_wallet_addresses().await {
                Ok(known) => tracked.reload(known),
                Err(e) => {
                    tracing::error!(error = %e, "failed to reload tracked wallets, will retry next tick");
                    continue;
                }
            }
            if let Err(e) = backfill_range(last + 1, safe_block, config, gw, rpc, modules, factory_address, tracked, status, shutdown).await {
                tracing::error!(error = %e, "gap backfill failed, will retry next tick");
            }
        } else if let Err(e) = index_range(last + 1, safe_block, gw, rpc, config, modules, factory_address, tracked).await {
            tracing::error!(from = last + 1, to = safe_block, error = %e, "failed to index block range, will retry next tick");
        }
    }
}

/// Indexes one inclusive block range: the atomic unit of progress. Fetches
/// factory, wallet, and module logs separately (each carrying a priority
/// used only to break block-local ties), merges and sorts them, then
/// decodes and dispatches strictly in order. The checkpoint only advances
/// once every log in the range has been applied.
#[allow(clippy::too_many_arguments)]
async fn index_range(
    from: u64,
    to: u64,
    gw: &Gateway,
    rpc: &RpcClient,
    config: &Config,
    modules: &ModuleAddresses,
    factory_address: Address,
    tracked: &mut TrackedWallets,
) -> Result<(), IndexError> {
    let mut tagged: Vec<(Log, u8)> = Vec::new();

    let factory_logs = rpc.get_logs(&[factory_address], &decoder::factory_topics(), from, to).await?;
    tagged.extend(factory_logs.into_iter().map(|l| (l, 0u8)));

    if !tracked.is_empty() {
        let wallet_topics = decoder::wallet_topics();
        for chunk in tracked.addresses().chunks(100) {
            let wallet_logs = rpc.get_logs(chunk, &wallet_topics, from, to).await?;
            tagged.extend(wallet_logs.into_iter().map(|l| (l, 1u8)));
        }
    }

    let (module_addrs, module_topics) = configured_module_filter(modules);
    if !module_addrs.is_empty() {
        let module_logs = rpc.get_logs(&module_addrs, &module_topics, from, to).await?;
        tagged.extend(module_logs.into_iter().map(|l| (l, 2u8)));
    }

    let ordered = merge_logs(tagged);

    for (log, _priority) in &ordered {
        let decoded = match decoder::decode_event(log, &config.factory_address, modules) {
            Some(d) => d,
            None => {
                tracing::debug!(
                    block = log.block_number.unwrap_or(0),
                    log_index = log.log_index.unwrap_or(0),
                    "log matched no known event shape, skipping"
                );
                continue;
            }
        };

        if let DecodedEvent::WalletCreated { wallet, .. } | DecodedEvent::WalletRegistered { wallet, .. } = &decoded {
            tracked.insert(wallet.clone());
        }

        handlers::dispatch(&decoded, gw, rpc, modules).await?;
    }

    gw.advance_checkpoint(to as i64).await?;
    Ok(())
}

/// Deterministic merge: block number first, then priority (factory=0,
/// wallet=1, module=2) as a within-block tie-breaker, then the chain's
/// own log index.
fn merge_logs(mut tagged: Vec<(Log, u8)>) -> Vec<(Log, u8)> {
    tagged.sort_by(|(a, ap), (b, bp)| {
        let a_block = a.block_number.unwrap_or(0);
        let b_block = b.block_number.unwrap_or(0);
        a_block.cmp(&b_block).then(ap.cmp(bp)).then(a.log_index.unwrap_or(0).cmp(&b.log_index.unwrap_or(0)))
    });
    tagged
}

fn configured_module_filter(modules: &ModuleAddresses) -> (Vec<Address>, Vec<B256>) {
    let mut addrs = Vec::new();
    let mut topics = Vec::new();

    if let Some(a) = &modules.social_recovery {
        if let Ok(addr) = Address::from_str(a) {
            addrs.push(addr);
            topics.extend(decoder::recovery_topics());
        }
    }
    if let Some(a) = &modules.daily_limit {
        if let Ok(addr) = Address::from_str(a) {
            addrs.push(addr);
            topics.extend(decoder::daily_limit_topics());
        }
    }
    if let Some(a) = &modules.whitelist {
        if let Ok(addr) = Address::from_str(a) {
            addrs.push(addr);
            topics.extend(decoder::whitelist_topics());
        }
    }

    (addrs, topics)
}

/// Standalone backfill over an explicit `[from, to]` range, independent of
/// the persisted checkpoint. Used for manual reprocessing via
/// `BACKFILL_FROM`/`BACKFILL_TO`; does not fall through to the poll loop.
pub async fn run_backfill_only(
    config: Arc<Config>,
    gw: Arc<Gateway>,
    rpc: Arc<RpcClient>,
    status: Arc<ScannerStatus>,
    shutdown: CancellationToken,
    from: u64,
    to: u64,
) -> Result<(), IndexError> {
    status.set_running(true);
    let modules = config.module_addresses();
    let factory_address =
        Address::from_str(&config.factory_address).map_err(|_| IndexError::Config("FACTORY_ADDRESS is not a well-formed address".into()))?;

    let mut tracked = TrackedWallets::new(status.tracked_counter());
    let known = gw.get_all_wallet_addresses().await?;
    tracked.reload(known);

    let result = backfill_range(from, to, &config, &gw, &rpc, &modules, factory_address, &mut tracked, &status, &shutdown).await;
    status.set_running(false);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256 as B256Type;

    fn log_at(block: u64, log_index: u64) -> Log {
        let inner = alloy::primitives::Log::new(Address::ZERO, vec![B256Type::ZERO], Default::default())
            .expect("valid log");
        Log {
            inner,
            block_hash: None,
            block_number: Some(block),
            block_timestamp: None,
            transaction_hash: None,
            transaction_index: None,
            log_index: Some(log_index),
            removed: false,
        }
    }

    #[test]
    fn sorts_by_block_then_priority_then_log_index() {
        let tagged = vec![
            (log_at(10, 2), 1u8),
            (log_at(10, 1), 0u8),
            (log_at(9, 5), 2u8),
            (log_at(10, 0), 0u8),
        ];
        let sorted = merge_logs(tagged);
        let order: Vec<(u64, u8, u64)> = sorted
            .iter()
            .map(|(l, p)| (l.block_number.unwrap(), *p, l.log_index.unwrap()))
            .collect();
        assert_eq!(order, vec![(9, 2, 5), (10, 0, 0), (10, 0, 1), (10, 1, 2)]);
    }

    #[test]
    fn module_filter_skips_unconfigured_modules() {
        let modules = ModuleAddresses { daily_limit: None, whitelist: None, social_recovery: None };
        let (addrs, topics) = configured_module_filter(&modules);
        assert!(addrs.is_empty());
        assert!(topics.is_empty());
    }

    #[test]
    fn module_filter_includes_configured_modules_topics() {
        let modules = ModuleAddresses {
            daily_limit: Some("0xaaa0000000000000000000000000000000000a".to_string()),
            whitelist: None,
            social_recovery: None,
        };
        let (addrs, topics) = configured_module_filter(&modules);
        assert_eq!(addrs.len(), 1);
        assert_eq!(topics.len(), decoder::daily_limit_topics().len());
    }
}
