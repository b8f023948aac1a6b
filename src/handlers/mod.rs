use std::str::FromStr;

use alloy::primitives::{Address, Bytes, U256};

use crate::config::ModuleAddresses;
use crate::decoder::abi::decode_owners_return;
use crate::decoder::events::LogMeta;
use crate::decoder::{classify_calldata, DecodedEvent};
use crate::error::IndexError;
use crate::rpc::RpcClient;
use crate::store::Gateway;

const SELECTOR_GET_OWNERS: [u8; 4] = [0xa0, 0xe6, 0x7e, 0x2b]; // getOwners()
const SELECTOR_THRESHOLD: [u8; 4] = [0x42, 0xcd, 0xe4, 0xe8]; // threshold()

/// Routes one decoded event to its projection. Any error here propagates
/// to the scanner, which aborts the current block range without advancing
/// the checkpoint; the range is retried whole on the next poll.
pub async fn dispatch(
    event: &DecodedEvent,
    gw: &Gateway,
    rpc: &RpcClient,
    modules: &ModuleAddresses,
) -> Result<(), IndexError> {
    match event {
        DecodedEvent::WalletCreated { wallet, owners, threshold, meta, .. } => {
            gw.upsert_wallet(wallet, threshold, owners.len() as i32, meta.block_number as i64, &meta.transaction_hash)
                .await?;
            gw.insert_owners_batch(wallet, owners, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::WalletRegistered { wallet, meta, .. } => {
            handle_wallet_registered(wallet, meta, gw, rpc).await
        }

        DecodedEvent::TransactionProposed { wallet, tx_hash, proposer, to, value, data, meta } => {
            let to_is_module = is_module_address(to, modules);
            let (transaction_type, params) = classify_calldata(data, to_is_module);
            gw.insert_transaction_pending(
                wallet,
                tx_hash,
                to,
                value,
                data,
                transaction_type.as_str(),
                params.to_json(),
                proposer,
                meta.block_number as i64,
                &meta.transaction_hash,
            )
            .await
        }

        DecodedEvent::TransactionApproved { wallet, tx_hash, owner, meta } => {
            gw.insert_confirmation(wallet, tx_hash, owner, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::ApprovalRevoked { wallet, tx_hash, owner, meta } => {
            gw.revoke_confirmation(wallet, tx_hash, owner, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::TransactionExecuted { wallet, tx_hash, meta, .. } => {
            gw.mark_transaction_executed(wallet, tx_hash, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::TransactionCancelled { wallet, tx_hash, meta, .. } => {
            gw.mark_transaction_cancelled(wallet, tx_hash, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::OwnerAdded { wallet, owner, meta } => {
            gw.insert_owner(wallet, owner, meta.block_number as i64, &meta.transaction_hash).await?;
            gw.increment_owner_count(wallet, 1).await
        }

        DecodedEvent::OwnerRemoved { wallet, owner, meta } => {
            gw.mark_owner_inactive(wallet, owner, meta.block_number as i64, &meta.transaction_hash).await?;
            gw.increment_owner_count(wallet, -1).await
        }

        DecodedEvent::ThresholdChanged { wallet, threshold, .. } => gw.update_threshold(wallet, threshold).await,

        DecodedEvent::ModuleEnabled { wallet, module, meta } => {
            gw.upsert_module_enabled(wallet, module, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::ModuleDisabled { wallet, module, meta } => {
            gw.disable_module(wallet, module, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::Received { wallet, sender, amount, meta } => {
            gw.insert_deposit(wallet, sender, amount, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::RecoverySetup { wallet, guardians, threshold, recovery_period, meta } => {
            gw.upsert_recovery_setup(
                wallet,
                threshold,
                recovery_period,
                guardians,
                meta.block_number as i64,
                &meta.transaction_hash,
            )
            .await
        }

        DecodedEvent::RecoveryInitiated { wallet, recovery_hash, new_owners, new_threshold, initiator, meta } => {
            handle_recovery_initiated(wallet, recovery_hash, new_owners, new_threshold, initiator, meta, gw, rpc)
                .await
        }

        DecodedEvent::RecoveryApproved { wallet, recovery_hash, guardian, meta } => {
            gw.insert_recovery_approval(wallet, recovery_hash, guardian, meta.block_number as i64, &meta.transaction_hash)
                .await
        }

        DecodedEvent::RecoveryApprovalRevoked { wallet, recovery_hash, guardian, meta } => {
            gw.revoke_recovery_approval(wallet, recovery_hash, guardian, meta.block_number as i64, &meta.transaction_hash)
                .await
        }

        DecodedEvent::RecoveryExecuted { wallet, recovery_hash, meta } => {
            gw.mark_recovery_executed(wallet, recovery_hash, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::RecoveryCancelled { wallet, recovery_hash, meta } => {
            gw.mark_recovery_cancelled(wallet, recovery_hash, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::DailyLimitSet { wallet, daily_limit, .. } => gw.upsert_daily_limit_set(wallet, daily_limit).await,

        DecodedEvent::DailyLimitReset { wallet, .. } => gw.reset_daily_limit(wallet).await,

        DecodedEvent::DailyLimitTransactionExecuted { wallet, to, value, remaining_limit, meta } => {
            let module = modules.daily_limit.clone().unwrap_or_default();
            gw.insert_module_transaction(
                wallet,
                "daily_limit",
                &module,
                to,
                value,
                Some(remaining_limit.as_str()),
                meta.block_number as i64,
                &meta.transaction_hash,
            )
            .await?;
            gw.apply_daily_limit_spend(wallet, remaining_limit).await
        }

        DecodedEvent::AddressWhitelisted { wallet, whitelisted, limit, meta } => {
            gw.insert_whitelist_entry(wallet, whitelisted, limit, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::AddressRemovedFromWhitelist { wallet, whitelisted, meta } => {
            gw.remove_whitelist_entry(wallet, whitelisted, meta.block_number as i64, &meta.transaction_hash).await
        }

        DecodedEvent::WhitelistTransactionExecuted { wallet, to, value, meta } => {
            let module = modules.whitelist.clone().unwrap_or_default();
            gw.insert_module_transaction(
                wallet,
                "whitelist",
                &module,
                to,
                value,
                None,
                meta.block_number as i64,
                &meta.transaction_hash,
            )
            .await
        }
    }
}

/// Late-discovery path: the factory's `WalletRegistered` doesn't carry an
/// owner list, so the owners and threshold are read back from the wallet
/// contract directly, pinned to the event's own block so the read is
/// consistent with the state that produced the event.
async fn handle_wallet_registered(wallet: &str, meta: &LogMeta, gw: &Gateway, rpc: &RpcClient) -> Result<(), IndexError> {
    let address = Address::from_str(wallet).map_err(|_| IndexError::validation("wallet", wallet))?;

    let owners_data = rpc.call(address, Bytes::from(SELECTOR_GET_OWNERS.to_vec()), Some(meta.block_number)).await?;
    let owners = decode_owners_return(&owners_data).map_err(|e| IndexError::Decode(e.to_string()))?;

    let threshold_data = rpc.call(address, Bytes::from(SELECTOR_THRESHOLD.to_vec()), Some(meta.block_number)).await?;
    if threshold_data.len() < 32 {
        return Err(IndexError::Decode("threshold() returned less than one word".to_string()));
    }
    let threshold = U256::from_be_slice(&threshold_data[..32]).to_string();

    gw.upsert_wallet(wallet, &threshold, owners.len() as i32, meta.block_number as i64, &meta.transaction_hash)
        .await?;
    gw.insert_owners_batch(wallet, &owners, meta.block_number as i64, &meta.transaction_hash).await
}

/// `executionTime = blockTimestamp(initiationBlock) + recoveryConfig.recoveryPeriod`.
/// A failed timestamp read falls back to wall-clock and is logged, never
/// silently — the fallback changes the stored value.
async fn handle_recovery_initiated(
    wallet: &str,
    recovery_hash: &str,
    new_owners: &[String],
    new_threshold: &str,
    initiator: &str,
    meta: &LogMeta,
    gw: &Gateway,
    rpc: &RpcClient,
) -> Result<(), IndexError> {
    let (required_threshold, recovery_period) = gw
        .get_recovery_config(wallet)
        .await?
        .ok_or_else(|| IndexError::Decode(format!("no recovery config for wallet {wallet}")))?;

    let execution_time = match rpc.block_timestamp(meta.block_number).await {
        Ok(ts) => ts as i64 + recovery_period,
        Err(e) => {
            tracing::warn!(
                wallet = %wallet,
                block = meta.block_number,
                error = %e,
                "block timestamp lookup failed, falling back to wall-clock for recovery executionTime"
            );
            chrono::Utc::now().timestamp() + recovery_period
        }
    };

    gw.insert_recovery(
        wallet,
        recovery_hash,
        new_owners,
        new_threshold,
        initiator,
        &required_threshold.to_string(),
        execution_time,
        meta.block_number as i64,
        &meta.transaction_hash,
    )
    .await
}

fn is_module_address(addr: &str, modules: &ModuleAddresses) -> bool {
    let addr = addr.to_lowercase();
    [&modules.daily_limit, &modules.whitelist, &modules.social_recovery]
        .into_iter()
        .any(|configured| configured.as_deref().map(str::to_lowercase).as_deref() == Some(addr.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_module_address_matches_case_insensitively() {
        let modules = ModuleAddresses {
            daily_limit: Some("0xAAA0000000000000000000000000000000000A".to_string()),
            whitelist: None,
            social_recovery: None,
        };
        assert!(is_module_address("0xaaa0000000000000000000000000000000000a", &modules));
        assert!(!is_module_address("0xbbb0000000000000000000000000000000000b", &modules));
    }
}
