use alloy::primitives::Address;
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;

use crate::config::ModuleAddresses;

/// Metadata every decoded event carries regardless of kind, mirrored
/// straight into the `events` table by the store gateway.
#[derive(Debug, Clone)]
pub struct LogMeta {
    pub block_number: u64,
    pub transaction_hash: String,
    pub log_index: u64,
}

fn log_meta(log: &Log) -> LogMeta {
    LogMeta {
        block_number: log.block_number.unwrap_or(0),
        transaction_hash: format!("0x{}", hex::encode(log.transaction_hash.unwrap_or_default())),
        log_index: log.log_index.unwrap_or(0),
    }
}

fn lower(addr: Address) -> String {
    format!("0x{}", hex::encode(addr.as_slice()))
}

fn lower_b256(b: alloy::primitives::B256) -> String {
    format!("0x{}", hex::encode(b.as_slice()))
}

// Factory-emitted events. Both carry only addresses, so no name collides
// across modules and a single `sol!` block is enough.
mod factory_abi {
    use alloy::sol;
    sol! {
        event WalletCreated(address indexed wallet, address[] owners, uint256 threshold, address indexed creator, bytes32 salt);
        event WalletRegistered(address indexed wallet, address indexed registrar);
    }
}

// Wallet-emitted events. The log's own emitter address *is* the wallet.
mod wallet_abi {
    use alloy::sol;
    sol! {
        event TransactionProposed(bytes32 indexed txHash, address indexed proposer, address to, uint256 value, bytes data);
        event TransactionApproved(bytes32 indexed txHash, address indexed owner);
        event ApprovalRevoked(bytes32 indexed txHash, address indexed owner);
        event TransactionExecuted(bytes32 indexed txHash, address indexed executor);
        event TransactionCancelled(bytes32 indexed txHash, address indexed canceller);
        event OwnerAdded(address indexed owner);
        event OwnerRemoved(address indexed owner);
        event ThresholdChanged(uint256 newThreshold);
        event ModuleEnabled(address indexed module);
        event ModuleDisabled(address indexed module);
        event Received(address indexed sender, uint256 amount);
    }
}

// Social recovery module events. The module is shared across wallets, so
// every event carries the wallet address as its first argument.
mod recovery_abi {
    use alloy::sol;
    sol! {
        event RecoverySetup(address indexed wallet, address[] guardians, uint256 threshold, uint256 recoveryPeriod);
        event RecoveryInitiated(address indexed wallet, bytes32 indexed recoveryHash, address[] newOwners, uint256 newThreshold, address initiator);
        event RecoveryApproved(address indexed wallet, bytes32 indexed recoveryHash, address guardian);
        event RecoveryApprovalRevoked(address indexed wallet, bytes32 indexed recoveryHash, address guardian);
        event RecoveryExecuted(address indexed wallet, bytes32 indexed recoveryHash);
        event RecoveryCancelled(address indexed wallet, bytes32 indexed recoveryHash);
    }
}

// Daily limit module events. `TransactionExecuted` here has the same name
// as the wallet's own event but a different signature, so it gets its own
// module scope and a distinct SIGNATURE_HASH.
mod daily_limit_abi {
    use alloy::sol;
    sol! {
        event DailyLimitSet(address indexed wallet, uint256 dailyLimit);
        event DailyLimitReset(address indexed wallet);
        event TransactionExecuted(address indexed wallet, address to, uint256 value, uint256 remainingLimit);
    }
}

mod whitelist_abi {
    use alloy::sol;
    sol! {
        event AddressWhitelisted(address indexed wallet, address indexed whitelisted, uint256 limit);
        event AddressRemovedFromWhitelist(address indexed wallet, address indexed whitelisted);
        event WhitelistTransactionExecuted(address indexed wallet, address to, uint256 value);
    }
}

/// Every event kind the indexer understands, already detached from the
/// raw log and normalized to lowercase hex strings. `wallet` is always the
/// multisig wallet the event concerns, whether that's the log's own
/// emitter (wallet-level events) or an argument (module-level events).
#[derive(Debug, Clone)]
pub enum DecodedEvent {
    WalletCreated {
        wallet: String,
        owners: Vec<String>,
        threshold: String,
        creator: String,
        salt: String,
        meta: LogMeta,
    },
    WalletRegistered {
        wallet: String,
        registrar: String,
        meta: LogMeta,
    },
    TransactionProposed {
        wallet: String,
        tx_hash: String,
        proposer: String,
        to: String,
        value: String,
        data: String,
        meta: LogMeta,
    },
    TransactionApproved {
        wallet: String,
        tx_hash: String,
        owner: String,
        meta: LogMeta,
    },
    ApprovalRevoked {
        wallet: String,
        tx_hash: String,
        owner: String,
        meta: LogMeta,
    },
    TransactionExecuted {
        wallet: String,
        tx_hash: String,
        executor: String,
        meta: LogMeta,
    },
    TransactionCancelled {
        wallet: String,
        tx_hash: String,
        canceller: String,
        meta: LogMeta,
    },
    OwnerAdded {
        wallet: String,
        owner: String,
        meta: LogMeta,
    },
    OwnerRemoved {
        wallet: String,
        owner: String,
        meta: LogMeta,
    },
    ThresholdChanged {
        wallet: String,
        threshold: String,
        meta: LogMeta,
    },
    ModuleEnabled {
        wallet: String,
        module: String,
        meta: LogMeta,
    },
    ModuleDisabled {
        wallet: String,
        module: String,
        meta: LogMeta,
    },
    Received {
        wallet: String,
        sender: String,
        amount: String,
        meta: LogMeta,
    },
    RecoverySetup {
        wallet: String,
        guardians: Vec<String>,
        threshold: String,
        recovery_period: String,
        meta: LogMeta,
    },
    RecoveryInitiated {
        wallet: String,
        recovery_hash: String,
        new_owners: Vec<String>,
        new_threshold: String,
        initiator: String,
        meta: LogMeta,
    },
    RecoveryApproved {
        wallet: String,
        recovery_hash: String,
        guardian: String,
        meta: LogMeta,
    },
    RecoveryApprovalRevoked {
        wallet: String,
        recovery_hash: String,
        guardian: String,
        meta: LogMeta,
    },
    RecoveryExecuted {
        wallet: String,
        recovery_hash: String,
        meta: LogMeta,
    },
    RecoveryCancelled {
        wallet: String,
        recovery_hash: String,
        meta: LogMeta,
    },
    DailyLimitSet {
        wallet: String,
        daily_limit: String,
        meta: LogMeta,
    },
    DailyLimitReset {
        wallet: String,
        meta: LogMeta,
    },
    DailyLimitTransactionExecuted {
        wallet: String,
        to: String,
        value: String,
        remaining_limit: String,
        meta: LogMeta,
    },
    AddressWhitelisted {
        wallet: String,
        whitelisted: String,
        limit: String,
        meta: LogMeta,
    },
    AddressRemovedFromWhitelist {
        wallet: String,
        whitelisted: String,
        meta: LogMeta,
    },
    WhitelistTransactionExecuted {
        wallet: String,
        to: String,
        value: String,
        meta: LogMeta,
    },
}

impl DecodedEvent {
    pub fn meta(&self) -> &LogMeta {
        match self {
            DecodedEvent::WalletCreated { meta, .. }
            | DecodedEvent::WalletRegistered { meta, .. }
            | DecodedEvent::TransactionProposed { meta, .. }
            | DecodedEvent::TransactionApproved { meta, .. }
            | DecodedEvent::ApprovalRevoked { meta, .. }
            | DecodedEvent::TransactionExecuted { meta, .. }
            | DecodedEvent::TransactionCancelled { meta, .. }
            | DecodedEvent::OwnerAdded { meta, .. }
            | DecodedEvent::OwnerRemoved { meta, .. }
            | DecodedEvent::ThresholdChanged { meta, .. }
            | DecodedEvent::ModuleEnabled { meta, .. }
            | DecodedEvent::ModuleDisabled { meta, .. }
            | DecodedEvent::Received { meta, .. }
            | DecodedEvent::RecoverySetup { meta, .. }
            | DecodedEvent::RecoveryInitiated { meta, .. }
            | DecodedEvent::RecoveryApproved { meta, .. }
            | DecodedEvent::RecoveryApprovalRevoked { meta, .. }
            | DecodedEvent::RecoveryExecuted { meta, .. }
            | DecodedEvent::RecoveryCancelled { meta, .. }
            | DecodedEvent::DailyLimitSet { meta, .. }
            | DecodedEvent::DailyLimitReset { meta, .. }
            | DecodedEvent::DailyLimitTransactionExecuted { meta, .. }
            | DecodedEvent::AddressWhitelisted { meta, .. }
            | DecodedEvent::AddressRemovedFromWhitelist { meta, .. }
            | DecodedEvent::WhitelistTransactionExecuted { meta, .. } => meta,
        }
    }
}

/// All topic0 values the scanner should subscribe to when fetching
/// wallet-level logs (i.e. everything except the factory's own events,
/// which are fetched separately against `factory_address`).
pub fn wallet_topics() -> Vec<alloy::primitives::B256> {
    vec![
        wallet_abi::TransactionProposed::SIGNATURE_HASH,
        wallet_abi::TransactionApproved::SIGNATURE_HASH,
        wallet_abi::ApprovalRevoked::SIGNATURE_HASH,
        wallet_abi::TransactionExecuted::SIGNATURE_HASH,
        wallet_abi::TransactionCancelled::SIGNATURE_HASH,
        wallet_abi::OwnerAdded::SIGNATURE_HASH,
        wallet_abi::OwnerRemoved::SIGNATURE_HASH,
        wallet_abi::ThresholdChanged::SIGNATURE_HASH,
        wallet_abi::ModuleEnabled::SIGNATURE_HASH,
        wallet_abi::ModuleDisabled::SIGNATURE_HASH,
        wallet_abi::Received::SIGNATURE_HASH,
    ]
}

pub fn factory_topics() -> Vec<alloy::primitives::B256> {
    vec![
        factory_abi::WalletCreated::SIGNATURE_HASH,
        factory_abi::WalletRegistered::SIGNATURE_HASH,
    ]
}

/// Topics to fetch from each configured module address, keyed by which
/// module they belong to so the scanner only subscribes to topics for
/// modules that are actually configured.
pub fn recovery_topics() -> Vec<alloy::primitives::B256> {
    vec![
        recovery_abi::RecoverySetup::SIGNATURE_HASH,
        recovery_abi::RecoveryInitiated::SIGNATURE_HASH,
        recovery_abi::RecoveryApproved::SIGNATURE_HASH,
        recovery_abi::RecoveryApprovalRevoked::SIGNATURE_HASH,
        recovery_abi::RecoveryExecuted::SIGNATURE_HASH,
        recovery_abi::RecoveryCancelled::SIGNATURE_HASH,
    ]
}

pub fn daily_limit_topics() -> Vec<alloy::primitives::B256> {
    vec![
        daily_limit_abi::DailyLimitSet::SIGNATURE_HASH,
        daily_limit_abi::DailyLimitReset::SIGNATURE_HASH,
        daily_limit_abi::TransactionExecuted::SIGNATURE_HASH,
    ]
}

pub fn whitelist_topics() -> Vec<alloy::primitives::B256> {
    vec![
        whitelist_abi::AddressWhitelisted::SIGNATURE_HASH,
        whitelist_abi::AddressRemovedFromWhitelist::SIGNATURE_HASH,
        whitelist_abi::WhitelistTransactionExecuted::SIGNATURE_HASH,
    ]
}

/// Decode a single log against every known event shape. Returns `None`
/// for logs that match no known signature, or that match a signature but
/// come from an emitter that isn't the corresponding configured address
/// (the daily-limit and factory collision guards).
pub fn decode_event(log: &Log, factory_address: &str, modules: &ModuleAddresses) -> Option<DecodedEvent> {
    let topics = log.inner.data.topics();
    if topics.is_empty() {
        return None;
    }
    let sig = topics[0];
    let emitter = lower(log.inner.address);
    let meta = log_meta(log);

    if sig == factory_abi::WalletCreated::SIGNATURE_HASH {
        if emitter != factory_address.to_lowercase() {
            return None;
        }
        let d = factory_abi::WalletCreated::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::WalletCreated {
            wallet: lower(d.wallet),
            owners: d.owners.iter().map(|a| lower(*a)).collect(),
            threshold: d.threshold.to_string(),
            creator: lower(d.creator),
            salt: lower_b256(d.salt),
            meta,
        });
    }

    if sig == factory_abi::WalletRegistered::SIGNATURE_HASH {
        if emitter != factory_address.to_lowercase() {
            return None;
        }
        let d = factory_abi::WalletRegistered::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::WalletRegistered {
            wallet: lower(d.wallet),
            registrar: lower(d.registrar),
            meta,
        });
    }

    if sig == wallet_abi::TransactionProposed::SIGNATURE_HASH {
        let d = wallet_abi::TransactionProposed::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::TransactionProposed {
            wallet: emitter,
            tx_hash: lower_b256(d.txHash),
            proposer: lower(d.proposer),
            to: lower(d.to),
            value: d.value.to_string(),
            data: format!("0x{}", hex::encode(&d.data.data)),
            meta,
        });
    }

    if sig == wallet_abi::TransactionApproved::SIGNATURE_HASH {
        let d = wallet_abi::TransactionApproved::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::TransactionApproved {
            wallet: emitter,
            tx_hash: lower_b256(d.txHash),
            owner: lower(d.owner),
            meta,
        });
    }

    if sig == wallet_abi::ApprovalRevoked::SIGNATURE_HASH {
        let d = wallet_abi::ApprovalRevoked::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::ApprovalRevoked {
            wallet: emitter,
            tx_hash: lower_b256(d.txHash),
            owner: lower(d.owner),
            meta,
        });
    }

    if sig == wallet_abi::TransactionExecuted::SIGNATURE_HASH {
        let d = wallet_abi::TransactionExecuted::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::TransactionExecuted {
            wallet: emitter,
            tx_hash: lower_b256(d.txHash),
            executor: lower(d.executor),
            meta,
        });
    }

    if sig == wallet_abi::TransactionCancelled::SIGNATURE_HASH {
        let d = wallet_abi::TransactionCancelled::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::TransactionCancelled {
            wallet: emitter,
            tx_hash: lower_b256(d.txHash),
            canceller: lower(d.canceller),
            meta,
        });
    }

    if sig == wallet_abi::OwnerAdded::SIGNATURE_HASH {
        let d = wallet_abi::OwnerAdded::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::OwnerAdded {
            wallet: emitter,
            owner: lower(d.owner),
            meta,
        });
    }

    if sig == wallet_abi::OwnerRemoved::SIGNATURE_HASH {
        let d = wallet_abi::OwnerRemoved::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::OwnerRemoved {
            wallet: emitter,
            owner: lower(d.owner),
            meta,
        });
    }

    if sig == wallet_abi::ThresholdChanged::SIGNATURE_HASH {
        let d = wallet_abi::ThresholdChanged::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::ThresholdChanged {
            wallet: emitter,
            threshold: d.newThreshold.to_string(),
            meta,
        });
    }

    if sig == wallet_abi::ModuleEnabled::SIGNATURE_HASH {
        let d = wallet_abi::ModuleEnabled::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::ModuleEnabled {
            wallet: emitter,
            module: lower(d.module),
            meta,
        });
    }

    if sig == wallet_abi::ModuleDisabled::SIGNATURE_HASH {
        let d = wallet_abi::ModuleDisabled::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::ModuleDisabled {
            wallet: emitter,
            module: lower(d.module),
            meta,
        });
    }

    if sig == wallet_abi::Received::SIGNATURE_HASH {
        let d = wallet_abi::Received::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::Received {
            wallet: emitter,
            sender: lower(d.sender),
            amount: d.amount.to_string(),
            meta,
        });
    }

    if sig == recovery_abi::RecoverySetup::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.social_recovery) {
            return None;
        }
        let d = recovery_abi::RecoverySetup::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::RecoverySetup {
            wallet: lower(d.wallet),
            guardians: d.guardians.iter().map(|a| lower(*a)).collect(),
            threshold: d.threshold.to_string(),
            recovery_period: d.recoveryPeriod.to_string(),
            meta,
        });
    }

    if sig == recovery_abi::RecoveryInitiated::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.social_recovery) {
            return None;
        }
        let d = recovery_abi::RecoveryInitiated::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::RecoveryInitiated {
            wallet: lower(d.wallet),
            recovery_hash: lower_b256(d.recoveryHash),
            new_owners: d.newOwners.iter().map(|a| lower(*a)).collect(),
            new_threshold: d.newThreshold.to_string(),
            initiator: lower(d.initiator),
            meta,
        });
    }

    if sig == recovery_abi::RecoveryApproved::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.social_recovery) {
            return None;
        }
        let d = recovery_abi::RecoveryApproved::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::RecoveryApproved {
            wallet: lower(d.wallet),
            recovery_hash: lower_b256(d.recoveryHash),
            guardian: lower(d.guardian),
            meta,
        });
    }

    if sig == recovery_abi::RecoveryApprovalRevoked::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.social_recovery) {
            return None;
        }
        let d = recovery_abi::RecoveryApprovalRevoked::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::RecoveryApprovalRevoked {
            wallet: lower(d.wallet),
            recovery_hash: lower_b256(d.recoveryHash),
            guardian: lower(d.guardian),
            meta,
        });
    }

    if sig == recovery_abi::RecoveryExecuted::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.social_recovery) {
            return None;
        }
        let d = recovery_abi::RecoveryExecuted::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::RecoveryExecuted {
            wallet: lower(d.wallet),
            recovery_hash: lower_b256(d.recoveryHash),
            meta,
        });
    }

    if sig == recovery_abi::RecoveryCancelled::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.social_recovery) {
            return None;
        }
        let d = recovery_abi::RecoveryCancelled::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::RecoveryCancelled {
            wallet: lower(d.wallet),
            recovery_hash: lower_b256(d.recoveryHash),
            meta,
        });
    }

    if sig == daily_limit_abi::DailyLimitSet::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.daily_limit) {
            return None;
        }
        let d = daily_limit_abi::DailyLimitSet::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::DailyLimitSet {
            wallet: lower(d.wallet),
            daily_limit: d.dailyLimit.to_string(),
            meta,
        });
    }

    if sig == daily_limit_abi::DailyLimitReset::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.daily_limit) {
            return None;
        }
        let d = daily_limit_abi::DailyLimitReset::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::DailyLimitReset {
            wallet: lower(d.wallet),
            meta,
        });
    }

    // Same name, different signature than the wallet's own TransactionExecuted.
    // Emitter-address check is what keeps the two apart.
    if sig == daily_limit_abi::TransactionExecuted::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.daily_limit) {
            return None;
        }
        let d = daily_limit_abi::TransactionExecuted::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::DailyLimitTransactionExecuted {
            wallet: lower(d.wallet),
            to: lower(d.to),
            value: d.value.to_string(),
            remaining_limit: d.remainingLimit.to_string(),
            meta,
        });
    }

    if sig == whitelist_abi::AddressWhitelisted::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.whitelist) {
            return None;
        }
        let d = whitelist_abi::AddressWhitelisted::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::AddressWhitelisted {
            wallet: lower(d.wallet),
            whitelisted: lower(d.whitelisted),
            limit: d.limit.to_string(),
            meta,
        });
    }

    if sig == whitelist_abi::AddressRemovedFromWhitelist::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.whitelist) {
            return None;
        }
        let d = whitelist_abi::AddressRemovedFromWhitelist::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::AddressRemovedFromWhitelist {
            wallet: lower(d.wallet),
            whitelisted: lower(d.whitelisted),
            meta,
        });
    }

    if sig == whitelist_abi::WhitelistTransactionExecuted::SIGNATURE_HASH {
        if !is_module(&emitter, &modules.whitelist) {
            return None;
        }
        let d = whitelist_abi::WhitelistTransactionExecuted::decode_log(&log.inner).ok()?;
        return Some(DecodedEvent::WhitelistTransactionExecuted {
            wallet: lower(d.wallet),
            to: lower(d.to),
            value: d.value.to_string(),
            meta,
        });
    }

    None
}

fn is_module(emitter: &str, configured: &Option<String>) -> bool {
    match configured {
        Some(addr) => emitter == addr.to_lowercase(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, U256};
    use alloy::rpc::types::Log as RpcLog;
    use alloy::sol_types::SolEvent;

    fn wallet_addr() -> Address {
        Address::repeat_byte(0x11)
    }

    fn make_log(inner: alloy::primitives::Log, block_number: u64) -> RpcLog {
        RpcLog {
            inner,
            block_hash: None,
            block_number: Some(block_number),
            block_timestamp: None,
            transaction_hash: Some(B256::repeat_byte(0xaa)),
            transaction_index: Some(0),
            log_index: Some(3),
            removed: false,
        }
    }

    #[test]
    fn decodes_owner_added_with_emitter_as_wallet() {
        let owner = Address::repeat_byte(0x22);
        let inner = wallet_abi::OwnerAdded { owner }.encode_log_data();
        let inner = alloy::primitives::Log::new(wallet_addr(), inner.topics().to_vec(), inner.data)
            .expect("valid log");
        let log = make_log(inner, 100);

        let decoded = decode_event(&log, "0xfactory", &ModuleAddresses::default())
            .expect("should decode");
        match decoded {
            DecodedEvent::OwnerAdded { wallet, owner: o, .. } => {
                assert_eq!(wallet, lower(wallet_addr()));
                assert_eq!(o, lower(owner));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn rejects_daily_limit_event_from_unconfigured_emitter() {
        let inner = daily_limit_abi::DailyLimitReset { wallet: wallet_addr() }.encode_log_data();
        let inner = alloy::primitives::Log::new(
            Address::repeat_byte(0x99),
            inner.topics().to_vec(),
            inner.data,
        )
        .expect("valid log");
        let log = make_log(inner, 100);

        assert!(decode_event(&log, "0xfactory", &ModuleAddresses::default()).is_none());
    }

    #[test]
    fn accepts_daily_limit_event_from_configured_module() {
        let module = Address::repeat_byte(0x33);
        let inner = daily_limit_abi::TransactionExecuted {
            wallet: wallet_addr(),
            to: Address::repeat_byte(0x44),
            value: U256::from(500u64),
            remainingLimit: U256::from(1500u64),
        }
        .encode_log_data();
        let inner = alloy::primitives::Log::new(module, inner.topics().to_vec(), inner.data)
            .expect("valid log");
        let log = make_log(inner, 100);

        let modules = ModuleAddresses {
            daily_limit: Some(lower(module)),
            whitelist: None,
            social_recovery: None,
        };

        let decoded = decode_event(&log, "0xfactory", &modules).expect("should decode");
        assert!(matches!(decoded, DecodedEvent::DailyLimitTransactionExecuted { .. }));
    }
}
