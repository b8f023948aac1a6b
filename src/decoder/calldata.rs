use serde_json::{json, Value};

use crate::decoder::abi::decode_address_array;

/// Coarse transaction category the store persists alongside a proposed
/// transaction, driven by the 4-byte selector of its calldata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Transfer,
    ModuleConfig,
    WalletAdmin,
    RecoverySetup,
    ExternalCall,
    Unknown,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Transfer => "transfer",
            TransactionType::ModuleConfig => "module_config",
            TransactionType::WalletAdmin => "wallet_admin",
            TransactionType::RecoverySetup => "recovery_setup",
            TransactionType::ExternalCall => "external_call",
            TransactionType::Unknown => "unknown",
        }
    }
}

/// Typed decode of a transaction's calldata, kept internally as an enum
/// and only turned into JSON at the store boundary.
#[derive(Debug, Clone)]
pub enum CalldataParams {
    Transfer,
    AddOwner { owner: String },
    RemoveOwner { owner: String },
    ChangeThreshold { threshold: String },
    EnableModule { module: String },
    DisableModule { module: String },
    SetupRecovery { guardians: Vec<String>, threshold: String, recovery_period: String },
    ModuleConfig { raw_data: String },
    ExternalCall { raw_data: String },
    Unknown { raw_data: String },
}

impl CalldataParams {
    pub fn to_json(&self) -> Value {
        match self {
            CalldataParams::Transfer => json!({}),
            CalldataParams::AddOwner { owner } => json!({ "owner": owner }),
            CalldataParams::RemoveOwner { owner } => json!({ "owner": owner }),
            CalldataParams::ChangeThreshold { threshold } => json!({ "threshold": threshold }),
            CalldataParams::EnableModule { module } => json!({ "module": module }),
            CalldataParams::DisableModule { module } => json!({ "module": module }),
            CalldataParams::SetupRecovery { guardians, threshold, recovery_period } => json!({
                "guardians": guardians,
                "threshold": threshold,
                "recoveryPeriod": recovery_period,
            }),
            CalldataParams::ModuleConfig { raw_data } | CalldataParams::ExternalCall { raw_data } => {
                json!({ "rawData": raw_data })
            }
            CalldataParams::Unknown { raw_data } => json!({ "function": "unknown", "rawData": raw_data }),
        }
    }
}

// 4-byte selectors of the admin functions a proposed transaction's
// calldata can target. Computed from the canonical function signature,
// same way `Transfer::SIGNATURE_HASH` is computed for events.
const SELECTOR_ADD_OWNER: [u8; 4] = [0x70, 0x65, 0xcb, 0x48]; // addOwner(address)
const SELECTOR_REMOVE_OWNER: [u8; 4] = [0x17, 0x38, 0x25, 0xd9]; // removeOwner(address)
const SELECTOR_CHANGE_THRESHOLD: [u8; 4] = [0x69, 0x4e, 0x80, 0xc3]; // changeThreshold(uint256)
const SELECTOR_ENABLE_MODULE: [u8; 4] = [0x61, 0x0b, 0x59, 0x25]; // enableModule(address)
const SELECTOR_DISABLE_MODULE: [u8; 4] = [0xa9, 0x5f, 0x52, 0x46]; // disableModule(address)
const SELECTOR_SETUP_RECOVERY: [u8; 4] = [0xd6, 0x80, 0x50, 0x24]; // setupRecovery(address[],uint256,uint256)

/// Classify a proposed transaction's `to` address and calldata.
///
/// Rules, in order:
/// 1. Empty calldata is a plain value transfer.
/// 2. A recognized wallet-admin selector drives both the type and the
///    decoded params.
/// 3. Calldata aimed at a configured module address, but with an
///    unrecognized selector, is `module_config` with the raw bytes kept.
/// 4. Anything else with non-empty calldata is an `external_call`.
pub fn classify_calldata(
    data_hex: &str,
    to_is_module: bool,
) -> (TransactionType, CalldataParams) {
    let data = match strip_hex(data_hex) {
        Some(d) => d,
        None => return (TransactionType::Unknown, CalldataParams::Unknown { raw_data: data_hex.to_string() }),
    };

    if data.is_empty() {
        return (TransactionType::Transfer, CalldataParams::Transfer);
    }

    if data.len() < 4 {
        return (
            TransactionType::Unknown,
            CalldataParams::Unknown { raw_data: data_hex.to_string() },
        );
    }

    let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];
    let args = &data[4..];

    // A recognized selector's type always survives, even when the args
    // fail to decode — only the params shape degrades to `unknown`.
    match selector {
        SELECTOR_ADD_OWNER => decode_single_address(args)
            .map(|owner| (TransactionType::WalletAdmin, CalldataParams::AddOwner { owner }))
            .unwrap_or_else(|| unknown(TransactionType::WalletAdmin, data_hex)),
        SELECTOR_REMOVE_OWNER => decode_single_address(args)
            .map(|owner| (TransactionType::WalletAdmin, CalldataParams::RemoveOwner { owner }))
            .unwrap_or_else(|| unknown(TransactionType::WalletAdmin, data_hex)),
        SELECTOR_CHANGE_THRESHOLD => decode_single_uint(args)
            .map(|threshold| (TransactionType::WalletAdmin, CalldataParams::ChangeThreshold { threshold }))
            .unwrap_or_else(|| unknown(TransactionType::WalletAdmin, data_hex)),
        SELECTOR_ENABLE_MODULE => decode_single_address(args)
            .map(|module| (TransactionType::ModuleConfig, CalldataParams::EnableModule { module }))
            .unwrap_or_else(|| unknown(TransactionType::ModuleConfig, data_hex)),
        SELECTOR_DISABLE_MODULE => decode_single_address(args)
            .map(|module| (TransactionType::ModuleConfig, CalldataParams::DisableModule { module }))
            .unwrap_or_else(|| unknown(TransactionType::ModuleConfig, data_hex)),
        SELECTOR_SETUP_RECOVERY => decode_setup_recovery(args)
            .map(|p| (TransactionType::RecoverySetup, p))
            .unwrap_or_else(|| unknown(TransactionType::RecoverySetup, data_hex)),
        _ if to_is_module => (
            TransactionType::ModuleConfig,
            CalldataParams::ModuleConfig { raw_data: data_hex.to_string() },
        ),
        _ => (
            TransactionType::ExternalCall,
            CalldataParams::ExternalCall { raw_data: data_hex.to_string() },
        ),
    }
}

fn unknown(ty: TransactionType, data_hex: &str) -> (TransactionType, CalldataParams) {
    (ty, CalldataParams::Unknown { raw_data: data_hex.to_string() })
}

fn strip_hex(s: &str) -> Option<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Some(Vec::new());
    }
    hex::decode(s).ok()
}

fn decode_single_address(args: &[u8]) -> Option<String> {
    if args.len() < 32 {
        return None;
    }
    Some(format!("0x{}", hex::encode(&args[12..32])))
}

fn decode_single_uint(args: &[u8]) -> Option<String> {
    if args.len() < 32 {
        return None;
    }
    Some(alloy::primitives::U256::from_be_slice(&args[..32]).to_string())
}

fn decode_setup_recovery(args: &[u8]) -> Option<CalldataParams> {
    // setupRecovery(address[] guardians, uint256 threshold, uint256 recoveryPeriod)
    if args.len() < 96 {
        return None;
    }
    let guardians_offset = alloy::primitives::U256::from_be_slice(&args[0..32]).to::<usize>();
    let threshold = alloy::primitives::U256::from_be_slice(&args[32..64]).to_string();
    let recovery_period = alloy::primitives::U256::from_be_slice(&args[64..96]).to_string();
    let guardians = decode_address_array(args, guardians_offset).ok()?;

    Some(CalldataParams::SetupRecovery { guardians, threshold, recovery_period })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_calldata_is_a_transfer() {
        let (ty, params) = classify_calldata("0x", false);
        assert_eq!(ty, TransactionType::Transfer);
        assert!(matches!(params, CalldataParams::Transfer));
    }

    #[test]
    fn recognized_selector_is_wallet_admin() {
        let mut word = vec![0u8; 12];
        word.extend_from_slice(&[0xaa; 20]);
        let data = format!("0x7065cb48{}", hex::encode(word));
        let (ty, params) = classify_calldata(&data, false);
        assert_eq!(ty, TransactionType::WalletAdmin);
        match params {
            CalldataParams::AddOwner { owner } => assert_eq!(owner, format!("0x{}", "aa".repeat(20))),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unrecognized_selector_against_module_is_module_config() {
        let data = "0xdeadbeef0000000000000000000000000000000000000000000000000000000000000001";
        let (ty, _) = classify_calldata(data, true);
        assert_eq!(ty, TransactionType::ModuleConfig);
    }

    #[test]
    fn unrecognized_selector_against_non_module_is_external_call() {
        let data = "0xdeadbeef0000000000000000000000000000000000000000000000000000000000000001";
        let (ty, _) = classify_calldata(data, false);
        assert_eq!(ty, TransactionType::ExternalCall);
    }

    #[test]
    fn truncated_args_keep_the_selectors_type_but_degrade_params() {
        let (ty, params) = classify_calldata("0x7065cb48ab", false);
        assert_eq!(ty, TransactionType::WalletAdmin);
        match params {
            CalldataParams::Unknown { raw_data } => assert_eq!(raw_data, "0x7065cb48ab"),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn fully_malformed_calldata_is_unknown_not_a_panic() {
        let (ty, _) = classify_calldata("0xzz", false);
        assert_eq!(ty, TransactionType::Unknown);
    }
}
