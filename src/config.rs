/// Service configuration, loaded entirely from the environment.
///
/// Required keys missing at startup are collected and reported together
/// (rather than failing on the first one) so an operator sees the whole
/// list in one log line.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub store_service_key: String,
    pub factory_address: String,
    pub wallet_implementation_address: String,

    pub rpc_url: String,
    pub rpc_ws_url: Option<String>,

    pub batch_size: u64,
    pub poll_interval_ms: u64,
    pub start_block: u64,
    pub confirmation_depth: u64,

    pub daily_limit_module_address: Option<String>,
    pub whitelist_module_address: Option<String>,
    pub social_recovery_module_address: Option<String>,

    pub log_level: String,
    pub log_to_file: bool,

    pub health_enabled: bool,
    pub health_port: u16,
    pub max_blocks_behind: u64,

    pub rate_limit_requests: u32,
    pub rate_limit_window_ms: u64,
    pub timestamp_cache_size: usize,

    pub store_schema: String,

    pub backfill_from: Option<u64>,
    pub backfill_to: Option<u64>,
}

fn default_batch_size() -> u64 {
    1000
}
fn default_poll_interval_ms() -> u64 {
    5000
}
fn default_confirmation_depth() -> u64 {
    2
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_health_port() -> u16 {
    3000
}
fn default_max_blocks_behind() -> u64 {
    100
}
fn default_rate_limit_requests() -> u32 {
    50
}
fn default_rate_limit_window_ms() -> u64 {
    1000
}
fn default_timestamp_cache_size() -> usize {
    1000
}
fn default_store_schema() -> String {
    "public".to_string()
}

/// Module addresses the scanner fetches logs from in addition to the
/// tracked-wallet set.
#[derive(Debug, Clone, Default)]
pub struct ModuleAddresses {
    pub daily_limit: Option<String>,
    pub whitelist: Option<String>,
    pub social_recovery: Option<String>,
}

impl Config {
    /// Load configuration from environment variables. Required keys that
    /// are absent are collected and reported as a single error listing
    /// all of them.
    pub fn from_env() -> eyre::Result<Self> {
        let mut missing = Vec::new();

        let store_url = require_env("STORE_URL", &mut missing);
        let store_service_key = require_env("STORE_SERVICE_KEY", &mut missing);
        let factory_address = require_env("FACTORY_ADDRESS", &mut missing);
        let wallet_implementation_address =
            require_env("WALLET_IMPLEMENTATION_ADDRESS", &mut missing);

        if !missing.is_empty() {
            return Err(eyre::eyre!(
                "missing required configuration keys: {}",
                missing.join(", ")
            ));
        }

        let config = Config {
            store_url: store_url.unwrap(),
            store_service_key: store_service_key.unwrap(),
            factory_address: factory_address.unwrap().to_lowercase(),
            wallet_implementation_address: wallet_implementation_address.unwrap().to_lowercase(),

            rpc_url: env_or("RPC_URL", "http://localhost:8545"),
            rpc_ws_url: std::env::var("RPC_WS_URL").ok(),

            batch_size: env_parse_or("BATCH_SIZE", default_batch_size()),
            poll_interval_ms: env_parse_or("POLL_INTERVAL_MS", default_poll_interval_ms()),
            start_block: env_parse_or("START_BLOCK", 0),
            confirmation_depth: env_parse_or("CONFIRMATION_DEPTH", default_confirmation_depth()),

            daily_limit_module_address: std::env::var("DAILY_LIMIT_MODULE_ADDRESS")
                .ok()
                .map(|s| s.to_lowercase()),
            whitelist_module_address: std::env::var("WHITELIST_MODULE_ADDRESS")
                .ok()
                .map(|s| s.to_lowercase()),
            social_recovery_module_address: std::env::var("SOCIAL_RECOVERY_MODULE_ADDRESS")
                .ok()
                .map(|s| s.to_lowercase()),

            log_level: env_or("LOG_LEVEL", &default_log_level()),
            log_to_file: env_parse_or("LOG_TO_FILE", false),

            health_enabled: env_parse_or("HEALTH_ENABLED", true),
            health_port: env_parse_or("HEALTH_PORT", default_health_port()),
            max_blocks_behind: env_parse_or("MAX_BLOCKS_BEHIND", default_max_blocks_behind()),

            rate_limit_requests: env_parse_or("RATE_LIMIT_REQUESTS", default_rate_limit_requests()),
            rate_limit_window_ms: env_parse_or(
                "RATE_LIMIT_WINDOW_MS",
                default_rate_limit_window_ms(),
            ),
            timestamp_cache_size: env_parse_or(
                "TIMESTAMP_CACHE_SIZE",
                default_timestamp_cache_size(),
            ),

            store_schema: env_or("STORE_SCHEMA", &default_store_schema()),

            backfill_from: std::env::var("BACKFILL_FROM").ok().and_then(|s| s.parse().ok()),
            backfill_to: std::env::var("BACKFILL_TO").ok().and_then(|s| s.parse().ok()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        if !is_address_shape(&self.factory_address) {
            return Err(eyre::eyre!(
                "FACTORY_ADDRESS '{}' is not a well-formed address",
                self.factory_address
            ));
        }
        if !is_address_shape(&self.wallet_implementation_address) {
            return Err(eyre::eyre!(
                "WALLET_IMPLEMENTATION_ADDRESS '{}' is not a well-formed address",
                self.wallet_implementation_address
            ));
        }
        Ok(())
    }

    pub fn module_addresses(&self) -> ModuleAddresses {
        ModuleAddresses {
            daily_limit: self.daily_limit_module_address.clone(),
            whitelist: self.whitelist_module_address.clone(),
            social_recovery: self.social_recovery_module_address.clone(),
        }
    }
}

fn is_address_shape(s: &str) -> bool {
    s.starts_with("0x") && s.len() == 42 && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn require_env(key: &str, missing: &mut Vec<String>) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(key.to_string());
            None
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_shape_validation() {
        assert!(is_address_shape(
            "0x1111111111111111111111111111111111111111"
        ));
        assert!(!is_address_shape("not-an-address"));
        assert!(!is_address_shape("0x123"));
        assert!(!is_address_shape(
            "1111111111111111111111111111111111111111"
        ));
    }

    #[test]
    fn env_parse_or_falls_back_on_bad_value() {
        std::env::set_var("MSI_TEST_BATCH_SIZE", "not-a-number");
        let v: u64 = env_parse_or("MSI_TEST_BATCH_SIZE", 42);
        assert_eq!(v, 42);
        std::env::remove_var("MSI_TEST_BATCH_SIZE");
    }

    #[test]
    fn env_parse_or_uses_set_value() {
        std::env::set_var("MSI_TEST_BATCH_SIZE_2", "777");
        let v: u64 = env_parse_or("MSI_TEST_BATCH_SIZE_2", 42);
        assert_eq!(v, 777);
        std::env::remove_var("MSI_TEST_BATCH_SIZE_2");
    }
}
