use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use alloy::eips::BlockId;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log};

use crate::error::RpcError;
use crate::rpc::cache::TimestampCache;
use crate::rpc::ratelimit::RateLimiter;

/// Bounded-retry policy: base delay, multiplier, ceiling, attempt count.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub ceiling: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            multiplier: 2,
            ceiling: Duration::from_secs(30),
        }
    }
}

/// Typed chain RPC client: rate-limited, retried, with a private block
/// timestamp cache. One instance is constructed at startup and shared by
/// the scanner and the health probe.
pub struct RpcClient {
    provider: DynProvider,
    limiter: RateLimiter,
    retry: RetryPolicy,
    timestamps: TimestampCache,
}

impl RpcClient {
    pub fn new(
        rpc_url: &str,
        rate_limit_requests: u32,
        rate_limit_window_ms: u64,
        timestamp_cache_size: usize,
    ) -> eyre::Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|e| eyre::eyre!("invalid RPC URL '{}': {}", rpc_url, e))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            provider,
            limiter: RateLimiter::new(
                rate_limit_requests as usize,
                Duration::from_millis(rate_limit_window_ms),
            ),
            retry: RetryPolicy::default(),
            timestamps: TimestampCache::new(timestamp_cache_size),
        })
    }

    /// Current chain tip.
    pub async fn block_number(&self) -> Result<u64, RpcError> {
        self.with_retry(|| async { self.provider.get_block_number().await }).await
    }

    /// Fetch logs for one or more addresses, filtered to a set of topic0
    /// values, over an inclusive block range. Addresses are lowercased
    /// before being handed to the transport because some providers filter
    /// case-sensitively.
    pub async fn get_logs(
        &self,
        addresses: &[Address],
        topics: &[B256],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError> {
        let lowered: Vec<Address> = addresses
            .iter()
            .map(|a| Address::from_str(&a.to_string().to_lowercase()).unwrap_or(*a))
            .collect();

        let mut filter = Filter::new()
            .from_block(from_block)
            .to_block(to_block)
            .address(lowered);

        if !topics.is_empty() {
            filter = filter.event_signature(topics.to_vec());
        }

        self.with_retry(|| async { self.provider.get_logs(&filter).await })
            .await
    }

    /// Read-only contract call, optionally pinned to a historical block
    /// height (used to resolve the `WalletRegistered` consistency window,
    /// see DESIGN.md).
    pub async fn call(
        &self,
        to: Address,
        calldata: Bytes,
        at_block: Option<u64>,
    ) -> Result<Bytes, RpcError> {
        self.with_retry(|| async {
            let tx = alloy::rpc::types::TransactionRequest::default()
                .to(to)
                .input(calldata.clone().into());
            let mut call = self.provider.call(tx);
            if let Some(block) = at_block {
                call = call.block(BlockId::from(block));
            }
            call.await
        })
        .await
    }

    /// Block timestamp, served from the LRU cache on hit.
    pub async fn block_timestamp(&self, block_number: u64) -> Result<u64, RpcError> {
        if let Some(ts) = self.timestamps.get(block_number) {
            return Ok(ts);
        }

        let block = self
            .with_retry(|| async {
                self.provider
                    .get_block_by_number(BlockNumberOrTag::Number(block_number))
                    .await
            })
            .await?;

        let block = block.ok_or(RpcError::MissingTimestamp(block_number))?;
        let ts = block.header.timestamp;
        self.timestamps.insert(block_number, ts);
        Ok(ts)
    }

    async fn with_retry<F, Fut, T, E>(&self, mut f: F) -> Result<T, RpcError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.limiter.acquire().await;

        let mut delay = self.retry.base_delay;
        let mut last_err = String::new();

        for attempt in 0..self.retry.max_attempts {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    last_err = e.to_string();
                    if attempt + 1 < self.retry.max_attempts {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_attempts = self.retry.max_attempts,
                            error = %last_err,
                            delay_ms = delay.as_millis() as u64,
                            "RPC call failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        delay = std::cmp::min(delay * self.retry.multiplier, self.retry.ceiling);
                        self.limiter.acquire().await;
                    }
                }
            }
        }

        Err(RpcError::Transport(format!(
            "RPC call failed after {} attempts: {}",
            self.retry.max_attempts, last_err
        )))
    }
}

/// Free-standing retry helper in the same shape as `RpcClient::with_retry`,
/// used by callers that need to retry a non-`RpcClient` future (e.g. the
/// standalone backfill entrypoint wrapping a raw provider call).
pub async fn retry_rpc<F, Fut, T, E>(policy: RetryPolicy, mut f: F) -> Result<T, RpcError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = policy.base_delay;
    let mut last_err = String::new();

    for attempt in 0..policy.max_attempts {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                last_err = e.to_string();
                if attempt + 1 < policy.max_attempts {
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * policy.multiplier, policy.ceiling);
                }
            }
        }
    }

    Err(RpcError::Transport(format!(
        "RPC call failed after {} attempts: {}",
        policy.max_attempts, last_err
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retry_rpc_returns_value_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1),
            multiplier: 2,
            ceiling: Duration::from_millis(10),
        };

        let result: Result<u32, RpcError> = retry_rpc(policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("transient".to_string())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_rpc_surfaces_last_error_after_budget_exhausted() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            multiplier: 2,
            ceiling: Duration::from_millis(10),
        };

        let result: Result<u32, RpcError> =
            retry_rpc(policy, || async { Err::<u32, _>("always fails") }).await;

        assert!(result.is_err());
    }
}
