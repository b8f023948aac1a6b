pub mod cache;
pub mod client;
pub mod ratelimit;

pub use client::{retry_rpc, RetryPolicy, RpcClient};
