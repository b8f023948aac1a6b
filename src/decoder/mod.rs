pub mod abi;
pub mod calldata;
pub mod events;

pub use calldata::{classify_calldata, CalldataParams, TransactionType};
pub use events::{
    daily_limit_topics, decode_event, factory_topics, recovery_topics, wallet_topics,
    whitelist_topics, DecodedEvent, LogMeta,
};
