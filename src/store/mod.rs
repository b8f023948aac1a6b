pub mod gateway;
pub mod types;
pub mod validation;

pub use gateway::Gateway;
pub use types::Checkpoint;
pub use validation::{normalize_address, normalize_hash, normalize_uint256};
