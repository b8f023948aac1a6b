use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(rename = "currentBlock")]
    pub current_block: u64,
    #[serde(rename = "lastIndexedBlock")]
    pub last_indexed_block: u64,
    #[serde(rename = "blocksBehind")]
    pub blocks_behind: u64,
    #[serde(rename = "isSyncing")]
    pub is_syncing: bool,
    #[serde(rename = "trackedWallets")]
    pub tracked_wallets: usize,
    #[serde(rename = "rpcOk")]
    pub rpc_ok: bool,
    #[serde(rename = "storeOk")]
    pub store_ok: bool,
}
