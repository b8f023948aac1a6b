use serde::Serialize;

/// Row shape of the singleton `indexer_checkpoint` table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Checkpoint {
    pub last_indexed_block: i64,
    pub is_syncing: bool,
}
