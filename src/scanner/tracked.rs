use std::collections::HashSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;

/// The in-memory projection of every wallet address ever discovered,
/// mutated only from the scanner's single pipeline task. The health
/// probe reads its size through the shared counter rather than touching
/// the set itself.
pub struct TrackedWallets {
    addresses: HashSet<String>,
    counter: Arc<AtomicUsize>,
}

impl TrackedWallets {
    pub fn new(counter: Arc<AtomicUsize>) -> Self {
        Self { addresses: HashSet::new(), counter }
    }

    /// Inserts a lowercase address, returning whether it was new.
    pub fn insert(&mut self, address: String) -> bool {
        let inserted = self.addresses.insert(address);
        if inserted {
            self.counter.store(self.addresses.len(), Ordering::Relaxed);
        }
        inserted
    }

    /// Replaces the whole set, used after a poll-loop gap reload.
    pub fn reload(&mut self, addresses: Vec<String>) {
        self.addresses = addresses.into_iter().collect();
        self.counter.store(self.addresses.len(), Ordering::Relaxed);
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Snapshot as parsed `Address`es for an RPC log filter. Entries that
    /// fail to parse are dropped rather than panicking — every member of
    /// this set is expected to already be a normalized address string.
    pub fn addresses(&self) -> Vec<Address> {
        self.addresses.iter().filter_map(|a| Address::from_str(a).ok()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent_and_tracks_count() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut tracked = TrackedWallets::new(counter.clone());
        assert!(tracked.insert("0xaaa0000000000000000000000000000000000a".to_string()));
        assert!(!tracked.insert("0xaaa0000000000000000000000000000000000a".to_string()));
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn reload_replaces_the_whole_set() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut tracked = TrackedWallets::new(counter.clone());
        tracked.insert("0xaaa0000000000000000000000000000000000a".to_string());
        tracked.reload(vec!["0xbbb0000000000000000000000000000000000b".to_string()]);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        assert!(!tracked.addresses.contains("0xaaa0000000000000000000000000000000000a"));
    }
}
