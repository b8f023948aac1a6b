use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Single-writer (the scanner task), any-reader (the health probe)
/// snapshot of pipeline state. Nothing here is mutated from more than
/// one task, so relaxed ordering is enough.
pub struct ScannerStatus {
    running: AtomicBool,
    syncing: AtomicBool,
    tracked_count: Arc<AtomicUsize>,
}

impl ScannerStatus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            running: AtomicBool::new(false),
            syncing: AtomicBool::new(false),
            tracked_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn tracked_counter(&self) -> Arc<AtomicUsize> {
        self.tracked_count.clone()
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    pub fn set_syncing(&self, syncing: bool) {
        self.syncing.store(syncing, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Relaxed)
    }

    pub fn tracked_wallets(&self) -> usize {
        self.tracked_count.load(Ordering::Relaxed)
    }
}
