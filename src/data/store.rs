//! Shared, read-only snapshot handle with a background refresh lifecycle.
//!
//! Requests call `current()` once and keep the returned `Arc` for their whole
//! duration; a refresh swaps in a new snapshot without disturbing them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::data::raw::RawSnapshot;
use crate::data::source::SnapshotSource;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<RawSnapshot>>>,
    generation: Arc<AtomicU64>,
}

impl SnapshotStore {
    pub fn new(snapshot: RawSnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetch an initial snapshot from `source`.
    pub fn load(source: &dyn SnapshotSource) -> Result<Self, AppError> {
        Ok(Self::new(source.fetch()?))
    }

    /// The snapshot in effect right now.
    pub fn current(&self) -> Arc<RawSnapshot> {
        // A poisoned lock still holds a complete snapshot (swaps are a single assignment).
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Number of successful swaps since creation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn replace(&self, snapshot: RawSnapshot) {
        let next = Arc::new(snapshot);
        {
            let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
            *guard = next;
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Fetch from `source` and swap on success; on failure the old snapshot stays.
    pub fn refresh(&self, source: &dyn SnapshotSource) -> Result<(), AppError> {
        let snapshot = source.fetch()?;
        self.replace(snapshot);
        Ok(())
    }

    /// Refresh from `source` every `interval` on a background thread.
    pub fn spawn_refresh<S>(&self, source: S, interval: Duration) -> RefreshHandle
    where
        S: SnapshotSource + Send + 'static,
    {
        let store = self.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            info!(source = %source.describe(), interval_secs = interval.as_secs_f64(), "snapshot refresh started");
            loop {
                let deadline = Instant::now() + interval;
                loop {
                    if stop_flag.load(Ordering::Acquire) {
                        info!("snapshot refresh stopped");
                        return;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    thread::park_timeout(deadline - now);
                }

                match store.refresh(&source) {
                    Ok(()) => info!(generation = store.generation(), "snapshot refreshed"),
                    Err(err) => warn!(error = %err, "snapshot refresh failed; keeping previous snapshot"),
                }
            }
        });

        RefreshHandle {
            stop,
            thread: Some(thread),
        }
    }
}

/// Stops the refresh thread when dropped.
#[derive(Debug)]
pub struct RefreshHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            let _ = thread.join();
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl SnapshotSource for CountingSource {
        fn fetch(&self) -> Result<RawSnapshot, AppError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(AppError::new(4, "offline"));
            }
            Ok(RawSnapshot::empty(format!("fetch {n}")))
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn readers_keep_their_snapshot_across_a_swap() {
        let store = SnapshotStore::new(RawSnapshot::empty("first"));
        let held = store.current();
        store.replace(RawSnapshot::empty("second"));
        assert_eq!(held.origin, "first");
        assert_eq!(store.current().origin, "second");
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let store = SnapshotStore::new(RawSnapshot::empty("first"));
        let source = CountingSource {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        };
        assert!(store.refresh(&source).is_err());
        assert_eq!(store.current().origin, "first");
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn background_refresh_swaps_and_stops() {
        let store = SnapshotStore::new(RawSnapshot::empty("initial"));
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            calls: Arc::clone(&calls),
            fail: false,
        };

        let handle = store.spawn_refresh(source, Duration::from_millis(10));
        assert!(wait_until(|| store.generation() >= 2));
        handle.stop();

        let after_stop = calls.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
        assert!(store.current().origin.starts_with("fetch "));
    }
}
