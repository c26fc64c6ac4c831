//! Loading and pending flags with scoped release.

use ccd_dex_domain::keys::{PoolKey, SharesKey};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// What a read pipeline is loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoadingKey {
    Pool(PoolKey),
    Shares(SharesKey),
}

/// Per-key count of running read pipelines.
///
/// A key reads as loading while its count is above zero, so overlapping
/// pipelines for the same key keep the flag set until the last one ends.
#[derive(Debug, Default)]
pub(crate) struct LoadingRegistry {
    counts: Mutex<HashMap<LoadingKey, usize>>,
}

impl LoadingRegistry {
    pub(crate) fn begin(&self, key: LoadingKey) -> LoadingGuard<'_> {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        *counts.entry(key.clone()).or_insert(0) += 1;
        LoadingGuard {
            registry: self,
            key,
        }
    }

    pub(crate) fn is_loading(&self, key: &LoadingKey) -> bool {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn end(&self, key: &LoadingKey) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = counts.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                counts.remove(key);
            }
        }
    }
}

/// Clears one loading registration on drop.
pub(crate) struct LoadingGuard<'a> {
    registry: &'a LoadingRegistry,
    key: LoadingKey,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.registry.end(&self.key);
    }
}

/// The single in-flight transaction slot.
#[derive(Debug, Default)]
pub(crate) struct PendingSlot {
    pending: AtomicBool,
}

impl PendingSlot {
    /// Claims the slot, or returns `None` if a transaction is already pending.
    pub(crate) fn try_claim(&self) -> Option<PendingGuard<'_>> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard { slot: self })
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Releases the pending slot on drop.
pub(crate) struct PendingGuard<'a> {
    slot: &'a PendingSlot,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.slot.pending.store(false, Ordering::Release);
    }
}
