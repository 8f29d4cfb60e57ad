//! Per-tag mutual exclusion.
//!
//! Two alerts for the same tag must not interleave between resolving the
//! record and submitting against it. Locks are created on demand and
//! dropped from the registry once no guard or waiter holds them.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::shared::CorrelationTag;

/// Registry of tag locks.
#[derive(Debug, Default)]
pub struct TagLocks {
    locks: Mutex<HashMap<CorrelationTag, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one resolve-and-submit step.
#[derive(Debug)]
pub struct TagGuard {
    tag: CorrelationTag,
    _guard: OwnedMutexGuard<()>,
}

impl TagGuard {
    /// Tag this guard protects.
    #[must_use]
    pub const fn tag(&self) -> &CorrelationTag {
        &self.tag
    }
}

impl TagLocks {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `tag`.
    pub async fn acquire(&self, tag: &CorrelationTag) -> TagGuard {
        let lock = {
            let mut locks = self.locks.lock();
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(tag.clone()).or_default())
        };

        TagGuard {
            tag: tag.clone(),
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of tags currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// True when no tag is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
