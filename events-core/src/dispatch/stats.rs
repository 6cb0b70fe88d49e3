use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free delivery counters shared by every `notify` call.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    notifications: AtomicU64,

    /// Notifications whose name had no handlers.
    unrouted: AtomicU64,

    invocations: AtomicU64,
    failures: AtomicU64,
    slow_invocations: AtomicU64,
}

/// Point-in-time copy of [`DispatcherStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub notifications: u64,
    pub unrouted: u64,
    pub invocations: u64,
    pub failures: u64,
    pub slow_invocations: u64,
}

impl DispatcherStats {
    #[inline]
    pub(crate) fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_unrouted(&self) {
        self.unrouted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_slow(&self) {
        self.slow_invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            notifications: self.notifications.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            slow_invocations: self.slow_invocations.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.notifications,
            &self.unrouted,
            &self.invocations,
            &self.failures,
            &self.slow_invocations,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
