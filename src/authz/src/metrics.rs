//! Resolution counters for observability

use crate::types::AccessPath;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the resolver counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total resolutions attempted
    pub resolutions: u64,

    /// Resolutions that ended in `PermissionDenied`
    pub denials: u64,

    /// Repository failures other than "not found"
    pub repository_errors: u64,

    /// Resolutions settled by each path
    pub standard_grants: u64,
    pub circle_grants: u64,
    pub user_grants: u64,
    pub public_fallbacks: u64,
}

impl MetricsSnapshot {
    /// Fraction of resolutions that were denied
    pub fn denial_rate(&self) -> f64 {
        if self.resolutions == 0 {
            0.0
        } else {
            self.denials as f64 / self.resolutions as f64
        }
    }
}

/// Lock-free counters shared by every resolution
#[derive(Debug, Default)]
pub struct ResolverMetrics {
    resolutions: AtomicU64,
    denials: AtomicU64,
    repository_errors: AtomicU64,
    standard_grants: AtomicU64,
    circle_grants: AtomicU64,
    user_grants: AtomicU64,
    public_fallbacks: AtomicU64,
}

impl ResolverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_resolution(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_denial(&self) {
        self.denials.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_repository_error(&self) {
        self.repository_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record which path produced the final grant
    pub fn record_grant(&self, path: AccessPath) {
        let counter = match path {
            AccessPath::Standard => &self.standard_grants,
            AccessPath::DelegatedCircle => &self.circle_grants,
            AccessPath::DelegatedUser => &self.user_grants,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_public_fallback(&self) {
        self.public_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            resolutions: self.resolutions.load(Ordering::Relaxed),
            denials: self.denials.load(Ordering::Relaxed),
            repository_errors: self.repository_errors.load(Ordering::Relaxed),
            standard_grants: self.standard_grants.load(Ordering::Relaxed),
            circle_grants: self.circle_grants.load(Ordering::Relaxed),
            user_grants: self.user_grants.load(Ordering::Relaxed),
            public_fallbacks: self.public_fallbacks.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in [
            &self.resolutions,
            &self.denials,
            &self.repository_errors,
            &self.standard_grants,
            &self.circle_grants,
            &self.user_grants,
            &self.public_fallbacks,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
