//! Common test utilities shared by the integration tests

#![allow(dead_code, unused_imports)]

pub mod stub;

use sharegate_authz::{
    AccessResolver, AccessStore, Grant, InMemoryAccessRepository, OwnershipAnalyzer, ResourceKind,
};
use std::sync::Arc;
use std::sync::Once;

pub use stub::{StubGrant, StubRepository, DELEGATING_CIRCLE, DELEGATING_USER};

static TRACING: Once = Once::new();

/// Install a test subscriber once; honors `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// In-memory repository plus the engine components built on it
pub struct Harness {
    pub repo: Arc<InMemoryAccessRepository>,
    pub resolver: Arc<AccessResolver>,
    pub analyzer: Arc<OwnershipAnalyzer>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let repo = Arc::new(InMemoryAccessRepository::new());
        let resolver = Arc::new(AccessResolver::new(repo.clone()));
        let analyzer = Arc::new(OwnershipAnalyzer::new(resolver.clone()));
        Self {
            repo,
            resolver,
            analyzer,
        }
    }

    /// Store `grant` and return it with its assigned id
    pub async fn grant<K>(&self, grant: Grant<K>) -> Grant<K>
    where
        K: ResourceKind,
        InMemoryAccessRepository: AccessStore<K>,
    {
        self.repo.create_access(grant).await.unwrap()
    }
}
