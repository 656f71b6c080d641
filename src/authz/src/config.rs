//! Engine configuration loading and validation

use crate::ownership::{OwnershipAnalyzer, OwnershipOptions};
use crate::repository::AccessRepository;
use crate::resolver::{AccessResolver, ResolverConfig};
use crate::types::PermissionLevel;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Complete engine configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthzConfig {
    #[serde(default)]
    pub resolver: ResolverSection,

    #[serde(default)]
    pub ownership: OwnershipSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverSection {
    /// Bound each repository call by `repository_timeout_ms`
    #[serde(default = "default_true")]
    pub enforce_timeout: bool,
    #[serde(default = "default_repository_timeout")]
    pub repository_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OwnershipSection {
    #[serde(default = "default_minimum_recipient_level")]
    pub minimum_recipient_permission_level: PermissionLevel,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            enforce_timeout: true,
            repository_timeout_ms: default_repository_timeout(),
            enable_metrics: true,
        }
    }
}

impl Default for OwnershipSection {
    fn default() -> Self {
        Self {
            minimum_recipient_permission_level: default_minimum_recipient_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_repository_timeout() -> u64 {
    5000
}

fn default_minimum_recipient_level() -> PermissionLevel {
    PermissionLevel::Read
}

impl AuthzConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AuthzConfig =
            toml::from_str(contents).context("Failed to parse configuration file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.resolver.enforce_timeout && self.resolver.repository_timeout_ms == 0 {
            anyhow::bail!("Repository timeout must be greater than zero");
        }

        if self.ownership.minimum_recipient_permission_level == PermissionLevel::Unspecified {
            anyhow::bail!("Minimum recipient permission level must be specified");
        }

        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            repository_timeout: self
                .resolver
                .enforce_timeout
                .then(|| Duration::from_millis(self.resolver.repository_timeout_ms)),
            enable_metrics: self.resolver.enable_metrics,
        }
    }

    pub fn ownership_options(&self) -> OwnershipOptions {
        OwnershipOptions::new()
            .with_minimum_recipient_permission_level(
                self.ownership.minimum_recipient_permission_level,
            )
    }

    /// Build a resolver over `repo` with this configuration
    pub fn build_resolver(&self, repo: Arc<dyn AccessRepository>) -> AccessResolver {
        AccessResolver::with_config(repo, self.resolver_config())
    }

    /// Build an analyzer whose default options come from this configuration
    pub fn build_analyzer(&self, resolver: Arc<AccessResolver>) -> OwnershipAnalyzer {
        OwnershipAnalyzer::with_defaults(resolver, self.ownership_options())
    }
}
