//! Resource access resolution
//!
//! Computes the effective [`Grant`] a caller holds on one resource by walking
//! up to three paths, gated by the resource's visibility:
//!
//! ```text
//! standard grant ──► delegated circle grant ──► delegated user grant ──► PUBLIC floor
//!   (any)              min(circle grant,          min(grant, READ)        (visibility
//!                          membership)                                    == PUBLIC)
//! ```
//!
//! A later path only replaces the current result when its effective level is
//! strictly higher. Every call re-reads storage; nothing is cached.

mod kind;

pub use kind::ResourceKind;

use crate::access::{
    Access, AnyAccess, CalendarAccess, CalendarId, CircleAccess, CircleId, Grant, ListAccess,
    ListId, Principal, RecipeAccess, RecipeId, ResourceId, UserAccess, UserId,
};
use crate::error::{AuthzError, OptionalExt, Result};
use crate::metrics::{MetricsSnapshot, ResolverMetrics};
use crate::repository::AccessRepository;
use crate::types::{AccessPath, AccessState, AuthAccount, PermissionLevel, VisibilityLevel};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Per-call resolution options. The default is the strictest setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Stored visibility of the resource, gates which paths are consulted
    pub resource_visibility: VisibilityLevel,

    /// Resolution fails with `PermissionDenied` below this level
    pub minimum_permission: PermissionLevel,

    /// Let grants that are not yet accepted contribute
    pub allow_pending: bool,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visibility(mut self, visibility: VisibilityLevel) -> Self {
        self.resource_visibility = visibility;
        self
    }

    pub fn with_minimum_permission(mut self, level: PermissionLevel) -> Self {
        self.minimum_permission = level;
        self
    }

    pub fn allowing_pending(mut self) -> Self {
        self.allow_pending = true;
        self
    }

    fn admits_state(&self, state: AccessState) -> bool {
        self.allow_pending || state == AccessState::Accepted
    }
}

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on every repository call, `None` waits indefinitely
    pub repository_timeout: Option<Duration>,

    /// Collect resolution counters
    pub enable_metrics: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            repository_timeout: Some(Duration::from_secs(5)),
            enable_metrics: true,
        }
    }
}

/// Computes a caller's effective access to a resource
pub struct AccessResolver {
    repo: Arc<dyn AccessRepository>,
    config: ResolverConfig,
    metrics: Option<Arc<ResolverMetrics>>,
}

impl AccessResolver {
    pub fn new(repo: Arc<dyn AccessRepository>) -> Self {
        Self::with_config(repo, ResolverConfig::default())
    }

    pub fn with_config(repo: Arc<dyn AccessRepository>, config: ResolverConfig) -> Self {
        let metrics = config
            .enable_metrics
            .then(|| Arc::new(ResolverMetrics::new()));

        Self {
            repo,
            config,
            metrics,
        }
    }

    pub fn repository(&self) -> &Arc<dyn AccessRepository> {
        &self.repo
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Current counters, `None` when metrics are disabled
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.metrics.as_ref().map(|m| m.snapshot())
    }

    /// Resolve access to a resource of any kind
    pub async fn resolve(
        &self,
        account: &AuthAccount,
        id: ResourceId,
        options: ResolveOptions,
    ) -> Result<AnyAccess> {
        match id {
            ResourceId::Calendar(id) => self.resolve_any(account, id, options).await,
            ResourceId::Circle(id) => self.resolve_any(account, id, options).await,
            ResourceId::Recipe(id) => self.resolve_any(account, id, options).await,
            ResourceId::List(id) => self.resolve_any(account, id, options).await,
            ResourceId::User(id) => self.resolve_any(account, id, options).await,
        }
    }

    async fn resolve_any<K: ResourceKind>(
        &self,
        account: &AuthAccount,
        id: K,
        options: ResolveOptions,
    ) -> Result<AnyAccess> {
        self.resolve_as(account, id, options).await.map(K::into_any)
    }

    /// Resolve access to a resource whose kind is known at compile time.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a zero caller or resource id
    /// - `PermissionDenied("permission level too low")` when the effective
    ///   level is below `options.minimum_permission`
    /// - `PermissionDenied("no access")` when no path grants anything
    /// - `Internal` when a repository lookup fails for a reason other than
    ///   "not found"
    pub async fn resolve_as<K: ResourceKind>(
        &self,
        account: &AuthAccount,
        id: K,
        options: ResolveOptions,
    ) -> Result<Grant<K>> {
        if !account.auth_user_id.is_valid() {
            warn!(resource = %id, "auth user is required to resolve access");
            return Err(AuthzError::invalid_argument("auth user is required"));
        }
        if id.raw_id() == 0 {
            let kind = K::RESOURCE_TYPE;
            warn!(kind = %kind, "resource id is required to resolve access");
            return Err(AuthzError::invalid_argument("resource id is required"));
        }

        self.record(|m| m.record_resolution());

        let visibility = options.resource_visibility;
        let mut resolved: Option<Grant<K>> = None;
        let mut settled_by: Option<AccessPath> = None;

        if visibility.admits(AccessPath::Standard) {
            let standard = match id.self_access(account) {
                Some(access) => Some(access),
                None => {
                    self.lookup(
                        AccessPath::Standard,
                        id,
                        id.find_standard_user_access(self.repo.as_ref(), account),
                    )
                    .await?
                }
            };

            if let Some(access) = standard {
                if access.permission_level > PermissionLevel::Public
                    && options.admits_state(access.state)
                {
                    resolved = Some(access);
                    settled_by = Some(AccessPath::Standard);
                }
            }
        }

        if visibility.admits(AccessPath::DelegatedCircle)
            && K::has_path(AccessPath::DelegatedCircle)
        {
            let found = self
                .lookup(
                    AccessPath::DelegatedCircle,
                    id,
                    id.find_delegated_circle_access(self.repo.as_ref(), account),
                )
                .await?;

            if let Some((access, membership)) = found {
                let effective = access.permission_level.min(membership.permission_level);
                if effective > level_of(&resolved) && options.admits_state(access.state) {
                    resolved = Some(access.with_permission_level(effective));
                    settled_by = Some(AccessPath::DelegatedCircle);
                }
            }
        }

        if visibility.admits(AccessPath::DelegatedUser)
            && K::has_path(AccessPath::DelegatedUser)
        {
            let found = self
                .lookup(
                    AccessPath::DelegatedUser,
                    id,
                    id.find_delegated_user_access(self.repo.as_ref(), account),
                )
                .await?;

            // Delegation between users never conveys more than READ.
            if let Some((access, _delegation)) = found {
                let effective = access.permission_level.min(PermissionLevel::Read);
                if effective > level_of(&resolved) && options.admits_state(access.state) {
                    resolved = Some(access.with_permission_level(effective));
                    settled_by = Some(AccessPath::DelegatedUser);
                }
            }
        }

        if visibility == VisibilityLevel::Public && resolved.is_none() {
            resolved = Some(
                Grant::new(id, account.auth_user_id, PermissionLevel::Public)
                    .with_requester(account.auth_user_id),
            );
            self.record(|m| m.record_public_fallback());
        }

        let level = level_of(&resolved);
        debug!(
            resource = %id,
            auth_user = %account.auth_user_id,
            visibility = %visibility,
            level = %level,
            "resolved resource access"
        );

        if level < options.minimum_permission {
            return Err(self.deny(id, account, "permission level too low"));
        }
        let Some(access) = resolved else {
            return Err(self.deny(id, account, "no access"));
        };

        if let Some(path) = settled_by {
            self.record(|m| m.record_grant(path));
        }
        Ok(access)
    }

    pub async fn resolve_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
        options: ResolveOptions,
    ) -> Result<CalendarAccess> {
        self.resolve_as(account, id, options).await
    }

    pub async fn resolve_circle_access(
        &self,
        account: &AuthAccount,
        id: CircleId,
        options: ResolveOptions,
    ) -> Result<CircleAccess> {
        self.resolve_as(account, id, options).await
    }

    pub async fn resolve_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
        options: ResolveOptions,
    ) -> Result<RecipeAccess> {
        self.resolve_as(account, id, options).await
    }

    pub async fn resolve_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
        options: ResolveOptions,
    ) -> Result<ListAccess> {
        self.resolve_as(account, id, options).await
    }

    pub async fn resolve_user_access(
        &self,
        account: &AuthAccount,
        id: UserId,
        options: ResolveOptions,
    ) -> Result<UserAccess> {
        self.resolve_as(account, id, options).await
    }

    /// Stored visibility of a resource, bounded by the repository timeout.
    ///
    /// A missing resource surfaces as `NotFound`.
    pub async fn resource_visibility<K: ResourceKind>(
        &self,
        account: &AuthAccount,
        id: K,
    ) -> Result<VisibilityLevel> {
        match self.bounded(id.visibility(self.repo.as_ref(), account)).await {
            Ok(visibility) => Ok(visibility),
            Err(err) if err.is_not_found() => Err(err),
            Err(err) => {
                error!(resource = %id, error = %err, "unable to load resource visibility");
                self.record(|m| m.record_repository_error());
                Err(AuthzError::internal("unable to load resource"))
            }
        }
    }

    /// Scope `account` to act as a circle or another user.
    ///
    /// Returns a copy with the acting circle or user set and the caller's
    /// resolved permission and visibility on that party recorded in the
    /// output fields. The caller must hold at least PUBLIC access.
    pub async fn scope_account(
        &self,
        account: &AuthAccount,
        scope: Principal,
    ) -> Result<AuthAccount> {
        let mut scoped = *account;

        match scope {
            Principal::Circle(circle_id) => {
                scoped.circle_id = Some(circle_id);
                let visibility = self.resource_visibility(&scoped, circle_id).await?;
                let access = self
                    .resolve_as(
                        &scoped,
                        circle_id,
                        ResolveOptions::new()
                            .with_visibility(visibility)
                            .with_minimum_permission(PermissionLevel::Public),
                    )
                    .await?;
                scoped.visibility_level = visibility;
                scoped.permission_level = access.permission_level;
            }
            Principal::User(user_id) => {
                scoped.user_id = Some(user_id);
                let access = self
                    .resolve_as(
                        &scoped,
                        user_id,
                        ResolveOptions::new()
                            .with_visibility(VisibilityLevel::Public)
                            .with_minimum_permission(PermissionLevel::Public),
                    )
                    .await?;
                scoped.visibility_level = VisibilityLevel::Public;
                scoped.permission_level = access.permission_level;
            }
        }

        Ok(scoped)
    }

    /// Run one finder, folding "not found" into `None`
    async fn lookup<K, T, F>(&self, path: AccessPath, id: K, pending: F) -> Result<Option<T>>
    where
        K: ResourceKind,
        F: Future<Output = Result<T>> + Send,
    {
        match self.bounded(pending).await.optional() {
            Ok(found) => Ok(found),
            Err(err) => {
                error!(resource = %id, path = %path, error = %err, "error finding resource access");
                self.record(|m| m.record_repository_error());
                Err(AuthzError::internal("unable to determine resource access"))
            }
        }
    }

    async fn bounded<T, F>(&self, pending: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        match self.config.repository_timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.unwrap_or_else(|_| {
                Err(AuthzError::internal(format!(
                    "repository call timed out after {:?}",
                    limit
                )))
            }),
            None => pending.await,
        }
    }

    fn deny<K: ResourceKind>(&self, id: K, account: &AuthAccount, reason: &str) -> AuthzError {
        warn!(resource = %id, auth_user = %account.auth_user_id, reason, "resource access denied");
        self.record(|m| m.record_denial());
        AuthzError::permission_denied(reason)
    }

    fn record(&self, f: impl FnOnce(&ResolverMetrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}

fn level_of<K>(access: &Option<Grant<K>>) -> PermissionLevel {
    access
        .as_ref()
        .map_or(PermissionLevel::Unspecified, |a| a.permission_level)
}
