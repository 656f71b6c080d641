//! Grant ownership analysis
//!
//! Before a grant is created or accepted we need to know which side of it the
//! caller speaks for: the resource (caller administers the shared resource)
//! and/or the recipient (caller administers the receiving user or circle).
//! That decides whether the grant is born accepted or waits on the other side.

use crate::access::{Grant, Principal};
use crate::error::{AuthzError, Result};
use crate::resolver::{AccessResolver, ResolveOptions, ResourceKind};
use crate::types::{AcceptTarget, AccessState, AuthAccount, PermissionLevel, VisibilityLevel};

use std::sync::Arc;
use tracing::{debug, warn};

/// Knobs for one ownership analysis.
///
/// Omission precedence: forced omissions always apply. When
/// `allow_auto_omit_access_checks` is set and the grant is already stored,
/// a RECIPIENT accept target also omits the resource check and a RESOURCE
/// accept target also omits the recipient check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipOptions {
    /// Skip resolving the caller's access to the resource
    pub force_omit_resource_check: bool,

    /// Skip resolving the caller's access to the recipient
    pub force_omit_recipient_check: bool,

    /// Derive omissions from a stored grant's accept target
    pub allow_auto_omit_access_checks: bool,

    /// Minimum the caller must hold on the recipient for the analysis to proceed
    pub minimum_recipient_permission_level: PermissionLevel,
}

impl Default for OwnershipOptions {
    fn default() -> Self {
        Self {
            force_omit_resource_check: false,
            force_omit_recipient_check: false,
            allow_auto_omit_access_checks: false,
            minimum_recipient_permission_level: PermissionLevel::Read,
        }
    }
}

impl OwnershipOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force_omit_resource_check(mut self) -> Self {
        self.force_omit_resource_check = true;
        self
    }

    pub fn force_omit_recipient_check(mut self) -> Self {
        self.force_omit_recipient_check = true;
        self
    }

    pub fn allow_auto_omit_access_checks(mut self) -> Self {
        self.allow_auto_omit_access_checks = true;
        self
    }

    pub fn with_minimum_recipient_permission_level(mut self, level: PermissionLevel) -> Self {
        self.minimum_recipient_permission_level = level;
        self
    }

    /// Returns `(omit_resource, omit_recipient)` for `access`
    fn omitted_checks<K: ResourceKind>(&self, access: &Grant<K>) -> (bool, bool) {
        let mut omit_resource = self.force_omit_resource_check;
        let mut omit_recipient = self.force_omit_recipient_check;

        if self.allow_auto_omit_access_checks && access.is_persisted() {
            match access.accept_target {
                AcceptTarget::Recipient => omit_resource = true,
                AcceptTarget::Resource => omit_recipient = true,
                AcceptTarget::Unspecified => {}
            }
        }

        (omit_resource, omit_recipient)
    }
}

/// Outcome of an ownership analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipDetails {
    /// Caller holds ADMIN on the resource
    pub is_resource_owner: bool,

    /// Caller holds ADMIN on the recipient
    pub is_recipient_owner: bool,

    /// Highest level a grant on this resource may carry
    pub maximum_permission_level: PermissionLevel,

    pub accept_target: AcceptTarget,
    pub access_state: AccessState,
}

impl OwnershipDetails {
    /// Caller speaks for at least one side of the grant
    pub fn is_either_owner(&self) -> bool {
        self.is_resource_owner || self.is_recipient_owner
    }
}

/// Decides who owns each side of a grant
pub struct OwnershipAnalyzer {
    resolver: Arc<AccessResolver>,
    defaults: OwnershipOptions,
}

impl OwnershipAnalyzer {
    pub fn new(resolver: Arc<AccessResolver>) -> Self {
        Self::with_defaults(resolver, OwnershipOptions::default())
    }

    pub fn with_defaults(resolver: Arc<AccessResolver>, defaults: OwnershipOptions) -> Self {
        Self { resolver, defaults }
    }

    pub fn resolver(&self) -> &Arc<AccessResolver> {
        &self.resolver
    }

    /// Options applied by [`analyze`](Self::analyze)
    pub fn defaults(&self) -> OwnershipOptions {
        self.defaults
    }

    pub async fn analyze<K: ResourceKind>(
        &self,
        account: &AuthAccount,
        access: &Grant<K>,
    ) -> Result<OwnershipDetails> {
        self.analyze_with(account, access, self.defaults).await
    }

    /// Analyze `access` on behalf of `account`.
    ///
    /// For a stored grant the accept target and state pass through. For a new
    /// grant they are derived from which sides the caller owns:
    ///
    /// | resource owner | recipient owner | state    | target      |
    /// |----------------|-----------------|----------|-------------|
    /// | no             | yes             | PENDING  | RESOURCE    |
    /// | yes            | no              | PENDING  | RECIPIENT   |
    /// | yes            | yes             | ACCEPTED | UNSPECIFIED |
    /// | no             | no              | `Internal` error       ||
    pub async fn analyze_with<K: ResourceKind>(
        &self,
        account: &AuthAccount,
        access: &Grant<K>,
        options: OwnershipOptions,
    ) -> Result<OwnershipDetails> {
        if !access.recipient.is_valid() {
            warn!(
                resource = %access.resource,
                "recipient is required to analyze grant ownership"
            );
            return Err(AuthzError::invalid_argument("recipient is required"));
        }

        let (omit_resource, omit_recipient) = options.omitted_checks(access);

        let mut details = OwnershipDetails {
            is_resource_owner: false,
            is_recipient_owner: false,
            maximum_permission_level: PermissionLevel::Read,
            accept_target: access.accept_target,
            access_state: access.state,
        };

        if !omit_recipient {
            let level = self
                .recipient_level(
                    account,
                    access.recipient,
                    options.minimum_recipient_permission_level,
                )
                .await?;
            details.is_recipient_owner = level >= PermissionLevel::Admin;
        }

        if !omit_resource {
            let visibility = self
                .resolver
                .resource_visibility(account, access.resource)
                .await?;
            let resource_access = self
                .resolver
                .resolve_as(
                    account,
                    access.resource,
                    ResolveOptions::new()
                        .with_visibility(visibility)
                        .with_minimum_permission(PermissionLevel::Public),
                )
                .await?;

            details.is_resource_owner = resource_access.permission_level >= PermissionLevel::Admin;
            details.maximum_permission_level =
                resource_access.permission_level.max(PermissionLevel::Read);
        }

        if !access.is_persisted() {
            let (state, target) = match (details.is_resource_owner, details.is_recipient_owner) {
                (false, true) => (AccessState::Pending, AcceptTarget::Resource),
                (true, false) => (AccessState::Pending, AcceptTarget::Recipient),
                (true, true) => (AccessState::Accepted, AcceptTarget::Unspecified),
                (false, false) => {
                    warn!(
                        resource = %access.resource,
                        recipient = %access.recipient,
                        "caller owns neither side of the new grant"
                    );
                    return Err(AuthzError::internal("unable to determine access state"));
                }
            };
            details.access_state = state;
            details.accept_target = target;
        }

        debug!(
            resource = %access.resource,
            recipient = %access.recipient,
            resource_owner = details.is_resource_owner,
            recipient_owner = details.is_recipient_owner,
            ceiling = %details.maximum_permission_level,
            "analyzed grant ownership"
        );

        Ok(details)
    }

    async fn recipient_level(
        &self,
        account: &AuthAccount,
        recipient: Principal,
        minimum: PermissionLevel,
    ) -> Result<PermissionLevel> {
        let options = ResolveOptions::new()
            .with_visibility(VisibilityLevel::Public)
            .with_minimum_permission(minimum);

        let level = match recipient {
            Principal::Circle(id) => {
                self.resolver.resolve_as(account, id, options).await?.permission_level
            }
            Principal::User(id) => {
                self.resolver.resolve_as(account, id, options).await?.permission_level
            }
        };
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessId, CircleId, RecipeAccess, RecipeId, UserId};

    #[test]
    fn test_default_options() {
        let options = OwnershipOptions::default();
        assert!(!options.force_omit_resource_check);
        assert!(!options.force_omit_recipient_check);
        assert!(!options.allow_auto_omit_access_checks);
        assert_eq!(options.minimum_recipient_permission_level, PermissionLevel::Read);
    }

    #[test]
    fn test_auto_omit_only_for_stored_grants() {
        let options = OwnershipOptions::new().allow_auto_omit_access_checks();
        let pending = RecipeAccess::new(RecipeId(1), UserId(2), PermissionLevel::Read)
            .with_state(AccessState::Pending)
            .with_accept_target(AcceptTarget::Recipient);

        assert_eq!(options.omitted_checks(&pending), (false, false));
        assert_eq!(options.omitted_checks(&pending.with_id(AccessId(9))), (true, false));

        let resource_targeted = pending
            .with_accept_target(AcceptTarget::Resource)
            .with_id(AccessId(9));
        assert_eq!(options.omitted_checks(&resource_targeted), (false, true));
    }

    #[test]
    fn test_forced_omits_stack_with_auto_omit() {
        let options = OwnershipOptions::new()
            .allow_auto_omit_access_checks()
            .force_omit_recipient_check();
        let stored = RecipeAccess::new(RecipeId(1), CircleId(2), PermissionLevel::Read)
            .with_id(AccessId(4))
            .with_accept_target(AcceptTarget::Recipient);

        assert_eq!(options.omitted_checks(&stored), (true, true));
    }

    #[test]
    fn test_without_auto_omit_target_is_ignored() {
        let stored = RecipeAccess::new(RecipeId(1), CircleId(2), PermissionLevel::Read)
            .with_id(AccessId(4))
            .with_accept_target(AcceptTarget::Resource);

        assert_eq!(OwnershipOptions::new().omitted_checks(&stored), (false, false));
    }
}
