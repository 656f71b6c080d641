//! Grant lifecycle workflows
//!
//! [`GrantManager`] is the write side of sharing: it creates, inspects,
//! updates, deletes and accepts grants on one resource kind, consulting the
//! [`OwnershipAnalyzer`] before touching storage.

use crate::access::{AccessField, AccessId, Grant, Principal};
use crate::error::{AuthzError, Result};
use crate::ownership::{OwnershipAnalyzer, OwnershipDetails};
use crate::repository::AccessStore;
use crate::resolver::{ResolveOptions, ResourceKind};
use crate::types::{AcceptTarget, AccessState, AuthAccount, PermissionLevel};

use std::sync::Arc;
use tracing::{info, warn};

/// Grant workflows for resources of kind `K`
pub struct GrantManager<K: ResourceKind> {
    analyzer: Arc<OwnershipAnalyzer>,
    store: Arc<dyn AccessStore<K>>,
}

impl<K: ResourceKind> GrantManager<K> {
    pub fn new(analyzer: Arc<OwnershipAnalyzer>, store: Arc<dyn AccessStore<K>>) -> Self {
        Self { analyzer, store }
    }

    pub fn analyzer(&self) -> &Arc<OwnershipAnalyzer> {
        &self.analyzer
    }

    /// Share `access.resource` with `access.recipient`.
    ///
    /// The caller becomes the requester. State and accept target are derived
    /// from which sides the caller owns; the requested level may not exceed the
    /// caller's own level on the resource (never less than READ).
    pub async fn create_access(&self, account: &AuthAccount, access: Grant<K>) -> Result<Grant<K>> {
        require_resource(access.resource, "creating")?;
        if access.is_persisted() {
            warn!(resource = %access.resource, "access id must not be set when creating access");
            return Err(AuthzError::invalid_argument("access id must not be set"));
        }

        let details = self.analyzer.analyze(account, &access).await?;

        if access.permission_level > details.maximum_permission_level {
            warn!(
                resource = %access.resource,
                requested = %access.permission_level,
                ceiling = %details.maximum_permission_level,
                "requested access level exceeds the caller's own"
            );
            return Err(AuthzError::invalid_argument(
                "cannot create access level higher than your own level",
            ));
        }

        let mut access = access;
        access.requester = Some(Principal::User(account.auth_user_id));
        access.state = details.access_state;
        access.accept_target = details.accept_target;

        let created = self.store.create_access(access).await?;
        info!(
            resource = %created.resource,
            recipient = %created.recipient,
            state = ?created.state,
            "created access"
        );
        Ok(created)
    }

    /// Load one grant; the caller must own either side of it
    pub async fn get_access(
        &self,
        account: &AuthAccount,
        resource: K,
        id: AccessId,
    ) -> Result<Grant<K>> {
        let (stored, _) = self.load_owned(account, resource, id, "getting").await?;
        Ok(stored)
    }

    /// Remove one grant; the caller must own either side of it
    pub async fn delete_access(
        &self,
        account: &AuthAccount,
        resource: K,
        id: AccessId,
    ) -> Result<()> {
        self.load_owned(account, resource, id, "deleting").await?;
        self.store.delete_access(resource, id).await?;
        info!(resource = %resource, access = %id, "deleted access");
        Ok(())
    }

    /// All grants on `resource`; requires WRITE on the resource
    pub async fn list_accesses(&self, account: &AuthAccount, resource: K) -> Result<Vec<Grant<K>>> {
        require_resource(resource, "listing")?;

        let resolver = self.analyzer.resolver();
        let visibility = resolver.resource_visibility(account, resource).await?;
        resolver
            .resolve_as(
                account,
                resource,
                ResolveOptions::new()
                    .with_visibility(visibility)
                    .with_minimum_permission(PermissionLevel::Write),
            )
            .await?;

        self.store.list_accesses(resource).await
    }

    /// Overwrite `fields` of a stored grant with the values in `access`.
    ///
    /// Only the permission level can be changed here; a pending grant moves
    /// to ACCEPTED through [`accept_access`](Self::accept_access) alone.
    pub async fn update_access(
        &self,
        account: &AuthAccount,
        access: Grant<K>,
        fields: &[AccessField],
    ) -> Result<Grant<K>> {
        let id = access.id.ok_or_else(|| {
            warn!(resource = %access.resource, "access id is required when updating access");
            AuthzError::invalid_argument("access id is required")
        })?;
        if let Some(field) = fields.iter().find(|f| **f != AccessField::PermissionLevel) {
            warn!(
                resource = %access.resource,
                access = %id,
                field = ?field,
                "field is not updatable"
            );
            return Err(AuthzError::invalid_argument(
                "only the permission level can be updated",
            ));
        }
        let (_, details) = self.load_owned(account, access.resource, id, "updating").await?;

        if fields.contains(&AccessField::PermissionLevel)
            && access.permission_level > details.maximum_permission_level
        {
            warn!(
                resource = %access.resource,
                requested = %access.permission_level,
                ceiling = %details.maximum_permission_level,
                "cannot raise access above the caller's own level"
            );
            return Err(AuthzError::invalid_argument(
                "cannot update access permission level to a higher level than your own",
            ));
        }

        self.store.update_access(access, fields).await
    }

    /// Accept a pending grant on behalf of the side it waits on
    pub async fn accept_access(
        &self,
        account: &AuthAccount,
        resource: K,
        id: AccessId,
    ) -> Result<Grant<K>> {
        require_ids(resource, id, "accepting")?;

        let stored = self.store.get_access(resource, id).await?;
        if stored.state != AccessState::Pending {
            warn!(
                resource = %resource,
                access = %id,
                state = ?stored.state,
                "access is not pending"
            );
            return Err(AuthzError::invalid_argument(
                "access must be in pending state to be accepted",
            ));
        }

        let options = self.analyzer.defaults().allow_auto_omit_access_checks();
        let details = self.analyzer.analyze_with(account, &stored, options).await?;

        match details.accept_target {
            AcceptTarget::Resource if !details.is_resource_owner => {
                warn!(resource = %resource, access = %id, "caller does not own the resource");
                return Err(AuthzError::invalid_argument(
                    "must be resource owner to accept resource targeted access",
                ));
            }
            AcceptTarget::Recipient if !details.is_recipient_owner => {
                warn!(resource = %resource, access = %id, "caller does not own the recipient");
                return Err(AuthzError::invalid_argument(
                    "must be recipient owner to accept recipient targeted access",
                ));
            }
            AcceptTarget::Unspecified => {
                warn!(resource = %resource, access = %id, "pending access has no accept target");
                return Err(AuthzError::invalid_argument("unspecified accept target"));
            }
            _ => {}
        }

        let accepted = self
            .store
            .update_access(stored.with_state(AccessState::Accepted), &[AccessField::State])
            .await?;
        info!(resource = %resource, access = %id, "accepted access");
        Ok(accepted)
    }

    async fn load_owned(
        &self,
        account: &AuthAccount,
        resource: K,
        id: AccessId,
        action: &str,
    ) -> Result<(Grant<K>, OwnershipDetails)> {
        require_ids(resource, id, action)?;

        let stored = self.store.get_access(resource, id).await?;
        let details = self.analyzer.analyze(account, &stored).await?;

        if !details.is_either_owner() {
            warn!(resource = %resource, access = %id, action, "access denied");
            return Err(AuthzError::permission_denied("access denied"));
        }
        Ok((stored, details))
    }
}

fn require_resource<K: ResourceKind>(resource: K, action: &str) -> Result<()> {
    if resource.raw_id() == 0 {
        let kind = K::RESOURCE_TYPE;
        warn!(kind = %kind, action, "resource id is required");
        return Err(AuthzError::invalid_argument("resource id is required"));
    }
    Ok(())
}

fn require_ids<K: ResourceKind>(resource: K, id: AccessId, action: &str) -> Result<()> {
    require_resource(resource, action)?;
    if !id.is_valid() {
        warn!(resource = %resource, action, "access id is required");
        return Err(AuthzError::invalid_argument("access id is required"));
    }
    Ok(())
}
