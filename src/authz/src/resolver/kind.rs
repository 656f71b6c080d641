//! Per-kind dispatch table binding each resource id type to its finders

use crate::access::{
    AnyAccess, CalendarId, CircleAccess, CircleId, Grant, ListId, RecipeId, ResourceId,
    ResourceType, UserAccess, UserId,
};
use crate::error::{AuthzError, Result};
use crate::repository::AccessRepository;
use crate::types::{AccessPath, AuthAccount, PermissionLevel, VisibilityLevel};
use async_trait::async_trait;
use std::fmt;
use std::hash::Hash;

/// A kind of shareable resource, identified by its id type.
///
/// The resolver is generic over this trait, so resolving a `RecipeId`
/// yields a `RecipeAccess` without any downcast.
#[async_trait]
pub trait ResourceKind:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Into<ResourceId> + Send + Sync + 'static
{
    const RESOURCE_TYPE: ResourceType;

    /// Raw numeric id, zero when unset
    fn raw_id(self) -> u64;

    /// Whether grants on this kind can be held through `path`
    fn has_path(_path: AccessPath) -> bool {
        true
    }

    /// Access the caller holds without consulting storage
    fn self_access(self, _account: &AuthAccount) -> Option<Grant<Self>> {
        None
    }

    /// Erase the kind of a resolved grant
    fn into_any(access: Grant<Self>) -> AnyAccess;

    async fn find_standard_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<Grant<Self>>;

    async fn find_delegated_circle_access(
        self,
        _repo: &dyn AccessRepository,
        _account: &AuthAccount,
    ) -> Result<(Grant<Self>, CircleAccess)> {
        Err(AuthzError::not_found(format!(
            "{} has no delegated circle access",
            Self::RESOURCE_TYPE
        )))
    }

    async fn find_delegated_user_access(
        self,
        _repo: &dyn AccessRepository,
        _account: &AuthAccount,
    ) -> Result<(Grant<Self>, UserAccess)> {
        Err(AuthzError::not_found(format!(
            "{} has no delegated user access",
            Self::RESOURCE_TYPE
        )))
    }

    /// Stored visibility of the resource
    async fn visibility(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<VisibilityLevel> {
        let record = repo.get_resource(account, self.into()).await?;
        Ok(record.visibility)
    }
}

#[async_trait]
impl ResourceKind for CalendarId {
    const RESOURCE_TYPE: ResourceType = ResourceType::Calendar;

    fn raw_id(self) -> u64 {
        self.0
    }

    fn into_any(access: Grant<Self>) -> AnyAccess {
        AnyAccess::Calendar(access)
    }

    async fn find_standard_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<Grant<Self>> {
        repo.find_standard_user_calendar_access(account, self).await
    }

    async fn find_delegated_circle_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<(Grant<Self>, CircleAccess)> {
        repo.find_delegated_circle_calendar_access(account, self).await
    }

    async fn find_delegated_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<(Grant<Self>, UserAccess)> {
        repo.find_delegated_user_calendar_access(account, self).await
    }
}

#[async_trait]
impl ResourceKind for CircleId {
    const RESOURCE_TYPE: ResourceType = ResourceType::Circle;

    fn raw_id(self) -> u64 {
        self.0
    }

    // A circle cannot be shared with another circle.
    fn has_path(path: AccessPath) -> bool {
        path != AccessPath::DelegatedCircle
    }

    fn into_any(access: Grant<Self>) -> AnyAccess {
        AnyAccess::Circle(access)
    }

    async fn find_standard_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<Grant<Self>> {
        repo.find_standard_user_circle_access(account, self).await
    }

    async fn find_delegated_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<(Grant<Self>, UserAccess)> {
        repo.find_delegated_user_circle_access(account, self).await
    }
}

#[async_trait]
impl ResourceKind for RecipeId {
    const RESOURCE_TYPE: ResourceType = ResourceType::Recipe;

    fn raw_id(self) -> u64 {
        self.0
    }

    fn into_any(access: Grant<Self>) -> AnyAccess {
        AnyAccess::Recipe(access)
    }

    async fn find_standard_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<Grant<Self>> {
        repo.find_standard_user_recipe_access(account, self).await
    }

    async fn find_delegated_circle_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<(Grant<Self>, CircleAccess)> {
        repo.find_delegated_circle_recipe_access(account, self).await
    }

    async fn find_delegated_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<(Grant<Self>, UserAccess)> {
        repo.find_delegated_user_recipe_access(account, self).await
    }
}

#[async_trait]
impl ResourceKind for ListId {
    const RESOURCE_TYPE: ResourceType = ResourceType::List;

    fn raw_id(self) -> u64 {
        self.0
    }

    fn into_any(access: Grant<Self>) -> AnyAccess {
        AnyAccess::List(access)
    }

    async fn find_standard_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<Grant<Self>> {
        repo.find_standard_user_list_access(account, self).await
    }

    async fn find_delegated_circle_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<(Grant<Self>, CircleAccess)> {
        repo.find_delegated_circle_list_access(account, self).await
    }

    async fn find_delegated_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<(Grant<Self>, UserAccess)> {
        repo.find_delegated_user_list_access(account, self).await
    }
}

#[async_trait]
impl ResourceKind for UserId {
    const RESOURCE_TYPE: ResourceType = ResourceType::User;

    fn raw_id(self) -> u64 {
        self.0
    }

    // Users are reached only through a direct grant.
    fn has_path(path: AccessPath) -> bool {
        path == AccessPath::Standard
    }

    // Every user administers themselves.
    fn self_access(self, account: &AuthAccount) -> Option<Grant<Self>> {
        (self == account.auth_user_id).then(|| {
            Grant::new(self, account.auth_user_id, PermissionLevel::Admin)
                .with_requester(account.auth_user_id)
                .accepted()
        })
    }

    fn into_any(access: Grant<Self>) -> AnyAccess {
        AnyAccess::User(access)
    }

    async fn find_standard_user_access(
        self,
        repo: &dyn AccessRepository,
        account: &AuthAccount,
    ) -> Result<Grant<Self>> {
        repo.find_standard_user_user_access(account, self).await
    }

    // Users have no stored visibility; any user can be looked up.
    async fn visibility(
        self,
        _repo: &dyn AccessRepository,
        _account: &AuthAccount,
    ) -> Result<VisibilityLevel> {
        Ok(VisibilityLevel::Public)
    }
}
