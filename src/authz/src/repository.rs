//! Storage collaborator traits
//!
//! The resolver never talks to a database directly. It reads grant facts
//! through [`AccessRepository`] and the grant workflows persist through
//! [`AccessStore`]. Implementations signal "nothing stored" with
//! [`AuthzError::NotFound`](crate::error::AuthzError::NotFound); any other
//! error is treated as a failure.

use crate::access::{
    AccessField, AccessId, CalendarAccess, CalendarId, CircleAccess, CircleId, Grant, ListAccess,
    ListId, RecipeAccess, RecipeId, ResourceId, UserAccess, UserId,
};
use crate::error::Result;
use crate::resolver::ResourceKind;
use crate::types::{AuthAccount, VisibilityLevel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The stored facts about a resource that authorization needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: ResourceId,
    pub visibility: VisibilityLevel,
}

impl ResourceRecord {
    pub fn new(id: impl Into<ResourceId>, visibility: VisibilityLevel) -> Self {
        Self {
            id: id.into(),
            visibility,
        }
    }
}

/// Grant lookups used by the resolver.
///
/// Each resource kind exposes the finders for the paths that apply to it:
/// calendars, recipes and lists have all three, circles cannot be reached
/// through another circle, and users are only reachable through a direct grant.
///
/// Delegated finders return the grant on the resource together with the grant
/// that links the caller to the delegating circle or user.
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Load the resource's stored visibility
    async fn get_resource(&self, account: &AuthAccount, id: ResourceId) -> Result<ResourceRecord>;

    async fn find_standard_user_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<CalendarAccess>;

    async fn find_delegated_circle_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<(CalendarAccess, CircleAccess)>;

    async fn find_delegated_user_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<(CalendarAccess, UserAccess)>;

    async fn find_standard_user_circle_access(
        &self,
        account: &AuthAccount,
        id: CircleId,
    ) -> Result<CircleAccess>;

    async fn find_delegated_user_circle_access(
        &self,
        account: &AuthAccount,
        id: CircleId,
    ) -> Result<(CircleAccess, UserAccess)>;

    async fn find_standard_user_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<RecipeAccess>;

    async fn find_delegated_circle_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<(RecipeAccess, CircleAccess)>;

    async fn find_delegated_user_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<(RecipeAccess, UserAccess)>;

    async fn find_standard_user_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<ListAccess>;

    async fn find_delegated_circle_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<(ListAccess, CircleAccess)>;

    async fn find_delegated_user_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<(ListAccess, UserAccess)>;

    async fn find_standard_user_user_access(
        &self,
        account: &AuthAccount,
        id: UserId,
    ) -> Result<UserAccess>;
}

/// Grant persistence for one resource kind
#[async_trait]
pub trait AccessStore<K: ResourceKind>: Send + Sync {
    /// Persist a new grant, assigning its id
    async fn create_access(&self, access: Grant<K>) -> Result<Grant<K>>;

    async fn get_access(&self, resource: K, id: AccessId) -> Result<Grant<K>>;

    /// All grants on `resource`
    async fn list_accesses(&self, resource: K) -> Result<Vec<Grant<K>>>;

    /// Overwrite only `fields` of the stored grant
    async fn update_access(&self, access: Grant<K>, fields: &[AccessField]) -> Result<Grant<K>>;

    async fn delete_access(&self, resource: K, id: AccessId) -> Result<()>;
}
