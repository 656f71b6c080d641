//! In-memory grant storage
//!
//! Implements both [`AccessRepository`] and [`AccessStore`] for every resource
//! kind over `tokio` locked maps. Delegated finders reproduce the join a
//! relational store would run: the resource grant must be ACCEPTED and so must
//! the grant linking the caller to the delegating circle or user. When several
//! rows match, the one with the highest effective level wins.

use crate::access::{
    AccessField, AccessId, CalendarAccess, CalendarId, CircleAccess, CircleId, Grant, ListAccess,
    ListId, Principal, RecipeAccess, RecipeId, ResourceId, UserAccess, UserId,
};
use crate::error::{AuthzError, Result};
use crate::repository::{AccessRepository, AccessStore, ResourceRecord};
use crate::resolver::ResourceKind;
use crate::types::{AccessState, AuthAccount, VisibilityLevel};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

type Table<K> = Arc<RwLock<HashMap<AccessId, Grant<K>>>>;

/// In-memory access repository
#[derive(Clone, Default)]
pub struct InMemoryAccessRepository {
    resources: Arc<RwLock<HashMap<ResourceId, VisibilityLevel>>>,
    calendars: Table<CalendarId>,
    circles: Table<CircleId>,
    recipes: Table<RecipeId>,
    lists: Table<ListId>,
    users: Table<UserId>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryAccessRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource with its visibility, replacing any previous entry
    pub async fn put_resource(&self, id: impl Into<ResourceId>, visibility: VisibilityLevel) {
        self.resources.write().await.insert(id.into(), visibility);
    }

    pub async fn remove_resource(&self, id: impl Into<ResourceId>) -> bool {
        self.resources.write().await.remove(&id.into()).is_some()
    }

    fn allocate_id(&self) -> AccessId {
        AccessId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> AuthzError {
    AuthzError::not_found(format!("{} for {}", what, id))
}

fn find_standard<K: ResourceKind>(
    grants: &HashMap<AccessId, Grant<K>>,
    id: K,
    user: UserId,
) -> Option<Grant<K>> {
    grants
        .values()
        .filter(|g| g.resource == id && g.recipient == Principal::User(user))
        .max_by_key(|g| (g.permission_level, g.state == AccessState::Accepted))
        .copied()
}

/// Resource grants held by a principal joined with the caller's grant on that
/// principal
fn find_delegated<K, P>(
    grants: &HashMap<AccessId, Grant<K>>,
    links: &HashMap<AccessId, Grant<P>>,
    id: K,
    user: UserId,
    principal_of: impl Fn(Principal) -> Option<P>,
) -> Option<(Grant<K>, Grant<P>)>
where
    K: ResourceKind,
    P: ResourceKind,
{
    grants
        .values()
        .filter(|g| g.resource == id && g.state == AccessState::Accepted)
        .filter_map(|g| principal_of(g.recipient).map(|p| (g, p)))
        .flat_map(|(g, p)| {
            links
                .values()
                .filter(move |l| {
                    l.resource == p
                        && l.recipient == Principal::User(user)
                        && l.state == AccessState::Accepted
                })
                .map(move |l| (*g, *l))
        })
        .max_by_key(|(g, l)| g.permission_level.min(l.permission_level))
}

async fn standard_in<K: ResourceKind>(table: &Table<K>, id: K, user: UserId) -> Result<Grant<K>> {
    let grants = table.read().await;
    find_standard(&grants, id, user).ok_or_else(|| not_found("standard user access", id))
}

async fn circle_in<K: ResourceKind>(
    table: &Table<K>,
    memberships: &Table<CircleId>,
    id: K,
    user: UserId,
) -> Result<(Grant<K>, CircleAccess)> {
    let grants = table.read().await;
    let memberships = memberships.read().await;
    find_delegated(&grants, &memberships, id, user, Principal::circle_id)
        .ok_or_else(|| not_found("delegated circle access", id))
}

async fn user_in<K: ResourceKind>(
    table: &Table<K>,
    delegations: &Table<UserId>,
    id: K,
    user: UserId,
) -> Result<(Grant<K>, UserAccess)> {
    let grants = table.read().await;
    let delegations = delegations.read().await;
    find_delegated(&grants, &delegations, id, user, Principal::user_id)
        .ok_or_else(|| not_found("delegated user access", id))
}

#[async_trait]
impl AccessRepository for InMemoryAccessRepository {
    async fn get_resource(&self, _account: &AuthAccount, id: ResourceId) -> Result<ResourceRecord> {
        let resources = self.resources.read().await;
        resources
            .get(&id)
            .map(|visibility| ResourceRecord::new(id, *visibility))
            .ok_or_else(|| AuthzError::not_found(format!("resource {}", id)))
    }

    async fn find_standard_user_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<CalendarAccess> {
        standard_in(&self.calendars, id, account.auth_user_id).await
    }

    async fn find_delegated_circle_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<(CalendarAccess, CircleAccess)> {
        circle_in(&self.calendars, &self.circles, id, account.auth_user_id).await
    }

    async fn find_delegated_user_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<(CalendarAccess, UserAccess)> {
        user_in(&self.calendars, &self.users, id, account.auth_user_id).await
    }

    async fn find_standard_user_circle_access(
        &self,
        account: &AuthAccount,
        id: CircleId,
    ) -> Result<CircleAccess> {
        standard_in(&self.circles, id, account.auth_user_id).await
    }

    async fn find_delegated_user_circle_access(
        &self,
        account: &AuthAccount,
        id: CircleId,
    ) -> Result<(CircleAccess, UserAccess)> {
        user_in(&self.circles, &self.users, id, account.auth_user_id).await
    }

    async fn find_standard_user_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<RecipeAccess> {
        standard_in(&self.recipes, id, account.auth_user_id).await
    }

    async fn find_delegated_circle_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<(RecipeAccess, CircleAccess)> {
        circle_in(&self.recipes, &self.circles, id, account.auth_user_id).await
    }

    async fn find_delegated_user_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<(RecipeAccess, UserAccess)> {
        user_in(&self.recipes, &self.users, id, account.auth_user_id).await
    }

    async fn find_standard_user_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<ListAccess> {
        standard_in(&self.lists, id, account.auth_user_id).await
    }

    async fn find_delegated_circle_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<(ListAccess, CircleAccess)> {
        circle_in(&self.lists, &self.circles, id, account.auth_user_id).await
    }

    async fn find_delegated_user_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<(ListAccess, UserAccess)> {
        user_in(&self.lists, &self.users, id, account.auth_user_id).await
    }

    async fn find_standard_user_user_access(
        &self,
        account: &AuthAccount,
        id: UserId,
    ) -> Result<UserAccess> {
        standard_in(&self.users, id, account.auth_user_id).await
    }
}

macro_rules! access_store {
    ($kind:ty, $table:ident) => {
        #[async_trait]
        impl AccessStore<$kind> for InMemoryAccessRepository {
            async fn create_access(&self, access: Grant<$kind>) -> Result<Grant<$kind>> {
                if access.is_persisted() {
                    return Err(AuthzError::invalid_argument("access id must not be set"));
                }
                let id = self.allocate_id();
                let stored = access.with_id(id);
                self.$table.write().await.insert(id, stored);
                Ok(stored)
            }

            async fn get_access(&self, resource: $kind, id: AccessId) -> Result<Grant<$kind>> {
                let grants = self.$table.read().await;
                grants
                    .get(&id)
                    .filter(|g| g.resource == resource)
                    .copied()
                    .ok_or_else(|| not_found("access", id))
            }

            async fn list_accesses(&self, resource: $kind) -> Result<Vec<Grant<$kind>>> {
                let grants = self.$table.read().await;
                let mut found: Vec<_> = grants
                    .values()
                    .filter(|g| g.resource == resource)
                    .copied()
                    .collect();
                found.sort_by_key(|g| g.id);
                Ok(found)
            }

            async fn update_access(
                &self,
                access: Grant<$kind>,
                fields: &[AccessField],
            ) -> Result<Grant<$kind>> {
                let id = access
                    .id
                    .ok_or_else(|| AuthzError::invalid_argument("access id is required"))?;
                let mut grants = self.$table.write().await;
                let stored = grants
                    .get_mut(&id)
                    .filter(|g| g.resource == access.resource)
                    .ok_or_else(|| not_found("access", id))?;

                for field in fields {
                    match field {
                        AccessField::PermissionLevel => {
                            stored.permission_level = access.permission_level
                        }
                        AccessField::State => stored.state = access.state,
                    }
                }
                Ok(*stored)
            }

            async fn delete_access(&self, resource: $kind, id: AccessId) -> Result<()> {
                let mut grants = self.$table.write().await;
                match grants.get(&id) {
                    Some(g) if g.resource == resource => {
                        grants.remove(&id);
                        Ok(())
                    }
                    _ => Err(not_found("access", id)),
                }
            }
        }
    };
}

access_store!(CalendarId, calendars);
access_store!(CircleId, circles);
access_store!(RecipeId, recipes);
access_store!(ListId, lists);
access_store!(UserId, users);
