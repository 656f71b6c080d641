//! Scripted repository for isolating resolver paths

use async_trait::async_trait;
use sharegate_authz::{
    AccessId, AccessPath, AccessRepository, AccessState, AuthAccount, AuthzError, CalendarAccess,
    CalendarId, CircleAccess, CircleId, Grant, ListAccess, ListId, PermissionLevel, RecipeAccess,
    RecipeId, ResourceId, ResourceKind, ResourceRecord, Result, UserAccess, UserId,
    VisibilityLevel,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Circle that holds the delegated circle grant
pub const DELEGATING_CIRCLE: CircleId = CircleId(700);

/// User that holds the delegated user grant
pub const DELEGATING_USER: UserId = UserId(800);

/// Level and state a scripted finder returns
#[derive(Debug, Clone, Copy)]
pub struct StubGrant {
    pub level: PermissionLevel,
    pub state: AccessState,
}

impl StubGrant {
    pub fn accepted(level: PermissionLevel) -> Self {
        Self {
            level,
            state: AccessState::Accepted,
        }
    }

    pub fn pending(level: PermissionLevel) -> Self {
        Self {
            level,
            state: AccessState::Pending,
        }
    }
}

/// Repository whose finders return fixed grants regardless of resource kind
#[derive(Default)]
pub struct StubRepository {
    standard: Option<StubGrant>,
    circle: Option<(StubGrant, PermissionLevel)>,
    user: Option<StubGrant>,
    failure: Option<(AccessPath, AuthzError)>,
    delay: Option<Duration>,
    visibility: Option<VisibilityLevel>,
    calls: AtomicUsize,
}

impl StubRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_standard(mut self, grant: StubGrant) -> Self {
        self.standard = Some(grant);
        self
    }

    /// Circle grant on the resource plus the caller's membership level
    pub fn with_circle(mut self, grant: StubGrant, membership: PermissionLevel) -> Self {
        self.circle = Some((grant, membership));
        self
    }

    pub fn with_user(mut self, grant: StubGrant) -> Self {
        self.user = Some(grant);
        self
    }

    pub fn failing(mut self, path: AccessPath, err: AuthzError) -> Self {
        self.failure = Some((path, err));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_visibility(mut self, visibility: VisibilityLevel) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Number of finder calls served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, path: AccessPath) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some((failing, err)) if *failing == path => Err(err.clone()),
            _ => Ok(()),
        }
    }

    async fn standard<K: ResourceKind>(&self, account: &AuthAccount, id: K) -> Result<Grant<K>> {
        self.enter(AccessPath::Standard).await?;
        let stub = self
            .standard
            .ok_or_else(|| AuthzError::not_found("no standard grant"))?;
        Ok(Grant::new(id, account.auth_user_id, stub.level)
            .with_id(AccessId(1))
            .with_state(stub.state))
    }

    async fn circle<K: ResourceKind>(
        &self,
        account: &AuthAccount,
        id: K,
    ) -> Result<(Grant<K>, CircleAccess)> {
        self.enter(AccessPath::DelegatedCircle).await?;
        let (stub, membership) = self
            .circle
            .ok_or_else(|| AuthzError::not_found("no circle grant"))?;
        let grant = Grant::new(id, DELEGATING_CIRCLE, stub.level)
            .with_id(AccessId(2))
            .with_state(stub.state);
        let link = CircleAccess::new(DELEGATING_CIRCLE, account.auth_user_id, membership)
            .with_id(AccessId(3))
            .accepted();
        Ok((grant, link))
    }

    async fn user<K: ResourceKind>(
        &self,
        account: &AuthAccount,
        id: K,
    ) -> Result<(Grant<K>, UserAccess)> {
        self.enter(AccessPath::DelegatedUser).await?;
        let stub = self.user.ok_or_else(|| AuthzError::not_found("no user grant"))?;
        let grant = Grant::new(id, DELEGATING_USER, stub.level)
            .with_id(AccessId(4))
            .with_state(stub.state);
        let link = UserAccess::new(DELEGATING_USER, account.auth_user_id, PermissionLevel::Read)
            .with_id(AccessId(5))
            .accepted();
        Ok((grant, link))
    }
}

#[async_trait]
impl AccessRepository for StubRepository {
    async fn get_resource(&self, _account: &AuthAccount, id: ResourceId) -> Result<ResourceRecord> {
        self.visibility
            .map(|visibility| ResourceRecord::new(id, visibility))
            .ok_or_else(|| AuthzError::not_found(format!("resource {}", id)))
    }

    async fn find_standard_user_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<CalendarAccess> {
        self.standard(account, id).await
    }

    async fn find_delegated_circle_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<(CalendarAccess, CircleAccess)> {
        self.circle(account, id).await
    }

    async fn find_delegated_user_calendar_access(
        &self,
        account: &AuthAccount,
        id: CalendarId,
    ) -> Result<(CalendarAccess, UserAccess)> {
        self.user(account, id).await
    }

    async fn find_standard_user_circle_access(
        &self,
        account: &AuthAccount,
        id: CircleId,
    ) -> Result<CircleAccess> {
        self.standard(account, id).await
    }

    async fn find_delegated_user_circle_access(
        &self,
        account: &AuthAccount,
        id: CircleId,
    ) -> Result<(CircleAccess, UserAccess)> {
        self.user(account, id).await
    }

    async fn find_standard_user_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<RecipeAccess> {
        self.standard(account, id).await
    }

    async fn find_delegated_circle_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<(RecipeAccess, CircleAccess)> {
        self.circle(account, id).await
    }

    async fn find_delegated_user_recipe_access(
        &self,
        account: &AuthAccount,
        id: RecipeId,
    ) -> Result<(RecipeAccess, UserAccess)> {
        self.user(account, id).await
    }

    async fn find_standard_user_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<ListAccess> {
        self.standard(account, id).await
    }

    async fn find_delegated_circle_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<(ListAccess, CircleAccess)> {
        self.circle(account, id).await
    }

    async fn find_delegated_user_list_access(
        &self,
        account: &AuthAccount,
        id: ListId,
    ) -> Result<(ListAccess, UserAccess)> {
        self.user(account, id).await
    }

    async fn find_standard_user_user_access(
        &self,
        account: &AuthAccount,
        id: UserId,
    ) -> Result<UserAccess> {
        self.standard(account, id).await
    }
}
