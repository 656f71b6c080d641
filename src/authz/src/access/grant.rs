//! Grant records and the shared access capability set

use super::ids::{
    AccessId, CalendarId, CircleId, ListId, Principal, RecipeId, ResourceId, UserId,
};
use crate::resolver::ResourceKind;
use crate::types::{AcceptTarget, AccessState, PermissionLevel};
use serde::{Deserialize, Serialize};

/// Capability set shared by every grant, independent of resource kind
pub trait Access {
    /// Resource the grant is on
    fn resource_id(&self) -> ResourceId;

    /// Stored id, `None` for a grant that has not been persisted
    fn access_id(&self) -> Option<AccessId>;

    fn permission_level(&self) -> PermissionLevel;

    /// Returns a copy carrying `level`; the receiver is consumed, never mutated in place
    fn with_permission_level(self, level: PermissionLevel) -> Self
    where
        Self: Sized;

    fn accept_target(&self) -> AcceptTarget;

    fn access_state(&self) -> AccessState;

    fn recipient(&self) -> Principal;

    fn recipient_circle_id(&self) -> Option<CircleId> {
        self.recipient().circle_id()
    }

    fn recipient_user_id(&self) -> Option<UserId> {
        self.recipient().user_id()
    }
}

/// Fields of a stored grant that an update may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessField {
    PermissionLevel,
    State,
}

/// A grant of `permission_level` on resource `resource` to `recipient`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant<K> {
    pub resource: K,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AccessId>,

    pub permission_level: PermissionLevel,

    #[serde(default)]
    pub state: AccessState,

    #[serde(default)]
    pub accept_target: AcceptTarget,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<Principal>,

    pub recipient: Principal,
}

pub type CalendarAccess = Grant<CalendarId>;
pub type CircleAccess = Grant<CircleId>;
pub type RecipeAccess = Grant<RecipeId>;
pub type ListAccess = Grant<ListId>;
pub type UserAccess = Grant<UserId>;

impl<K: ResourceKind> Grant<K> {
    /// An unpersisted grant request
    pub fn new(
        resource: K,
        recipient: impl Into<Principal>,
        permission_level: PermissionLevel,
    ) -> Self {
        Self {
            resource,
            id: None,
            permission_level,
            state: AccessState::Unspecified,
            accept_target: AcceptTarget::Unspecified,
            requester: None,
            recipient: recipient.into(),
        }
    }

    pub fn with_id(mut self, id: AccessId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_state(mut self, state: AccessState) -> Self {
        self.state = state;
        self
    }

    pub fn with_accept_target(mut self, target: AcceptTarget) -> Self {
        self.accept_target = target;
        self
    }

    pub fn with_requester(mut self, requester: impl Into<Principal>) -> Self {
        self.requester = Some(requester.into());
        self
    }

    /// Accepted grant, as created for a resource's owner
    pub fn accepted(self) -> Self {
        self.with_state(AccessState::Accepted)
            .with_accept_target(AcceptTarget::Unspecified)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl<K: ResourceKind> Access for Grant<K> {
    fn resource_id(&self) -> ResourceId {
        self.resource.into()
    }

    fn access_id(&self) -> Option<AccessId> {
        self.id
    }

    fn permission_level(&self) -> PermissionLevel {
        self.permission_level
    }

    fn with_permission_level(mut self, level: PermissionLevel) -> Self {
        self.permission_level = level;
        self
    }

    fn accept_target(&self) -> AcceptTarget {
        self.accept_target
    }

    fn access_state(&self) -> AccessState {
        self.state
    }

    fn recipient(&self) -> Principal {
        self.recipient
    }
}

/// A grant on any kind of resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyAccess {
    Calendar(CalendarAccess),
    Circle(CircleAccess),
    Recipe(RecipeAccess),
    List(ListAccess),
    User(UserAccess),
}

macro_rules! dispatch {
    ($value:expr, $access:ident => $body:expr) => {
        match $value {
            AnyAccess::Calendar($access) => $body,
            AnyAccess::Circle($access) => $body,
            AnyAccess::Recipe($access) => $body,
            AnyAccess::List($access) => $body,
            AnyAccess::User($access) => $body,
        }
    };
}

impl Access for AnyAccess {
    fn resource_id(&self) -> ResourceId {
        dispatch!(self, a => a.resource_id())
    }

    fn access_id(&self) -> Option<AccessId> {
        dispatch!(self, a => a.access_id())
    }

    fn permission_level(&self) -> PermissionLevel {
        dispatch!(self, a => a.permission_level)
    }

    fn with_permission_level(self, level: PermissionLevel) -> Self {
        match self {
            AnyAccess::Calendar(a) => AnyAccess::Calendar(a.with_permission_level(level)),
            AnyAccess::Circle(a) => AnyAccess::Circle(a.with_permission_level(level)),
            AnyAccess::Recipe(a) => AnyAccess::Recipe(a.with_permission_level(level)),
            AnyAccess::List(a) => AnyAccess::List(a.with_permission_level(level)),
            AnyAccess::User(a) => AnyAccess::User(a.with_permission_level(level)),
        }
    }

    fn accept_target(&self) -> AcceptTarget {
        dispatch!(self, a => a.accept_target)
    }

    fn access_state(&self) -> AccessState {
        dispatch!(self, a => a.state)
    }

    fn recipient(&self) -> Principal {
        dispatch!(self, a => a.recipient)
    }
}

impl From<CalendarAccess> for AnyAccess {
    fn from(access: CalendarAccess) -> Self {
        AnyAccess::Calendar(access)
    }
}

impl From<CircleAccess> for AnyAccess {
    fn from(access: CircleAccess) -> Self {
        AnyAccess::Circle(access)
    }
}

impl From<RecipeAccess> for AnyAccess {
    fn from(access: RecipeAccess) -> Self {
        AnyAccess::Recipe(access)
    }
}

impl From<ListAccess> for AnyAccess {
    fn from(access: ListAccess) -> Self {
        AnyAccess::List(access)
    }
}

impl From<UserAccess> for AnyAccess {
    fn from(access: UserAccess) -> Self {
        AnyAccess::User(access)
    }
}
