//! Core authorization types

use crate::access::{CircleId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability tier a caller holds on a resource.
///
/// Totally ordered: `Unspecified < Public < Read < Write < Admin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionLevel {
    #[default]
    Unspecified,
    Public,
    Read,
    Write,
    Admin,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PermissionLevel::Unspecified => "UNSPECIFIED",
            PermissionLevel::Public => "PUBLIC",
            PermissionLevel::Read => "READ",
            PermissionLevel::Write => "WRITE",
            PermissionLevel::Admin => "ADMIN",
        };
        f.write_str(name)
    }
}

/// Disclosure tier of a resource.
///
/// Declared in order of restrictiveness, matching the stored values:
/// `Unspecified < Public < Restricted < Private < Hidden`. A more restrictive
/// resource admits fewer delegation paths, see [`VisibilityLevel::admits`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityLevel {
    #[default]
    Unspecified,
    Public,
    Restricted,
    Private,
    Hidden,
}

impl VisibilityLevel {
    /// Whether a resource at this visibility may be reached through `path`.
    ///
    /// | visibility  | standard | circle | user |
    /// |-------------|----------|--------|------|
    /// | Unspecified | yes      | yes    | yes  |
    /// | Public      | yes      | yes    | yes  |
    /// | Restricted  | yes      | yes    | yes  |
    /// | Private     | yes      | yes    | no   |
    /// | Hidden      | yes      | no     | no   |
    pub fn admits(self, path: AccessPath) -> bool {
        match path {
            AccessPath::Standard => self <= VisibilityLevel::Hidden,
            AccessPath::DelegatedCircle => self <= VisibilityLevel::Private,
            AccessPath::DelegatedUser => self <= VisibilityLevel::Restricted,
        }
    }
}

impl fmt::Display for VisibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VisibilityLevel::Unspecified => "UNSPECIFIED",
            VisibilityLevel::Public => "PUBLIC",
            VisibilityLevel::Restricted => "RESTRICTED",
            VisibilityLevel::Private => "PRIVATE",
            VisibilityLevel::Hidden => "HIDDEN",
        };
        f.write_str(name)
    }
}

/// The way a caller can hold a grant on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessPath {
    /// Direct grant between the caller and the resource
    Standard,
    /// Grant held by a circle the caller belongs to
    DelegatedCircle,
    /// Grant held by another user who delegated to the caller
    DelegatedUser,
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessPath::Standard => "standard user",
            AccessPath::DelegatedCircle => "delegated circle",
            AccessPath::DelegatedUser => "delegated user",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of a grant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessState {
    #[default]
    Unspecified,
    Pending,
    Accepted,
}

/// Which party still has to approve a pending grant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcceptTarget {
    #[default]
    Unspecified,
    Resource,
    Recipient,
}

/// The caller's context for one request.
///
/// `visibility_level` and `permission_level` are output-style fields: they
/// start unspecified and are filled in as the request is scoped to a circle
/// or user (see `AccessResolver::scope_account`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAccount {
    /// Authenticated user making the request
    pub auth_user_id: UserId,

    /// Circle the caller is acting as, if any
    #[serde(default)]
    pub circle_id: Option<CircleId>,

    /// Other user the caller is acting on behalf of, if any
    #[serde(default)]
    pub user_id: Option<UserId>,

    #[serde(default)]
    pub visibility_level: VisibilityLevel,

    #[serde(default)]
    pub permission_level: PermissionLevel,
}

impl AuthAccount {
    /// Create an account for an authenticated user acting as themselves
    pub fn new(auth_user_id: UserId) -> Self {
        Self {
            auth_user_id,
            circle_id: None,
            user_id: None,
            visibility_level: VisibilityLevel::Unspecified,
            permission_level: PermissionLevel::Unspecified,
        }
    }

    /// Act as a member of `circle_id`
    pub fn acting_as_circle(mut self, circle_id: CircleId) -> Self {
        self.circle_id = Some(circle_id);
        self
    }

    /// Act on behalf of `user_id`
    pub fn acting_as_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
