//! # Sharegate Authorization Engine
//!
//! Decides what a caller may do with a shared recipe, calendar, list, circle
//! or user.
//!
//! ## Features
//!
//! - **Tiered access resolution** over direct grants, circle membership and
//!   user-to-user delegation, gated by resource visibility
//! - **Grant ownership analysis** deciding who must approve a new grant
//! - **Grant workflows** for creating, updating, deleting and accepting grants
//! - **Async-first design** using Tokio; storage sits behind traits
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sharegate_authz::{
//!     AccessResolver, AccessStore, AuthAccount, InMemoryAccessRepository, PermissionLevel,
//!     RecipeAccess, RecipeId, ResolveOptions, UserId, VisibilityLevel,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = Arc::new(InMemoryAccessRepository::new());
//!     let grant = RecipeAccess::new(RecipeId(99), UserId(5), PermissionLevel::Write);
//!     repo.create_access(grant.accepted()).await?;
//!
//!     let resolver = AccessResolver::new(repo);
//!     let access = resolver
//!         .resolve_recipe_access(
//!             &AuthAccount::new(UserId(5)),
//!             RecipeId(99),
//!             ResolveOptions::new().with_visibility(VisibilityLevel::Private),
//!         )
//!         .await?;
//!
//!     assert_eq!(access.permission_level, PermissionLevel::Write);
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod grants;
pub mod memory;
pub mod metrics;
pub mod ownership;
pub mod repository;
pub mod resolver;
pub mod types;

// Re-export commonly used types
pub use access::{
    Access, AccessField, AccessId, AnyAccess, CalendarAccess, CalendarId, CircleAccess, CircleId,
    Grant, ListAccess, ListId, Principal, RecipeAccess, RecipeId, ResourceId, ResourceType,
    UserAccess, UserId,
};
pub use config::AuthzConfig;
pub use error::{AuthzError, OptionalExt, Result};
pub use grants::GrantManager;
pub use memory::InMemoryAccessRepository;
pub use metrics::{MetricsSnapshot, ResolverMetrics};
pub use ownership::{OwnershipAnalyzer, OwnershipDetails, OwnershipOptions};
pub use repository::{AccessRepository, AccessStore, ResourceRecord};
pub use resolver::{AccessResolver, ResolveOptions, ResolverConfig, ResourceKind};
pub use types::{
    AcceptTarget, AccessPath, AccessState, AuthAccount, PermissionLevel, VisibilityLevel,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
