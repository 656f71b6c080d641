//! Access model: identifiers, principals and grant records for every resource kind.

mod grant;
mod ids;

pub use grant::{
    Access, AccessField, AnyAccess, CalendarAccess, CircleAccess, Grant, ListAccess,
    RecipeAccess, UserAccess,
};
pub use ids::{
    AccessId, CalendarId, CircleId, ListId, Principal, RecipeId, ResourceId, ResourceType,
    UserId,
};
