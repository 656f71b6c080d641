//! Resource and grant identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric identifier
            pub fn get(self) -> u64 {
                self.0
            }

            /// Zero is never a stored identifier
            pub fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}/{}", ResourceType::$variant, self.0)
            }
        }

        impl From<$name> for ResourceId {
            fn from(id: $name) -> Self {
                ResourceId::$variant(id)
            }
        }
    };
}

resource_id!(
    /// Identifies a calendar
    CalendarId,
    Calendar
);
resource_id!(
    /// Identifies a circle (group of users)
    CircleId,
    Circle
);
resource_id!(
    /// Identifies a recipe
    RecipeId,
    Recipe
);
resource_id!(
    /// Identifies a list
    ListId,
    List
);
resource_id!(
    /// Identifies a user
    UserId,
    User
);

/// Identifies a stored grant within its resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessId(pub u64);

impl AccessId {
    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for AccessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "access/{}", self.0)
    }
}

/// The five kinds of shareable resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Calendar,
    Circle,
    Recipe,
    List,
    User,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceType::Calendar => "calendar",
            ResourceType::Circle => "circle",
            ResourceType::Recipe => "recipe",
            ResourceType::List => "list",
            ResourceType::User => "user",
        };
        f.write_str(name)
    }
}

/// Any resource identifier, tagged with its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ResourceId {
    Calendar(CalendarId),
    Circle(CircleId),
    Recipe(RecipeId),
    List(ListId),
    User(UserId),
}

impl ResourceId {
    pub fn resource_type(self) -> ResourceType {
        match self {
            ResourceId::Calendar(_) => ResourceType::Calendar,
            ResourceId::Circle(_) => ResourceType::Circle,
            ResourceId::Recipe(_) => ResourceType::Recipe,
            ResourceId::List(_) => ResourceType::List,
            ResourceId::User(_) => ResourceType::User,
        }
    }

    /// Raw numeric identifier regardless of kind
    pub fn get(self) -> u64 {
        match self {
            ResourceId::Calendar(id) => id.get(),
            ResourceId::Circle(id) => id.get(),
            ResourceId::Recipe(id) => id.get(),
            ResourceId::List(id) => id.get(),
            ResourceId::User(id) => id.get(),
        }
    }

    pub fn is_valid(self) -> bool {
        self.get() != 0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type(), self.get())
    }
}

/// A party to a grant: the user or circle that receives or requests it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Principal {
    User(UserId),
    Circle(CircleId),
}

impl Principal {
    pub fn user_id(self) -> Option<UserId> {
        match self {
            Principal::User(id) => Some(id),
            Principal::Circle(_) => None,
        }
    }

    pub fn circle_id(self) -> Option<CircleId> {
        match self {
            Principal::Circle(id) => Some(id),
            Principal::User(_) => None,
        }
    }

    pub fn is_valid(self) -> bool {
        match self {
            Principal::User(id) => id.is_valid(),
            Principal::Circle(id) => id.is_valid(),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::User(id) => fmt::Display::fmt(id, f),
            Principal::Circle(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl From<UserId> for Principal {
    fn from(id: UserId) -> Self {
        Principal::User(id)
    }
}

impl From<CircleId> for Principal {
    fn from(id: CircleId) -> Self {
        Principal::Circle(id)
    }
}
