use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

/// one of the named top level roots of the file tree.
///
/// every space has its own tree of folders and files. the personal space is
/// called `users` on the client side while the store calls it `user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Space {
    #[serde(rename = "public")]
    Public,
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "user", alias = "users")]
    Users,
}

impl Space {
    pub const ALL: [Space; 3] = [Space::Public, Space::Group, Space::Users];

    /// key used for display names and user input
    pub fn key(&self) -> &'static str {
        match self {
            Space::Public => "public",
            Space::Group => "group",
            Space::Users => "users",
        }
    }

    /// name of the space in store requests
    pub fn wire_name(&self) -> &'static str {
        match self {
            Space::Public => "public",
            Space::Group => "group",
            Space::Users => "user",
        }
    }
}

impl Default for Space {
    fn default() -> Self {
        Space::Users
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSpace(pub String);

impl fmt::Display for UnknownSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown space \"{}\". expected public, group or users", self.0)
    }
}

impl std::error::Error for UnknownSpace {}

impl FromStr for Space {
    type Err = UnknownSpace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Space::Public),
            "group" => Ok(Space::Group),
            "users" | "user" | "personal" => Ok(Space::Users),
            _ => Err(UnknownSpace(s.to_owned()))
        }
    }
}
