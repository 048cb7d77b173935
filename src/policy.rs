//! Role-based access decisions.
//!
//! Two roles, no hierarchy. Endpoints that require [`Role::User`] only check that the caller is
//! authenticated; endpoints that require [`Role::Admin`] need exactly that role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Lenient parse for roles carried in tokens: anything unknown is `None`.
    pub fn parse(raw: Option<&str>) -> Option<Role> {
        raw.and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not `"user"` or `"admin"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role '{0}'")]
pub struct InvalidRole(pub String);

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

/// Outcome of [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// The access policy denied an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("forbidden")]
pub struct Forbidden;

impl Decision {
    /// `Ok(())` on allow, [`Forbidden`] on deny.
    pub fn require(self) -> Result<(), Forbidden> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(Forbidden),
        }
    }
}

/// Decide whether an actor with `actor` role may use an endpoint that requires `required`.
///
/// A missing role (unauthenticated, or a role that did not parse) is always denied.
pub fn authorize(actor: Option<Role>, required: Role) -> Decision {
    match (actor, required) {
        (None, _) => Decision::Deny,
        (Some(_), Role::User) => Decision::Allow,
        (Some(Role::Admin), Role::Admin) => Decision::Allow,
        (Some(Role::User), Role::Admin) => Decision::Deny,
    }
}
