//! Well-known role names and the acting-user type passed into every
//! state-changing operation.
//!
//! The role names must match the `role` claim issued by the identity
//! provider.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";
pub const ROLE_SPECIALIST: &str = "specialist";

/// The role an actor holds on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    #[serde(rename = "admin")]
    PlatformAdmin,
    #[serde(rename = "client")]
    Client,
    #[serde(rename = "specialist")]
    Specialist,
}

impl ActorRole {
    pub const ALL: [ActorRole; 3] = [
        ActorRole::PlatformAdmin,
        ActorRole::Client,
        ActorRole::Specialist,
    ];

    /// Parse a role name as carried in a token claim.
    pub fn from_role_name(name: &str) -> Result<Self, CoreError> {
        match name {
            ROLE_ADMIN => Ok(ActorRole::PlatformAdmin),
            ROLE_CLIENT => Ok(ActorRole::Client),
            ROLE_SPECIALIST => Ok(ActorRole::Specialist),
            other => Err(CoreError::Forbidden(format!("Unknown role '{other}'"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActorRole::PlatformAdmin => ROLE_ADMIN,
            ActorRole::Client => ROLE_CLIENT,
            ActorRole::Specialist => ROLE_SPECIALIST,
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(user_id: DbId, role: ActorRole) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: DbId) -> Self {
        Self::new(user_id, ActorRole::PlatformAdmin)
    }

    pub fn client(user_id: DbId) -> Self {
        Self::new(user_id, ActorRole::Client)
    }

    pub fn specialist(user_id: DbId) -> Self {
        Self::new(user_id, ActorRole::Specialist)
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::PlatformAdmin
    }

    /// Require the platform admin role.
    pub fn require_admin(&self) -> Result<(), CoreError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Admin role required".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in ActorRole::ALL {
            assert_eq!(ActorRole::from_role_name(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_forbidden() {
        let err = ActorRole::from_role_name("reviewer").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn only_admin_passes_require_admin() {
        assert!(Actor::admin(1).require_admin().is_ok());
        assert!(Actor::client(1).require_admin().is_err());
        assert!(Actor::specialist(1).require_admin().is_err());
    }
}
