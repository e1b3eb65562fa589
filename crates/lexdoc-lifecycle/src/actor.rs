//! The acting user and their privilege.

use lexdoc_core::ActorId;
use serde::{Deserialize, Serialize};

/// Privilege level. `Admin` carries override privilege: releasing other
/// users' locks, cancelling other users' workflows, requesting signatures,
/// restoring and archiving versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Member => "member",
            Self::Admin => "admin",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn member(id: ActorId) -> Self {
        Self {
            id,
            role: Role::Member,
        }
    }

    pub fn admin(id: ActorId) -> Self {
        Self {
            id,
            role: Role::Admin,
        }
    }

    pub fn has_override(&self) -> bool {
        self.role >= Role::Admin
    }

    /// The actor is `owner`, or may act on their behalf.
    pub fn owns_or_overrides(&self, owner: ActorId) -> bool {
        self.id == owner || self.has_override()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_and_order() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse(" member "), Some(Role::Member));
        assert_eq!(Role::parse("root"), None);
        assert!(Role::Member < Role::Admin);
    }

    #[test]
    fn override_privilege() {
        let owner = ActorId::new();
        let member = Actor::member(ActorId::new());
        let admin = Actor::admin(ActorId::new());
        assert!(!member.has_override());
        assert!(!member.owns_or_overrides(owner));
        assert!(Actor::member(owner).owns_or_overrides(owner));
        assert!(admin.owns_or_overrides(owner));
    }
}
