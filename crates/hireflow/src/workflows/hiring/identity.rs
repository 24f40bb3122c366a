use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::HiringError;

/// Identifier wrapper for employer accounts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

/// Identifier wrapper for freelancer accounts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FreelancerId(pub String);

/// Identifier wrapper for administrator accounts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for FreelancerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role attached to an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Client,
    Freelancer,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
            Role::Freelancer => "freelancer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "client" => Some(Role::Client),
            "freelancer" => Some(Role::Freelancer),
            _ => None,
        }
    }
}

/// Verified identity supplied by the identity provider.
///
/// Operations reserved for one role take that role's id type, so the HTTP layer
/// has to narrow the actor (`as_client`, `as_freelancer`, `as_admin`) before it
/// can call them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Actor {
    Admin(AdminId),
    Client(ClientId),
    Freelancer(FreelancerId),
}

impl Actor {
    pub fn from_parts(id: &str, role: Role) -> Self {
        let id = id.trim().to_string();
        match role {
            Role::Admin => Actor::Admin(AdminId(id)),
            Role::Client => Actor::Client(ClientId(id)),
            Role::Freelancer => Actor::Freelancer(FreelancerId(id)),
        }
    }

    pub const fn role(&self) -> Role {
        match self {
            Actor::Admin(_) => Role::Admin,
            Actor::Client(_) => Role::Client,
            Actor::Freelancer(_) => Role::Freelancer,
        }
    }

    pub fn as_client(&self) -> Result<&ClientId, HiringError> {
        match self {
            Actor::Client(id) => Ok(id),
            other => Err(HiringError::Unauthorized(format!(
                "only clients may perform this action (requester is {})",
                other.role().label()
            ))),
        }
    }

    pub fn as_freelancer(&self) -> Result<&FreelancerId, HiringError> {
        match self {
            Actor::Freelancer(id) => Ok(id),
            other => Err(HiringError::Unauthorized(format!(
                "only freelancers may perform this action (requester is {})",
                other.role().label()
            ))),
        }
    }

    pub fn as_admin(&self) -> Result<&AdminId, HiringError> {
        match self {
            Actor::Admin(id) => Ok(id),
            other => Err(HiringError::Unauthorized(format!(
                "only admins may perform this action (requester is {})",
                other.role().label()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(Role::parse("Client"), Some(Role::Client));
        assert_eq!(Role::parse(" FREELANCER "), Some(Role::Freelancer));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn narrowing_to_the_wrong_role_is_unauthorized() {
        let actor = Actor::from_parts("f-1", Role::Freelancer);
        assert!(actor.as_freelancer().is_ok());
        assert!(matches!(actor.as_client(), Err(HiringError::Unauthorized(_))));
        assert!(matches!(actor.as_admin(), Err(HiringError::Unauthorized(_))));
    }
}
