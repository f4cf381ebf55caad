use classroll_auth::{Role, SessionClaims};
use classroll_core::UserId;

/// Authenticated caller of a request, derived from the bearer token.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
    role: Role,
}

impl SessionContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<&SessionClaims> for SessionContext {
    fn from(claims: &SessionClaims) -> Self {
        Self::new(claims.sub, claims.role)
    }
}
