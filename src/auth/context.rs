use std::str::FromStr;
use uuid::Uuid;

use super::Claims;
use crate::domain::users::UserRole;

/// Authenticated user context extracted from the session token.
/// Handlers receive it through [`super::RequireAuth`] and pass the user id
/// explicitly to every user-scoped operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;
        let role = UserRole::from_str(&claims.role).map_err(|_| "Invalid role in token")?;

        Ok(Self {
            user_id,
            username: claims.username.clone(),
            role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: "anna".into(),
            role: role.to_string(),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn builds_from_valid_claims() {
        let id = Uuid::new_v4();
        let ctx = AuthContext::from_claims(&claims(&id.to_string(), "admin")).unwrap();
        assert_eq!(ctx.user_id, id);
        assert!(ctx.is_admin());
    }

    #[test]
    fn rejects_garbage() {
        assert!(AuthContext::from_claims(&claims("nope", "user")).is_err());
        assert!(AuthContext::from_claims(&claims(&Uuid::new_v4().to_string(), "root")).is_err());
    }
}
