//! Auth service.

use async_trait::async_trait;
use mockall::automock;

use crate::auth::{Actor, AuthServiceError, JwtConfig, JwtKeys};

#[derive(Debug, Clone)]
pub struct JwtAuthService {
    keys: JwtKeys,
}

impl JwtAuthService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            keys: JwtKeys::new(config),
        }
    }
}

#[async_trait]
impl AuthService for JwtAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Actor, AuthServiceError> {
        let claims = self.keys.verify(bearer_token)?;

        Actor::try_from(claims)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the caller it was issued to.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Actor, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use mandi::{buyers::BuyerCategory, listings::UserUuid};
    use testresult::TestResult;

    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            issuer: "mandi-test".to_string(),
        }
    }

    #[tokio::test]
    async fn authenticates_a_signed_token() -> TestResult {
        let actor = Actor::buyer(UserUuid::new(), BuyerCategory::Shopkeeper);
        let token = JwtKeys::new(&config()).sign(&actor, SignedDuration::from_mins(5))?;

        let authenticated = JwtAuthService::new(&config())
            .authenticate_bearer(&token)
            .await?;

        assert_eq!(authenticated, actor);

        Ok(())
    }

    #[tokio::test]
    async fn rejects_an_invalid_token() {
        let result = JwtAuthService::new(&config())
            .authenticate_bearer("abc.def.ghi")
            .await;

        assert!(matches!(result, Err(AuthServiceError::InvalidToken(_))));
    }
}
