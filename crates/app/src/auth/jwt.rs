//! HS256 JWT signing and verification.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::auth::{Actor, AuthServiceError, Claims};

/// Configuration for bearer token verification.
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    pub secret: String,

    /// Expected `iss` claim.
    pub issuer: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Signs and verifies bearer tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
        }
    }

    /// Sign a token for `actor` that expires after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error when `ttl` is not positive or signing fails.
    pub fn sign(&self, actor: &Actor, ttl: SignedDuration) -> Result<String, AuthServiceError> {
        if !ttl.is_positive() {
            return Err(AuthServiceError::InvalidLifetime);
        }

        let issued_at = Timestamp::now();
        let expires_at = issued_at
            .checked_add(ttl)
            .map_err(|_overflow| AuthServiceError::InvalidLifetime)?;

        let claims = Claims {
            sub: actor.user.into_uuid(),
            role: actor.role,
            buyer_category: actor.buyer_category,
            iss: self.issuer.clone(),
            exp: expires_at.as_second(),
            iat: issued_at.as_second(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthServiceError::Signing)
    }

    /// Verify signature, expiry and issuer, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns an error when the token is malformed, expired, wrongly signed or issued by
    /// someone else.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AuthServiceError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use mandi::{buyers::BuyerCategory, listings::UserUuid};
    use testresult::TestResult;

    use super::*;

    fn keys(secret: &str, issuer: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.to_string(),
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn signed_tokens_verify() -> TestResult {
        let keys = keys("secret", "mandi");
        let actor = Actor::buyer(UserUuid::new(), BuyerCategory::MandiOwner);

        let token = keys.sign(&actor, SignedDuration::from_hours(1))?;
        let claims = keys.verify(&token)?;

        assert_eq!(claims.sub, actor.user.into_uuid());
        assert_eq!(claims.buyer_category, Some(BuyerCategory::MandiOwner));
        assert_eq!(claims.iss, "mandi");

        Ok(())
    }

    #[test]
    fn wrong_secret_is_rejected() -> TestResult {
        let token = keys("one", "mandi").sign(
            &Actor::seller(UserUuid::new()),
            SignedDuration::from_hours(1),
        )?;

        let result = keys("two", "mandi").verify(&token);

        assert!(matches!(result, Err(AuthServiceError::InvalidToken(_))));

        Ok(())
    }

    #[test]
    fn wrong_issuer_is_rejected() -> TestResult {
        let token = keys("secret", "someone-else").sign(
            &Actor::seller(UserUuid::new()),
            SignedDuration::from_hours(1),
        )?;

        let result = keys("secret", "mandi").verify(&token);

        assert!(matches!(result, Err(AuthServiceError::InvalidToken(_))));

        Ok(())
    }

    #[test]
    fn garbage_is_rejected() {
        let result = keys("secret", "mandi").verify("not-a-token");

        assert!(matches!(result, Err(AuthServiceError::InvalidToken(_))));
    }

    #[test]
    fn non_positive_lifetimes_are_rejected() {
        let result = keys("secret", "mandi").sign(
            &Actor::seller(UserUuid::new()),
            SignedDuration::ZERO,
        );

        assert!(matches!(result, Err(AuthServiceError::InvalidLifetime)));
    }

    #[test]
    fn debug_redacts_the_secret() {
        let config = JwtConfig {
            secret: "hunter2".to_string(),
            issuer: "mandi".to_string(),
        };

        assert!(
            !format!("{config:?}").contains("hunter2"),
            "secret must not be printed"
        );
    }
}
