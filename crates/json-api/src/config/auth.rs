//! Auth Config

use clap::Args;
use mandi_app::auth::JwtConfig;

/// Bearer token settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Secret used to verify HS256 bearer tokens
    #[arg(long, env = "AUTH_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Expected token issuer
    #[arg(long, env = "AUTH_JWT_ISSUER", default_value = "mandi")]
    pub jwt_issuer: String,
}

impl AuthConfig {
    /// Token verification settings for the app layer.
    #[must_use]
    pub fn jwt(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            issuer: self.jwt_issuer.clone(),
        }
    }
}
