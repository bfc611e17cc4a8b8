//! Auth service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("invalid bearer token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("buyer token carries no buyer category")]
    MissingBuyerCategory,

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token lifetime")]
    InvalidLifetime,
}
