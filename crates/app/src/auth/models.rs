//! Auth data models.

use std::{fmt, str::FromStr};

use mandi::{
    buyers::{BuyerCategory, Viewer},
    listings::UserUuid,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthServiceError;

/// What a caller is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Seller,
    Buyer,
    Staff,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Buyer => "buyer",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "seller" => Ok(Self::Seller),
            "buyer" => Ok(Self::Buyer),
            "staff" => Ok(Self::Staff),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// JWT claims issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User UUID.
    pub sub: Uuid,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_category: Option<BuyerCategory>,

    pub iss: String,

    /// Expiry, seconds since the epoch.
    pub exp: i64,

    /// Issued at, seconds since the epoch.
    pub iat: i64,
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user: UserUuid,
    pub role: Role,
    pub buyer_category: Option<BuyerCategory>,
}

impl Actor {
    #[must_use]
    pub const fn seller(user: UserUuid) -> Self {
        Self {
            user,
            role: Role::Seller,
            buyer_category: None,
        }
    }

    #[must_use]
    pub const fn buyer(user: UserUuid, category: BuyerCategory) -> Self {
        Self {
            user,
            role: Role::Buyer,
            buyer_category: Some(category),
        }
    }

    #[must_use]
    pub const fn staff(user: UserUuid) -> Self {
        Self {
            user,
            role: Role::Staff,
            buyer_category: None,
        }
    }

    /// How the caller sees marketplace listings.
    #[must_use]
    pub const fn viewer(&self) -> Viewer {
        match (self.role, self.buyer_category) {
            (Role::Staff, _) => Viewer::Staff,
            (Role::Buyer, Some(category)) => Viewer::Buyer(category),
            (Role::Buyer | Role::Seller, _) => Viewer::Anonymous,
        }
    }

    /// Whether the caller may manage listings.
    #[must_use]
    pub const fn can_sell(&self) -> bool {
        matches!(self.role, Role::Seller | Role::Staff)
    }

    /// Whether the caller may manage a listing owned by `seller`.
    #[must_use]
    pub fn can_manage(&self, seller: UserUuid) -> bool {
        match self.role {
            Role::Staff => true,
            Role::Seller => self.user == seller,
            Role::Buyer => false,
        }
    }
}

impl TryFrom<Claims> for Actor {
    type Error = AuthServiceError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if claims.role == Role::Buyer && claims.buyer_category.is_none() {
            return Err(AuthServiceError::MissingBuyerCategory);
        }

        Ok(Self {
            user: UserUuid::from_uuid(claims.sub),
            role: claims.role,
            buyer_category: match claims.role {
                Role::Buyer => claims.buyer_category,
                Role::Seller | Role::Staff => None,
            },
        })
    }
}
