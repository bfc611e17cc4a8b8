use clap::Args;
use jiff::SignedDuration;
use mandi::{buyers::BuyerCategory, listings::UserUuid};
use mandi_app::auth::{Actor, JwtConfig, JwtKeys, Role};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    /// Secret used to sign bearer tokens
    #[arg(long, env = "AUTH_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Issuer claim expected by the API
    #[arg(long, env = "AUTH_JWT_ISSUER", default_value = "mandi")]
    jwt_issuer: String,

    /// Role granted by the token (seller, buyer, staff)
    #[arg(long)]
    role: Role,

    /// Buyer category, required for buyer tokens
    #[arg(long)]
    buyer_category: Option<BuyerCategory>,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,

    /// Token lifetime in hours
    #[arg(long, default_value_t = 24)]
    ttl_hours: i64,
}

pub(crate) fn run(args: CreateTokenArgs) -> Result<(), String> {
    let user = args.user_uuid.map_or_else(UserUuid::new, UserUuid::from_uuid);

    let actor = match (args.role, args.buyer_category) {
        (Role::Buyer, Some(category)) => Actor::buyer(user, category),
        (Role::Buyer, None) => return Err("buyer tokens need --buyer-category".to_string()),
        (Role::Seller, _) => Actor::seller(user),
        (Role::Staff, _) => Actor::staff(user),
    };

    let keys = JwtKeys::new(&JwtConfig {
        secret: args.jwt_secret,
        issuer: args.jwt_issuer,
    });

    let token = keys
        .sign(&actor, SignedDuration::from_hours(args.ttl_hours))
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("user_uuid: {}", actor.user);
    println!("role: {}", actor.role);
    if let Some(category) = actor.buyer_category {
        println!("buyer_category: {category}");
    }
    println!("bearer_token: {token}");

    Ok(())
}
