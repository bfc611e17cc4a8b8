//! Auth middleware.

use std::sync::Arc;

use mandi_app::auth::{Actor, AuthServiceError};
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::{debug, error};

use crate::{extensions::*, state::State};

/// Require a valid bearer token.
#[salvo::handler]
pub(crate) async fn required(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    authenticate_and_continue(req, depot, res, ctrl).await;
}

/// Accept anonymous callers, but reject a bearer token that does not verify.
#[salvo::handler]
pub(crate) async fn optional(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if req.headers().get(AUTHORIZATION).is_none() {
        ctrl.call_next(req, depot, res).await;

        return;
    }

    authenticate_and_continue(req, depot, res, ctrl).await;
}

async fn authenticate_and_continue(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));

        return;
    };

    match authenticate(depot, token).await {
        Ok(actor) => {
            depot.insert_actor(actor);

            ctrl.call_next(req, depot, res).await;
        }
        Err(error) => res.render(error),
    }
}

async fn authenticate(depot: &Depot, token: &str) -> Result<Actor, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .auth
        .authenticate_bearer(token)
        .await
        .map_err(|error| match error {
            AuthServiceError::InvalidToken(source) => {
                debug!("rejected bearer token: {source}");

                StatusError::unauthorized().brief("Invalid bearer token")
            }
            AuthServiceError::MissingBuyerCategory => {
                StatusError::unauthorized().brief("Buyer token has no buyer category")
            }
            AuthServiceError::Signing(source) => {
                error!("failed to process bearer token: {source}");

                StatusError::internal_server_error()
            }
            AuthServiceError::InvalidLifetime => {
                error!("bearer token lifetime rejected during verification");

                StatusError::internal_server_error()
            }
        })
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
