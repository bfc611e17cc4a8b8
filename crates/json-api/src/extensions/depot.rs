//! Depot helper extensions.

use std::any::Any;

use mandi::buyers::Viewer;
use mandi_app::auth::Actor;
use salvo::prelude::{Depot, StatusError};

/// Helpers for reading request-scoped values out of the depot.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// Record the authenticated caller.
    fn insert_actor(&mut self, actor: Actor);

    /// The authenticated caller, or 401 when the request carried no valid token.
    fn actor_or_401(&self) -> Result<Actor, StatusError>;

    /// How the caller sees marketplace listings; anonymous without a token.
    fn viewer(&self) -> Viewer;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_actor(&mut self, actor: Actor) {
        self.inject(actor);
    }

    fn actor_or_401(&self) -> Result<Actor, StatusError> {
        self.obtain::<Actor>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized().brief("Missing bearer token"))
    }

    fn viewer(&self) -> Viewer {
        self.obtain::<Actor>()
            .map_or(Viewer::Anonymous, Actor::viewer)
    }
}
