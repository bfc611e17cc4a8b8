//! Test context for service-level integration tests.

use crate::{database::Db, domain::listings::PgListingsService};

use super::db::TestDb;

pub(crate) struct TestContext {
    pub db: TestDb,
    pub listings: PgListingsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = TestDb::new().await;

        Self {
            listings: PgListingsService::new(Db::new(db.pool().clone())),
            db,
        }
    }
}
