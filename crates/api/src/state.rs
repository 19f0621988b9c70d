//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::graphql::{CampfinderSchema, build_schema};
use crate::services::Services;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    schema: CampfinderSchema,
    pool: Option<PgPool>,
}

impl AppState {
    /// State backed by Postgres; readiness checks the pool.
    #[must_use]
    pub fn new(services: Services, pool: PgPool) -> Self {
        Self::build(services, Some(pool))
    }

    /// State with no database to probe, for in-memory stores.
    #[must_use]
    pub fn without_database(services: Services) -> Self {
        Self::build(services, None)
    }

    fn build(services: Services, pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                schema: build_schema(services),
                pool,
            }),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &CampfinderSchema {
        &self.inner.schema
    }

    /// The database pool, if the stores are backed by one.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
