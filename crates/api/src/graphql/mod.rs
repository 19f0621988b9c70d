//! GraphQL schema.
//!
//! Resolvers are thin: they parse arguments, read the caller from the
//! [`RequestContext`] and delegate to [`Services`]. Root-field permissions
//! are enforced by the [`Permissions`] extension before a resolver runs.

pub mod context;
pub mod error;
pub mod mutation;
pub mod permissions;
pub mod query;
pub mod types;

use async_graphql::{EmptySubscription, Schema};

pub use context::RequestContext;
pub use mutation::MutationRoot;
pub use permissions::Permissions;
pub use query::QueryRoot;

use crate::services::Services;

/// The Campfinder schema type.
pub type CampfinderSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around a set of services.
#[must_use]
pub fn build_schema(services: Services) -> CampfinderSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(services)
        .extension(Permissions)
        .finish()
}
