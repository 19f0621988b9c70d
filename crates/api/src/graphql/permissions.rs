//! Schema extension enforcing the root-field rule table.

use std::sync::Arc;

use async_graphql::extensions::{Extension, ExtensionContext, ExtensionFactory, NextResolve, ResolveInfo};
use async_graphql::{ServerError, ServerResult, Value};

use super::context::RequestContext;
use super::error::NOT_AUTHORISED;
use crate::services::Services;
use crate::services::permissions::{Rule, authorize, rule_for};

/// Checks every `Query` and `Mutation` field against [`rule_for`].
///
/// Denials surface as `Not Authorised!`; the reason is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissions;

impl ExtensionFactory for Permissions {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(PermissionsExtension)
    }
}

struct PermissionsExtension;

fn denied() -> ServerError {
    ServerError::new(NOT_AUTHORISED, None)
}

#[async_trait::async_trait]
impl Extension for PermissionsExtension {
    async fn resolve(
        &self,
        ctx: &ExtensionContext<'_>,
        info: ResolveInfo<'_>,
        next: NextResolve<'_>,
    ) -> ServerResult<Option<Value>> {
        let rule = match info.parent_type {
            "Query" | "Mutation" => rule_for(info.parent_type, info.name),
            _ => Rule::Public,
        };
        if rule == Rule::Public {
            return next.run(ctx, info).await;
        }

        let (Some(request), Some(services)) = (
            ctx.data_opt::<RequestContext>(),
            ctx.data_opt::<Services>(),
        ) else {
            tracing::warn!(field = info.name, "Request context missing");
            return Err(denied());
        };

        let caller = match request.authenticate(&services.auth).await {
            Ok(caller) => caller,
            Err(e) => {
                tracing::warn!(field = info.name, error = %e, "Authentication failed");
                return Err(denied());
            }
        };

        if !authorize(caller, rule) {
            tracing::warn!(
                field = info.name,
                user_id = %caller.user_id,
                role = %caller.role,
                "Operation not permitted for role"
            );
            return Err(denied());
        }

        next.run(ctx, info).await
    }
}
