//! Query root.

use async_graphql::{Context, ID, Object, Result};

use campfinder_core::{BootcampId, CourseId};

use super::context::caller;
use super::error::IntoGraphqlResult;
use super::types::{BootcampNode, CourseNode, UserNode};
use crate::services::{ServiceError, Services};

/// Parse a GraphQL id; ids that do not parse name nothing.
pub(crate) fn parse_id<T: std::str::FromStr>(id: &ID, entity: &'static str) -> Result<T> {
    id.parse::<T>()
        .map_err(|_| ServiceError::NotFound(entity))
        .gql()
}

#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object(name = "Query")]
impl QueryRoot {
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<UserNode>> {
        let services = ctx.data::<Services>()?;
        let users = services.users.list().await.gql()?;
        Ok(users.into_iter().map(UserNode).collect())
    }

    /// The authenticated caller.
    async fn user(&self, ctx: &Context<'_>) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        services
            .users
            .get_by_id(caller.user_id)
            .await
            .gql()
            .map(UserNode)
    }

    async fn bootcamps(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> Result<Vec<BootcampNode>> {
        let services = ctx.data::<Services>()?;
        let bootcamps = services.bootcamps.list(limit, page).await.gql()?;
        Ok(bootcamps.into_iter().map(BootcampNode).collect())
    }

    async fn bootcamp(&self, ctx: &Context<'_>, id: ID) -> Result<BootcampNode> {
        let services = ctx.data::<Services>()?;
        let id: BootcampId = parse_id(&id, "Bootcamp")?;
        services.bootcamps.get(id).await.gql().map(BootcampNode)
    }

    async fn courses(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> Result<Vec<CourseNode>> {
        let services = ctx.data::<Services>()?;
        let courses = services.courses.list(limit, page).await.gql()?;
        Ok(courses.into_iter().map(CourseNode).collect())
    }

    async fn course(&self, ctx: &Context<'_>, id: ID) -> Result<CourseNode> {
        let services = ctx.data::<Services>()?;
        let id: CourseId = parse_id(&id, "Course")?;
        services.courses.get(id).await.gql().map(CourseNode)
    }

    async fn bootcamp_courses(
        &self,
        ctx: &Context<'_>,
        bootcamp_id: ID,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> Result<Vec<CourseNode>> {
        let services = ctx.data::<Services>()?;
        let bootcamp: BootcampId = parse_id(&bootcamp_id, "Bootcamp")?;
        let courses = services
            .courses
            .list_by_bootcamp(bootcamp, limit, page)
            .await
            .gql()?;
        Ok(courses.into_iter().map(CourseNode).collect())
    }
}
