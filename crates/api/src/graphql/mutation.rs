//! Mutation root.

use async_graphql::{Context, ID, Object, Result};

use campfinder_core::{BootcampId, CourseId};

use super::context::caller;
use super::error::IntoGraphqlResult;
use super::query::parse_id;
use super::types::{
    BootcampNode, BootcampUpdateInput, CourseNode, CourseUpdateInput, NewBootcampInput,
    NewCourseInput, RoleValue, UserNode,
};
use crate::models::course::NewCourse;
use crate::models::user::{ProfileUpdate, TokenPurpose, UserRegistration};
use crate::services::Services;

/// Reply sent once a one-time code is on its way.
const EMAIL_SENT: &str = "Email sent";

#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object(name = "Mutation")]
impl MutationRoot {
    async fn add_new_user(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        password: String,
        role: Option<RoleValue>,
    ) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        let registration = UserRegistration {
            name,
            email,
            role: role.map(Into::into).unwrap_or_default(),
            password,
        };
        services.users.create(registration).await.gql().map(UserNode)
    }

    /// Returns a session token.
    async fn login_user(&self, ctx: &Context<'_>, email: String, password: String) -> Result<String> {
        let services = ctx.data::<Services>()?;
        services.users.login(&email, &password).await.gql()
    }

    /// Mail a password-reset code.
    async fn forgot_password(&self, ctx: &Context<'_>, email: String) -> Result<String> {
        let services = ctx.data::<Services>()?;
        services
            .users
            .send_one_time_token(&email, TokenPurpose::ResetPassword)
            .await
            .gql()?;
        Ok(EMAIL_SENT.to_owned())
    }

    async fn reset_password(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
        token: String,
    ) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        services
            .users
            .reset_password(&email, &password, &token)
            .await
            .gql()
            .map(UserNode)
    }

    /// Mail an email-confirmation code to the caller.
    async fn send_confirm_email_token(&self, ctx: &Context<'_>) -> Result<String> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        services
            .users
            .send_one_time_token(caller.email.as_str(), TokenPurpose::ConfirmEmail)
            .await
            .gql()?;
        Ok(EMAIL_SENT.to_owned())
    }

    async fn confirm_email(&self, ctx: &Context<'_>, token: String) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        services
            .users
            .confirm_email(caller.email.as_str(), &token)
            .await
            .gql()
            .map(UserNode)
    }

    async fn update_password(
        &self,
        ctx: &Context<'_>,
        current_password: String,
        new_password: String,
    ) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        services
            .users
            .update_password(caller.email.as_str(), &new_password, &current_password)
            .await
            .gql()
            .map(UserNode)
    }

    /// Update the caller's name and/or email.
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        services
            .users
            .update_profile(caller.user_id, ProfileUpdate { name, email })
            .await
            .gql()
            .map(UserNode)
    }

    /// Delete the caller's account.
    async fn delete_user(&self, ctx: &Context<'_>) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        services.users.delete(caller.user_id).await.gql().map(UserNode)
    }

    async fn add_new_bootcamp(
        &self,
        ctx: &Context<'_>,
        input: NewBootcampInput,
    ) -> Result<BootcampNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        services
            .bootcamps
            .create(caller.user_id, input.into())
            .await
            .gql()
            .map(BootcampNode)
    }

    async fn update_bootcamp(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: BootcampUpdateInput,
    ) -> Result<BootcampNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        let id: BootcampId = parse_id(&id, "Bootcamp")?;
        services
            .bootcamps
            .update(&caller, id, input.into())
            .await
            .gql()
            .map(BootcampNode)
    }

    /// Returns the deleted bootcamp.
    async fn delete_bootcamp(&self, ctx: &Context<'_>, id: ID) -> Result<BootcampNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        let id: BootcampId = parse_id(&id, "Bootcamp")?;
        services
            .bootcamps
            .delete(id, &caller)
            .await
            .gql()
            .map(BootcampNode)
    }

    async fn add_new_course(&self, ctx: &Context<'_>, input: NewCourseInput) -> Result<CourseNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        let bootcamp: BootcampId = parse_id(&input.bootcamp_id, "Bootcamp")?;
        let course = NewCourse {
            bootcamp,
            draft: input.into_draft()?,
        };
        services
            .courses
            .create(caller.user_id, course)
            .await
            .gql()
            .map(CourseNode)
    }

    async fn update_course(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: CourseUpdateInput,
    ) -> Result<CourseNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        let id: CourseId = parse_id(&id, "Course")?;
        services
            .courses
            .update(&caller, id, input.into_patch()?)
            .await
            .gql()
            .map(CourseNode)
    }

    /// Returns the deleted course.
    async fn delete_course(&self, ctx: &Context<'_>, id: ID) -> Result<CourseNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        let id: CourseId = parse_id(&id, "Course")?;
        services
            .courses
            .delete(id, &caller)
            .await
            .gql()
            .map(CourseNode)
    }

    /// Enroll the caller in a course.
    async fn enroll_course(&self, ctx: &Context<'_>, course_id: ID) -> Result<CourseNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        let course: CourseId = parse_id(&course_id, "Course")?;
        services
            .courses
            .enroll(caller.user_id, course)
            .await
            .gql()
            .map(CourseNode)
    }

    /// Remove the caller from a course.
    async fn disenroll_course(&self, ctx: &Context<'_>, course_id: ID) -> Result<CourseNode> {
        let services = ctx.data::<Services>()?;
        let caller = caller(ctx)?;
        let course: CourseId = parse_id(&course_id, "Course")?;
        services
            .courses
            .disenroll(caller.user_id, course)
            .await
            .gql()
            .map(CourseNode)
    }
}
