//! GraphQL object, enum and input types.
//!
//! Object types wrap the domain models; relations resolve through the
//! services held in schema data.

use async_graphql::{Context, Enum, ID, InputObject, MaybeUndefined, Object, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use campfinder_core::FieldPatch;

use super::error::{IntoGraphqlResult, invalid_input};
use crate::models::bootcamp::{Bootcamp, BootcampDraft, BootcampPatch, Location};
use crate::models::course::{Course, CourseDraft, CoursePatch};
use crate::models::user::User;
use crate::services::Services;

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "Role", remote = "campfinder_core::Role", rename_items = "lowercase")]
pub enum RoleValue {
    User,
    Publisher,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "Career", remote = "campfinder_core::Career")]
pub enum CareerValue {
    WebDevelopment,
    MobileDevelopment,
    UiUx,
    DataScience,
    Business,
    Other,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "MinimumSkill", remote = "campfinder_core::MinimumSkill")]
pub enum MinimumSkillValue {
    Beginner,
    Intermediate,
    Advanced,
}

fn careers(values: Vec<CareerValue>) -> Vec<campfinder_core::Career> {
    values.into_iter().map(Into::into).collect()
}

fn decimal_to_float(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Convert a client-supplied float to a decimal amount.
pub(crate) fn float_to_decimal(value: f64) -> Result<Decimal> {
    Decimal::try_from(value).map_err(|_| invalid_input("tuition", "Tuition must be a finite number"))
}

fn patch<T>(value: MaybeUndefined<T>) -> FieldPatch<T> {
    match value {
        MaybeUndefined::Undefined => FieldPatch::Absent,
        MaybeUndefined::Null => FieldPatch::Null,
        MaybeUndefined::Value(v) => FieldPatch::Value(v),
    }
}

/// A registered account. Credential fields are never exposed.
pub struct UserNode(pub User);

#[Object(name = "User")]
impl UserNode {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        self.0.email.as_str()
    }

    async fn role(&self) -> RoleValue {
        self.0.role.into()
    }

    async fn is_email_confirmed(&self) -> bool {
        self.0.is_email_confirmed
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

pub struct LocationNode(pub Location);

#[Object(name = "Location")]
impl LocationNode {
    /// Always `Point`.
    #[graphql(name = "type")]
    async fn kind(&self) -> &str {
        &self.0.kind
    }

    /// `[longitude, latitude]`.
    async fn coordinates(&self) -> Vec<f64> {
        self.0.coordinates.to_vec()
    }

    async fn formatted_address(&self) -> &str {
        &self.0.formatted_address
    }

    async fn street(&self) -> &str {
        &self.0.street
    }

    async fn city(&self) -> &str {
        &self.0.city
    }

    async fn state(&self) -> &str {
        &self.0.state
    }

    async fn zipcode(&self) -> &str {
        &self.0.zipcode
    }

    async fn country(&self) -> &str {
        &self.0.country
    }
}

pub struct BootcampNode(pub Bootcamp);

#[Object(name = "Bootcamp")]
impl BootcampNode {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn slug(&self) -> &str {
        self.0.slug.as_str()
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn website(&self) -> Option<&str> {
        self.0.website.as_deref()
    }

    async fn phone(&self) -> Option<&str> {
        self.0.phone.as_deref()
    }

    async fn email(&self) -> Option<&str> {
        self.0.email.as_ref().map(|e| e.as_str())
    }

    async fn address(&self) -> &str {
        &self.0.address
    }

    async fn location(&self) -> Option<LocationNode> {
        self.0.location.clone().map(LocationNode)
    }

    async fn careers(&self) -> Vec<CareerValue> {
        self.0.careers.iter().copied().map(Into::into).collect()
    }

    /// Credit-weighted mean tuition, null until the bootcamp has courses.
    async fn average_cost(&self) -> Option<f64> {
        self.0.average_cost.map(decimal_to_float)
    }

    async fn housing(&self) -> bool {
        self.0.housing
    }

    async fn job_assistance(&self) -> bool {
        self.0.job_assistance
    }

    async fn job_guarantee(&self) -> bool {
        self.0.job_guarantee
    }

    async fn accept_gi(&self) -> bool {
        self.0.accept_gi
    }

    /// Owning publisher.
    async fn user(&self, ctx: &Context<'_>) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        services.users.get_by_id(self.0.user).await.gql().map(UserNode)
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

pub struct CourseNode(pub Course);

#[Object(name = "Course")]
impl CourseNode {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn weeks(&self) -> &str {
        &self.0.weeks
    }

    async fn tuition(&self) -> f64 {
        decimal_to_float(self.0.tuition)
    }

    async fn minimum_skill(&self) -> MinimumSkillValue {
        self.0.minimum_skill.into()
    }

    async fn scholarship_available(&self) -> bool {
        self.0.scholarship_available
    }

    async fn credits(&self) -> i32 {
        self.0.credits
    }

    async fn subject(&self) -> CareerValue {
        self.0.subject.into()
    }

    async fn bootcamp(&self, ctx: &Context<'_>) -> Result<BootcampNode> {
        let services = ctx.data::<Services>()?;
        services
            .bootcamps
            .get(self.0.bootcamp)
            .await
            .gql()
            .map(BootcampNode)
    }

    async fn owner(&self, ctx: &Context<'_>) -> Result<UserNode> {
        let services = ctx.data::<Services>()?;
        services.users.get_by_id(self.0.owner).await.gql().map(UserNode)
    }

    /// Enrolled users. Deleted accounts are skipped.
    async fn students(&self, ctx: &Context<'_>) -> Result<Vec<UserNode>> {
        let services = ctx.data::<Services>()?;
        let users = services.users.get_many(&self.0.students).await.gql()?;
        Ok(users.into_iter().map(UserNode).collect())
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

#[derive(InputObject)]
pub struct NewBootcampInput {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<CareerValue>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl From<NewBootcampInput> for BootcampDraft {
    fn from(input: NewBootcampInput) -> Self {
        Self {
            name: Some(input.name),
            description: Some(input.description),
            website: input.website,
            phone: input.phone,
            email: input.email,
            address: Some(input.address),
            careers: Some(careers(input.careers)),
            housing: input.housing,
            job_assistance: input.job_assistance,
            job_guarantee: input.job_guarantee,
            accept_gi: input.accept_gi,
        }
    }
}

/// Partial bootcamp update. Omitted fields are untouched, `null` unsets.
#[derive(InputObject, Default)]
pub struct BootcampUpdateInput {
    pub name: MaybeUndefined<String>,
    pub description: MaybeUndefined<String>,
    pub website: MaybeUndefined<String>,
    pub phone: MaybeUndefined<String>,
    pub email: MaybeUndefined<String>,
    pub address: MaybeUndefined<String>,
    pub careers: MaybeUndefined<Vec<CareerValue>>,
    pub housing: MaybeUndefined<bool>,
    pub job_assistance: MaybeUndefined<bool>,
    pub job_guarantee: MaybeUndefined<bool>,
    pub accept_gi: MaybeUndefined<bool>,
}

impl From<BootcampUpdateInput> for BootcampPatch {
    fn from(input: BootcampUpdateInput) -> Self {
        Self {
            name: patch(input.name),
            description: patch(input.description),
            website: patch(input.website),
            phone: patch(input.phone),
            email: patch(input.email),
            address: patch(input.address),
            careers: patch(input.careers).map(careers),
            housing: patch(input.housing),
            job_assistance: patch(input.job_assistance),
            job_guarantee: patch(input.job_guarantee),
            accept_gi: patch(input.accept_gi),
        }
    }
}

#[derive(InputObject)]
pub struct NewCourseInput {
    pub bootcamp_id: ID,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkillValue,
    pub scholarship_available: Option<bool>,
    pub credits: i32,
    pub subject: CareerValue,
}

impl NewCourseInput {
    pub(crate) fn into_draft(self) -> Result<CourseDraft> {
        Ok(CourseDraft {
            title: Some(self.title),
            description: Some(self.description),
            weeks: Some(self.weeks),
            tuition: Some(float_to_decimal(self.tuition)?),
            minimum_skill: Some(self.minimum_skill.into()),
            scholarship_available: self.scholarship_available,
            credits: Some(self.credits),
            subject: Some(self.subject.into()),
        })
    }
}

/// Partial course update. The parent bootcamp cannot be changed.
#[derive(InputObject, Default)]
pub struct CourseUpdateInput {
    pub title: MaybeUndefined<String>,
    pub description: MaybeUndefined<String>,
    pub weeks: MaybeUndefined<String>,
    pub tuition: MaybeUndefined<f64>,
    pub minimum_skill: MaybeUndefined<MinimumSkillValue>,
    pub scholarship_available: MaybeUndefined<bool>,
    pub credits: MaybeUndefined<i32>,
    pub subject: MaybeUndefined<CareerValue>,
}

impl CourseUpdateInput {
    pub(crate) fn into_patch(self) -> Result<CoursePatch> {
        let tuition = match self.tuition {
            MaybeUndefined::Value(value) => FieldPatch::Value(float_to_decimal(value)?),
            MaybeUndefined::Null => FieldPatch::Null,
            MaybeUndefined::Undefined => FieldPatch::Absent,
        };

        Ok(CoursePatch {
            title: patch(self.title),
            description: patch(self.description),
            weeks: patch(self.weeks),
            tuition,
            minimum_skill: patch(self.minimum_skill).map(Into::into),
            scholarship_available: patch(self.scholarship_available),
            credits: patch(self.credits),
            subject: patch(self.subject).map(Into::into),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campfinder_core::Career;

    use super::*;

    #[test]
    fn test_update_input_keeps_null_and_absent_apart() {
        let input = BootcampUpdateInput {
            website: MaybeUndefined::Null,
            careers: MaybeUndefined::Value(vec![CareerValue::UiUx]),
            ..BootcampUpdateInput::default()
        };
        let patch = BootcampPatch::from(input);

        assert!(patch.name.is_absent());
        assert_eq!(patch.website, FieldPatch::Null);
        assert_eq!(patch.careers, FieldPatch::Value(vec![Career::UiUx]));
    }

    #[test]
    fn test_tuition_conversion() {
        assert_eq!(float_to_decimal(1250.5).unwrap(), Decimal::new(12505, 1));
        assert!(float_to_decimal(f64::NAN).is_err());
    }
}
