//! Bootcamp domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use campfinder_core::{BootcampId, Career, Email, FieldPatch, Slug, UserId};

/// Structured location derived from a bootcamp's address.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// GeoJSON geometry type, always `Point`.
    pub kind: String,
    /// `[longitude, latitude]`.
    pub coordinates: [f64; 2],
    pub formatted_address: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

impl Location {
    /// GeoJSON geometry type used for every location.
    pub const POINT: &'static str = "Point";

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// A bootcamp listing owned by one publisher.
#[derive(Debug, Clone)]
pub struct Bootcamp {
    pub id: BootcampId,
    pub name: String,
    /// Derived from `name` on every save.
    pub slug: Slug,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    /// Canonical address as returned by the geocoder.
    pub address: String,
    /// Derived from `address` on every save.
    pub location: Option<Location>,
    pub careers: Vec<Career>,
    /// Credit-weighted mean tuition of the bootcamp's courses.
    pub average_cost: Option<Decimal>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    /// Owning publisher.
    pub user: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-editable bootcamp fields before validation.
///
/// Used both as the creation payload and as the working copy an update patch
/// is applied to, so required fields are optional here and checked by
/// validation.
#[derive(Debug, Clone, Default)]
pub struct BootcampDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<Career>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl BootcampDraft {
    /// Working copy of a stored bootcamp.
    #[must_use]
    pub fn from_existing(bootcamp: &Bootcamp) -> Self {
        Self {
            name: Some(bootcamp.name.clone()),
            description: Some(bootcamp.description.clone()),
            website: bootcamp.website.clone(),
            phone: bootcamp.phone.clone(),
            email: bootcamp.email.as_ref().map(|e| e.as_str().to_owned()),
            address: Some(bootcamp.address.clone()),
            careers: Some(bootcamp.careers.clone()),
            housing: Some(bootcamp.housing),
            job_assistance: Some(bootcamp.job_assistance),
            job_guarantee: Some(bootcamp.job_guarantee),
            accept_gi: Some(bootcamp.accept_gi),
        }
    }

    /// Apply a partial update.
    #[must_use]
    pub fn apply(mut self, patch: BootcampPatch) -> Self {
        patch.name.apply_to(&mut self.name);
        patch.description.apply_to(&mut self.description);
        patch.website.apply_to(&mut self.website);
        patch.phone.apply_to(&mut self.phone);
        patch.email.apply_to(&mut self.email);
        patch.address.apply_to(&mut self.address);
        patch.careers.apply_to(&mut self.careers);
        patch.housing.apply_to(&mut self.housing);
        patch.job_assistance.apply_to(&mut self.job_assistance);
        patch.job_guarantee.apply_to(&mut self.job_guarantee);
        patch.accept_gi.apply_to(&mut self.accept_gi);
        self
    }
}

/// Partial bootcamp update.
#[derive(Debug, Clone, Default)]
pub struct BootcampPatch {
    pub name: FieldPatch<String>,
    pub description: FieldPatch<String>,
    pub website: FieldPatch<String>,
    pub phone: FieldPatch<String>,
    pub email: FieldPatch<String>,
    pub address: FieldPatch<String>,
    pub careers: FieldPatch<Vec<Career>>,
    pub housing: FieldPatch<bool>,
    pub job_assistance: FieldPatch<bool>,
    pub job_guarantee: FieldPatch<bool>,
    pub accept_gi: FieldPatch<bool>,
}

/// Validated caller-editable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct BootcampFields {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub address: String,
    pub careers: Vec<Career>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

/// Everything written to the store on a bootcamp save.
///
/// Produced by running the save hooks over validated fields: the slug is
/// derived from the name and `fields.address` has already been replaced by
/// the geocoder's formatted address.
#[derive(Debug, Clone, PartialEq)]
pub struct BootcampRecord {
    pub fields: BootcampFields,
    pub slug: Slug,
    pub location: Location,
}
