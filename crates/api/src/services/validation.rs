//! Field validation for user, bootcamp and course payloads.
//!
//! Error messages follow the `<Entity> validation failed: <field>: <message>`
//! shape clients match on.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use campfinder_core::{Career, Email, EmailError};

use super::error::ValidationError;
use crate::models::bootcamp::{BootcampDraft, BootcampFields};
use crate::models::course::{CourseDraft, CourseFields};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_NAME_LENGTH: usize = 50;
const MAX_DESCRIPTION_LENGTH: usize = 500;
const MIN_CREDITS: i32 = 1;
const MAX_CREDITS: i32 = 4;

const USER: &str = "User";
const BOOTCAMP: &str = "Bootcamp";
const COURSE: &str = "Course";

/// `http(s)://` URL with a dotted host.
static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
    )
    .expect("Invalid regex")
});

/// Ten-digit NANP number, digits only.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([2-9][0-9]{2})(([2-9])(1[02-9]|[02-9][0-9]))([0-9]{4})$").expect("Invalid regex")
});

/// Treat empty optional strings as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate a user's display name.
///
/// # Errors
///
/// Returns a `ValidationError` if the name is blank.
pub fn user_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(USER, "name", "Name is required"));
    }
    Ok(name.to_owned())
}

/// Validate and normalize a user's email.
///
/// # Errors
///
/// Returns a `ValidationError` if the email is blank or malformed.
pub fn user_email(email: &str) -> Result<Email, ValidationError> {
    Email::parse(email).map_err(|e| match e {
        EmailError::Empty => ValidationError::new(USER, "email", "Email is required"),
        _ => ValidationError::new(USER, "email", "Invalid email"),
    })
}

/// Validate a new password.
///
/// # Errors
///
/// Returns a `ValidationError` if the password is empty or too short.
pub fn password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new(USER, "password", "Password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new(
            USER,
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate a bootcamp draft.
///
/// # Errors
///
/// Returns the first failing field as a `ValidationError`.
pub fn bootcamp(draft: BootcampDraft) -> Result<BootcampFields, ValidationError> {
    let name = draft.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::new(BOOTCAMP, "name", "Name is required"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::new(
            BOOTCAMP,
            "name",
            format!("Name can have up to {MAX_NAME_LENGTH} characters"),
        ));
    }

    let description = draft.description.unwrap_or_default();
    if description.trim().is_empty() {
        return Err(ValidationError::new(
            BOOTCAMP,
            "description",
            "Description is required",
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::new(
            BOOTCAMP,
            "description",
            format!("Description can have up to {MAX_DESCRIPTION_LENGTH} characters"),
        ));
    }

    let website = non_empty(draft.website);
    if website.as_deref().is_some_and(|w| !WEBSITE_RE.is_match(w)) {
        return Err(ValidationError::new(
            BOOTCAMP,
            "website",
            "Use a valid URL with HTTP or HTTPS",
        ));
    }

    let phone = non_empty(draft.phone);
    if phone.as_deref().is_some_and(|p| !PHONE_RE.is_match(p)) {
        return Err(ValidationError::new(
            BOOTCAMP,
            "phone",
            "Add a valid phone number with only numbers",
        ));
    }

    let email = non_empty(draft.email)
        .map(|e| Email::parse(&e))
        .transpose()
        .map_err(|_| ValidationError::new(BOOTCAMP, "email", "Invalid email"))?;

    let address = non_empty(draft.address)
        .ok_or_else(|| ValidationError::new(BOOTCAMP, "address", "Address is required"))?;

    let mut careers: Vec<Career> = Vec::new();
    for career in draft.careers.unwrap_or_default() {
        if !careers.contains(&career) {
            careers.push(career);
        }
    }
    if careers.is_empty() {
        return Err(ValidationError::new(
            BOOTCAMP,
            "careers",
            "At least one career is required",
        ));
    }

    Ok(BootcampFields {
        name: name.to_owned(),
        description,
        website,
        phone,
        email,
        address,
        careers,
        housing: draft.housing.unwrap_or_default(),
        job_assistance: draft.job_assistance.unwrap_or_default(),
        job_guarantee: draft.job_guarantee.unwrap_or_default(),
        accept_gi: draft.accept_gi.unwrap_or_default(),
    })
}

/// Validate a course draft. Subject membership is checked by the course service.
///
/// # Errors
///
/// Returns the first failing field as a `ValidationError`.
pub fn course(draft: CourseDraft) -> Result<CourseFields, ValidationError> {
    let title = draft.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(ValidationError::new(COURSE, "title", "Title is required"));
    }

    let description = non_empty(draft.description).ok_or_else(|| {
        ValidationError::new(COURSE, "description", "Description is required")
    })?;

    let weeks = non_empty(draft.weeks)
        .ok_or_else(|| ValidationError::new(COURSE, "weeks", "Weeks is required"))?;

    let tuition = draft
        .tuition
        .ok_or_else(|| ValidationError::new(COURSE, "tuition", "Tuition cost is required"))?;
    if tuition < Decimal::ZERO {
        return Err(ValidationError::new(
            COURSE,
            "tuition",
            "Tuition cost can not be negative",
        ));
    }

    let minimum_skill = draft.minimum_skill.ok_or_else(|| {
        ValidationError::new(COURSE, "minimumSkill", "Minimum skill is required")
    })?;

    let credits = draft
        .credits
        .ok_or_else(|| ValidationError::new(COURSE, "credits", "Credits is required"))?;
    if credits < MIN_CREDITS {
        return Err(ValidationError::new(
            COURSE,
            "credits",
            "Credit must be at least 1",
        ));
    }
    if credits > MAX_CREDITS {
        return Err(ValidationError::new(
            COURSE,
            "credits",
            "Credit can not be more than 4",
        ));
    }

    let subject = draft
        .subject
        .ok_or_else(|| ValidationError::new(COURSE, "subject", "Subject is required"))?;

    Ok(CourseFields {
        title: title.to_owned(),
        description,
        weeks,
        tuition,
        minimum_skill,
        scholarship_available: draft.scholarship_available.unwrap_or_default(),
        credits,
        subject,
    })
}
