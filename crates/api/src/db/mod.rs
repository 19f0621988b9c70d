//! Persistence for users, bootcamps and courses.
//!
//! # Database: `campfinder`
//!
//! ## Tables
//!
//! - `users` - Accounts, password hashes and one-time token hashes
//! - `bootcamps` - Listings with derived slug, location and average cost
//! - `courses` - Courses, cascaded away with their bootcamp
//! - `course_students` - Enrollment membership
//!
//! Services depend on the [`UserStore`], [`BootcampStore`] and
//! [`CourseStore`] traits. Production wires the `Pg*Repository` types; tests
//! use [`MemoryStore`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p campfinder-cli -- migrate
//! ```

pub mod bootcamps;
pub mod courses;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use campfinder_core::{BootcampId, CourseId, CreditTotals, Email, Pagination, UserId};

use crate::models::bootcamp::{Bootcamp, BootcampRecord};
use crate::models::course::{Course, CourseFields};
use crate::models::user::{NewUser, User};

pub use bootcamps::PgBootcampRepository;
pub use courses::PgCourseRepository;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use users::PgUserRepository;

/// Unique index on `lower(users.email)`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";
/// Unique constraint on `bootcamps.name`.
pub const BOOTCAMPS_NAME_KEY: &str = "bootcamps_name_key";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation, carrying the constraint name.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Returns `true` if this is a violation of the named unique constraint.
    #[must_use]
    pub fn is_conflict_on(&self, constraint: &str) -> bool {
        matches!(self, Self::Conflict(name) if name == constraint)
    }
}

/// Map a sqlx error, turning unique violations into [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("unique").to_owned();
        return RepositoryError::Conflict(constraint);
    }
    RepositoryError::Database(e)
}

/// Map a sqlx error, turning foreign key violations into [`RepositoryError::NotFound`].
pub(crate) fn map_missing_reference(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user.
    ///
    /// Fails with `Conflict(USERS_EMAIL_KEY)` if the email is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// All users, ordered by id.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Users with the given ids, ordered by id. Unknown ids are skipped.
    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;

    /// Write every mutable field of `user`.
    ///
    /// Fails with `NotFound` if the user no longer exists and with
    /// `Conflict(USERS_EMAIL_KEY)` if the new email is taken.
    async fn save_user(&self, user: &User) -> Result<User, RepositoryError>;

    /// Delete a user, returning the removed row.
    async fn delete_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Bootcamp persistence.
#[async_trait]
pub trait BootcampStore: Send + Sync {
    /// Insert a bootcamp owned by `owner`.
    ///
    /// Fails with `Conflict(BOOTCAMPS_NAME_KEY)` if the name is taken.
    async fn insert_bootcamp(
        &self,
        owner: UserId,
        record: &BootcampRecord,
    ) -> Result<Bootcamp, RepositoryError>;

    /// One page of bootcamps, ordered by id.
    async fn list_bootcamps(&self, page: Pagination) -> Result<Vec<Bootcamp>, RepositoryError>;

    async fn find_bootcamp(&self, id: BootcampId) -> Result<Option<Bootcamp>, RepositoryError>;

    async fn find_bootcamp_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Option<Bootcamp>, RepositoryError>;

    /// Overwrite the caller-editable and hook-derived fields.
    ///
    /// Fails with `NotFound` or `Conflict(BOOTCAMPS_NAME_KEY)`.
    async fn update_bootcamp(
        &self,
        id: BootcampId,
        record: &BootcampRecord,
    ) -> Result<Bootcamp, RepositoryError>;

    /// Store a recomputed average cost. Fails with `NotFound`.
    async fn set_average_cost(
        &self,
        id: BootcampId,
        average_cost: Option<Decimal>,
    ) -> Result<(), RepositoryError>;

    /// Delete a bootcamp and its courses, returning the removed bootcamp.
    async fn delete_bootcamp(&self, id: BootcampId) -> Result<Option<Bootcamp>, RepositoryError>;
}

/// Course and enrollment persistence.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn insert_course(
        &self,
        owner: UserId,
        bootcamp: BootcampId,
        fields: &CourseFields,
    ) -> Result<Course, RepositoryError>;

    /// One page of courses, ordered by id.
    async fn list_courses(&self, page: Pagination) -> Result<Vec<Course>, RepositoryError>;

    /// One page of a bootcamp's courses, ordered by id.
    async fn list_courses_by_bootcamp(
        &self,
        bootcamp: BootcampId,
        page: Pagination,
    ) -> Result<Vec<Course>, RepositoryError>;

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, RepositoryError>;

    /// Overwrite the caller-editable fields. Fails with `NotFound`.
    async fn update_course(
        &self,
        id: CourseId,
        fields: &CourseFields,
    ) -> Result<Course, RepositoryError>;

    /// Delete a course, returning the removed row.
    async fn delete_course(&self, id: CourseId) -> Result<Option<Course>, RepositoryError>;

    /// Tuition and credit sums over every course of a bootcamp.
    async fn credit_totals(&self, bootcamp: BootcampId) -> Result<CreditTotals, RepositoryError>;

    /// Add a student. Returns `false` if they were already enrolled.
    ///
    /// Fails with `NotFound` for an unknown course.
    async fn add_student(&self, course: CourseId, user: UserId) -> Result<bool, RepositoryError>;

    /// Remove a student. Returns `false` if they were not enrolled.
    ///
    /// Fails with `NotFound` for an unknown course.
    async fn remove_student(&self, course: CourseId, user: UserId)
    -> Result<bool, RepositoryError>;
}
