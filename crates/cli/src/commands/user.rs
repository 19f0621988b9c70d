//! Account bootstrap commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a publisher account (password read from CAMPFINDER_USER_PASSWORD)
//! campfinder-cli user create -e owner@example.com -n "Owner Name" -r publisher
//! ```
//!
//! The same validation and hashing as the `addNewUser` mutation apply.

use campfinder_api::db::{PgUserRepository, RepositoryError, UserStore};
use campfinder_api::models::user::NewUser;
use campfinder_api::services::auth::{AuthError, hash_secret};
use campfinder_api::services::error::ValidationError;
use campfinder_api::services::validation;
use campfinder_core::Role;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use super::migrate::{MigrationError, database_url};

/// Errors that can occur while creating a user.
#[derive(Debug, Error)]
pub enum UserCommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid role: {0}. Valid roles: user, publisher")]
    InvalidRole(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    #[error(transparent)]
    Migration(MigrationError),
}

impl From<MigrationError> for UserCommandError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::MissingEnvVar(key) => Self::MissingEnvVar(key),
            other => Self::Migration(other),
        }
    }
}

/// Create a user account.
///
/// # Returns
///
/// The id of the created user.
///
/// # Errors
///
/// Returns an error on invalid input, a taken email or a database failure.
pub async fn create(email: &str, name: &str, role: &str) -> Result<i32, UserCommandError> {
    dotenvy::dotenv().ok();

    let role: Role = role
        .parse()
        .map_err(|_| UserCommandError::InvalidRole(role.to_owned()))?;

    let password = std::env::var("CAMPFINDER_USER_PASSWORD")
        .map_err(|_| UserCommandError::MissingEnvVar("CAMPFINDER_USER_PASSWORD"))?;

    let name = validation::user_name(name)?;
    let email = validation::user_email(email)?;
    validation::password(&password)?;
    let password_hash = hash_secret(&password)?;

    let database_url = database_url()?;
    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;
    let store = PgUserRepository::new(pool);

    if store.find_user_by_email(&email).await?.is_some() {
        return Err(UserCommandError::UserExists(email.to_string()));
    }

    tracing::info!("Creating user: {} ({})", email, role);
    let user = store
        .insert_user(&NewUser {
            name,
            email,
            role,
            password_hash,
        })
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id.as_i32())
}
