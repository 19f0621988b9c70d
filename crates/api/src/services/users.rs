//! User accounts, login and one-time code flows.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::instrument;

use campfinder_core::{Email, UserId};

use super::auth::{SessionTokens, hash_secret, verify_secret};
use super::email::{Mailer, OutgoingMail, generate_one_time_code};
use super::error::{
    CREDENTIALS_REJECTED, LOGIN_FAILED, OneTimeTokenError, ServiceError, ValidationError,
};
use super::hooks::is_expired;
use super::validation;
use crate::db::{RepositoryError, USERS_EMAIL_KEY, UserStore};
use crate::models::user::{NewUser, ProfileUpdate, TokenPurpose, User, UserRegistration};

/// Lifetime of a password-reset code.
const RESET_TOKEN_TTL: Duration = Duration::hours(1);

const ENTITY: &str = "User";

/// Translate a duplicate-email conflict into the validation message clients see.
fn map_email_conflict(e: RepositoryError) -> ServiceError {
    if e.is_conflict_on(USERS_EMAIL_KEY) {
        ValidationError::new(ENTITY, "email", "Email already in use").into()
    } else {
        e.into()
    }
}

/// User entity service.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    tokens: SessionTokens,
}

impl UserService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>, tokens: SessionTokens) -> Self {
        Self {
            store,
            mailer,
            tokens,
        }
    }

    /// Session token issuer shared with the authorization layer.
    #[must_use]
    pub const fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad fields or a duplicate email.
    #[instrument(skip(self, registration), fields(email = %registration.email, role = %registration.role))]
    pub async fn create(&self, registration: UserRegistration) -> Result<User, ServiceError> {
        let name = validation::user_name(&registration.name)?;
        let email = validation::user_email(&registration.email)?;
        validation::password(&registration.password)?;

        let new_user = NewUser {
            name,
            email,
            role: registration.role,
            password_hash: hash_secret(&registration.password)?,
        };

        let user = self
            .store
            .insert_user(&new_user)
            .await
            .map_err(map_email_conflict)?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// All users ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `Repository` on storage failure.
    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list_users().await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no user has this id.
    pub async fn get_by_id(&self, id: UserId) -> Result<User, ServiceError> {
        self.store
            .find_user(id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    /// Load several users, skipping unknown ids.
    ///
    /// # Errors
    ///
    /// Returns `Repository` on storage failure.
    pub async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.find_users(ids).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        // An address that does not parse cannot belong to anyone.
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        Ok(self.store.find_user_by_email(&email).await?)
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown email or a wrong password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Err(ServiceError::InvalidCredentials(LOGIN_FAILED));
        };

        if !verify_secret(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "Login rejected");
            return Err(ServiceError::InvalidCredentials(LOGIN_FAILED));
        }

        Ok(self.tokens.issue(user.id)?)
    }

    /// Mail a fresh one-time code and store its hash once delivery succeeds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown email and `Delivery` if the mail
    /// cannot be sent. Nothing is persisted in either case.
    #[instrument(skip(self))]
    pub async fn send_one_time_token(
        &self,
        email: &str,
        purpose: TokenPurpose,
    ) -> Result<(), ServiceError> {
        let mut user = self
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;

        let code = generate_one_time_code();
        let hash = hash_secret(&code)?;

        let mail = OutgoingMail::one_time_token(user.email.clone(), purpose, &code)?;
        self.mailer.send_mail(mail).await?;

        match purpose {
            TokenPurpose::ResetPassword => {
                user.reset_password_token = Some(hash);
                user.reset_password_expire = Some(Utc::now() + RESET_TOKEN_TTL);
            }
            TokenPurpose::ConfirmEmail => {
                user.confirm_email_token = Some(hash);
            }
        }
        self.store.save_user(&user).await?;

        tracing::info!(user_id = %user.id, purpose = %purpose, "One-time token sent");
        Ok(())
    }

    /// Set a new password using a reset code.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown email, `OneTimeToken` for a missing,
    /// wrong or expired code and `Validation` for a bad new password.
    #[instrument(skip(self, new_password, token))]
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
        token: &str,
    ) -> Result<User, ServiceError> {
        let mut user = self
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;

        let matches = user
            .reset_password_token
            .as_deref()
            .is_some_and(|hash| verify_secret(token, hash));
        if !matches {
            return Err(OneTimeTokenError::Invalid(TokenPurpose::ResetPassword).into());
        }
        if is_expired(user.reset_password_expire, Utc::now()) {
            return Err(OneTimeTokenError::Expired.into());
        }

        validation::password(new_password)?;
        user.password_hash = hash_secret(new_password)?;
        user.reset_password_token = None;
        user.reset_password_expire = None;

        let user = self.store.save_user(&user).await?;
        tracing::info!(user_id = %user.id, "Password reset");
        Ok(user)
    }

    /// Mark the email confirmed using a confirmation code.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown email and `OneTimeToken` for a
    /// missing or wrong code.
    #[instrument(skip(self, token))]
    pub async fn confirm_email(&self, email: &str, token: &str) -> Result<User, ServiceError> {
        let mut user = self
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;

        let Some(hash) = user.confirm_email_token.as_deref() else {
            return Err(OneTimeTokenError::Missing.into());
        };
        if !verify_secret(token, hash) {
            return Err(OneTimeTokenError::Invalid(TokenPurpose::ConfirmEmail).into());
        }

        user.is_email_confirmed = true;
        let user = self.store.save_user(&user).await?;

        tracing::info!(user_id = %user.id, "Email confirmed");
        Ok(user)
    }

    /// Change the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown email or a wrong current
    /// password and `Validation` for a bad new password.
    #[instrument(skip(self, new_password, current_password))]
    pub async fn update_password(
        &self,
        email: &str,
        new_password: &str,
        current_password: &str,
    ) -> Result<User, ServiceError> {
        let Some(mut user) = self.find_by_email(email).await? else {
            return Err(ServiceError::InvalidCredentials(CREDENTIALS_REJECTED));
        };
        if !verify_secret(current_password, &user.password_hash) {
            return Err(ServiceError::InvalidCredentials(CREDENTIALS_REJECTED));
        }

        validation::password(new_password)?;
        user.password_hash = hash_secret(new_password)?;

        let user = self.store.save_user(&user).await?;
        tracing::info!(user_id = %user.id, "Password updated");
        Ok(user)
    }

    /// Update name and/or email. Omitted keys are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and `Validation` for bad values
    /// or a duplicate email.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, ServiceError> {
        let mut user = self.get_by_id(id).await?;

        if let Some(name) = update.name {
            user.name = validation::user_name(&name)?;
        }
        if let Some(email) = update.email {
            user.email = validation::user_email(&email)?;
        }

        self.store.save_user(&user).await.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::NotFound(ENTITY),
            other => map_email_conflict(other),
        })
    }

    /// Hard-delete a user, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user has this id.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: UserId) -> Result<User, ServiceError> {
        let user = self
            .store
            .delete_user(id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;

        tracing::info!(user_id = %user.id, "User deleted");
        Ok(user)
    }
}
