//! Business logic for the Campfinder API.
//!
//! # Services
//!
//! - `auth` - Secret hashing and signed session tokens
//! - `permissions` - Bearer-token authentication and role rules
//! - `users` - Accounts, login and one-time code flows
//! - `bootcamps` - Listings, ownership and average cost
//! - `courses` - Courses and enrollment
//! - `hooks` - Slug and location derivation on bootcamp save
//! - `validation` - Field rules and messages
//! - `email` - Mail delivery (SMTP)
//! - `geocoder` - Address geocoding (`MapQuest`)

pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod email;
pub mod error;
pub mod geocoder;
pub mod hooks;
pub mod permissions;
pub mod users;
pub mod validation;

use std::sync::Arc;

use sqlx::PgPool;

pub use bootcamps::BootcampService;
pub use courses::CourseService;
pub use error::ServiceError;
pub use permissions::Authenticator;
pub use users::UserService;

use auth::SessionTokens;
use email::Mailer;
use geocoder::Geocoder;

use crate::db::{
    BootcampStore, CourseStore, PgBootcampRepository, PgCourseRepository, PgUserRepository,
    UserStore,
};

/// Store handles injected into the services.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub bootcamps: Arc<dyn BootcampStore>,
    pub courses: Arc<dyn CourseStore>,
}

impl Stores {
    /// Use one backend for every entity.
    #[must_use]
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: UserStore + BootcampStore + CourseStore + 'static,
    {
        Self {
            users: store.clone(),
            bootcamps: store.clone(),
            courses: store,
        }
    }

    /// `PostgreSQL` repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            bootcamps: Arc::new(PgBootcampRepository::new(pool.clone())),
            courses: Arc::new(PgCourseRepository::new(pool.clone())),
        }
    }
}

/// Every entity service, wired to the same stores and collaborators.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub bootcamps: BootcampService,
    pub courses: CourseService,
    pub auth: Authenticator,
}

impl Services {
    #[must_use]
    pub fn new(
        stores: Stores,
        mailer: Arc<dyn Mailer>,
        geocoder: Arc<dyn Geocoder>,
        tokens: SessionTokens,
    ) -> Self {
        let bootcamps = BootcampService::new(
            stores.bootcamps.clone(),
            stores.courses.clone(),
            geocoder,
        );
        let courses = CourseService::new(
            stores.courses.clone(),
            stores.users.clone(),
            bootcamps.clone(),
        );
        let auth = Authenticator::new(tokens.clone(), stores.users.clone());
        let users = UserService::new(stores.users, mailer, tokens);

        Self {
            users,
            bootcamps,
            courses,
            auth,
        }
    }
}
