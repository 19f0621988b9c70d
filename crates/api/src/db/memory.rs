//! In-memory store for tests.
//!
//! Mirrors the constraints the `PostgreSQL` schema enforces: unique user
//! emails, unique bootcamp names, cascading deletes and set-valued
//! enrollment.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use campfinder_core::{BootcampId, CourseId, CreditTotals, Email, Pagination, UserId};

use super::{
    BOOTCAMPS_NAME_KEY, BootcampStore, CourseStore, RepositoryError, USERS_EMAIL_KEY, UserStore,
};
use crate::models::bootcamp::{Bootcamp, BootcampRecord};
use crate::models::course::{Course, CourseFields};
use crate::models::user::{NewUser, User};

#[derive(Default)]
struct Tables {
    next_id: i32,
    users: BTreeMap<UserId, User>,
    bootcamps: BTreeMap<BootcampId, Bootcamp>,
    courses: BTreeMap<CourseId, Course>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| &u.email == email && Some(u.id) != except)
    }

    fn name_taken(&self, name: &str, except: Option<BootcampId>) -> bool {
        self.bootcamps
            .values()
            .any(|b| b.name == name && Some(b.id) != except)
    }

    fn remove_bootcamp(&mut self, id: BootcampId) -> Option<Bootcamp> {
        let removed = self.bootcamps.remove(&id)?;
        self.courses.retain(|_, c| c.bootcamp != id);
        Some(removed)
    }
}

fn page_of<T: Clone>(items: impl Iterator<Item = T>, page: Pagination) -> Vec<T> {
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.skip(skip).take(take).collect()
}

/// Store backed by ordered maps behind a lock.
///
/// Ids are assigned from one counter shared by all tables, so ids of
/// different entity kinds never collide.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(RepositoryError::Conflict(USERS_EMAIL_KEY.to_owned()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(tables.next_id()),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            password_hash: user.password_hash.clone(),
            reset_password_token: None,
            reset_password_expire: None,
            confirm_email_token: None,
            is_email_confirmed: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn save_user(&self, user: &User) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(RepositoryError::Conflict(USERS_EMAIL_KEY.to_owned()));
        }

        let mut saved = user.clone();
        saved.updated_at = Utc::now();
        tables.users.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(removed) = tables.users.remove(&id) else {
            return Ok(None);
        };

        let owned: Vec<BootcampId> = tables
            .bootcamps
            .values()
            .filter(|b| b.user == id)
            .map(|b| b.id)
            .collect();
        for bootcamp in owned {
            tables.remove_bootcamp(bootcamp);
        }
        tables.courses.retain(|_, c| c.owner != id);
        for course in tables.courses.values_mut() {
            course.students.retain(|s| *s != id);
        }
        Ok(Some(removed))
    }
}

#[async_trait]
impl BootcampStore for MemoryStore {
    async fn insert_bootcamp(
        &self,
        owner: UserId,
        record: &BootcampRecord,
    ) -> Result<Bootcamp, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&record.fields.name, None) {
            return Err(RepositoryError::Conflict(BOOTCAMPS_NAME_KEY.to_owned()));
        }

        let now = Utc::now();
        let fields = record.fields.clone();
        let created = Bootcamp {
            id: BootcampId::new(tables.next_id()),
            name: fields.name,
            slug: record.slug.clone(),
            description: fields.description,
            website: fields.website,
            phone: fields.phone,
            email: fields.email,
            address: fields.address,
            location: Some(record.location.clone()),
            careers: fields.careers,
            average_cost: None,
            housing: fields.housing,
            job_assistance: fields.job_assistance,
            job_guarantee: fields.job_guarantee,
            accept_gi: fields.accept_gi,
            user: owner,
            created_at: now,
            updated_at: now,
        };
        tables.bootcamps.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_bootcamps(&self, page: Pagination) -> Result<Vec<Bootcamp>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(page_of(tables.bootcamps.values().cloned(), page))
    }

    async fn find_bootcamp(&self, id: BootcampId) -> Result<Option<Bootcamp>, RepositoryError> {
        Ok(self.tables.read().await.bootcamps.get(&id).cloned())
    }

    async fn find_bootcamp_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Option<Bootcamp>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .bootcamps
            .values()
            .find(|b| b.user == owner)
            .cloned())
    }

    async fn update_bootcamp(
        &self,
        id: BootcampId,
        record: &BootcampRecord,
    ) -> Result<Bootcamp, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&record.fields.name, Some(id)) {
            return Err(RepositoryError::Conflict(BOOTCAMPS_NAME_KEY.to_owned()));
        }
        let bootcamp = tables
            .bootcamps
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;

        let fields = record.fields.clone();
        bootcamp.name = fields.name;
        bootcamp.slug = record.slug.clone();
        bootcamp.description = fields.description;
        bootcamp.website = fields.website;
        bootcamp.phone = fields.phone;
        bootcamp.email = fields.email;
        bootcamp.address = fields.address;
        bootcamp.location = Some(record.location.clone());
        bootcamp.careers = fields.careers;
        bootcamp.housing = fields.housing;
        bootcamp.job_assistance = fields.job_assistance;
        bootcamp.job_guarantee = fields.job_guarantee;
        bootcamp.accept_gi = fields.accept_gi;
        bootcamp.updated_at = Utc::now();
        Ok(bootcamp.clone())
    }

    async fn set_average_cost(
        &self,
        id: BootcampId,
        average_cost: Option<Decimal>,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let bootcamp = tables
            .bootcamps
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        bootcamp.average_cost = average_cost;
        bootcamp.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_bootcamp(&self, id: BootcampId) -> Result<Option<Bootcamp>, RepositoryError> {
        Ok(self.tables.write().await.remove_bootcamp(id))
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn insert_course(
        &self,
        owner: UserId,
        bootcamp: BootcampId,
        fields: &CourseFields,
    ) -> Result<Course, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.bootcamps.contains_key(&bootcamp) {
            return Err(RepositoryError::NotFound);
        }

        let now = Utc::now();
        let fields = fields.clone();
        let created = Course {
            id: CourseId::new(tables.next_id()),
            title: fields.title,
            description: fields.description,
            weeks: fields.weeks,
            tuition: fields.tuition,
            minimum_skill: fields.minimum_skill,
            scholarship_available: fields.scholarship_available,
            credits: fields.credits,
            subject: fields.subject,
            bootcamp,
            students: Vec::new(),
            owner,
            created_at: now,
            updated_at: now,
        };
        tables.courses.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_courses(&self, page: Pagination) -> Result<Vec<Course>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(page_of(tables.courses.values().cloned(), page))
    }

    async fn list_courses_by_bootcamp(
        &self,
        bootcamp: BootcampId,
        page: Pagination,
    ) -> Result<Vec<Course>, RepositoryError> {
        let tables = self.tables.read().await;
        let courses = tables
            .courses
            .values()
            .filter(|c| c.bootcamp == bootcamp)
            .cloned();
        Ok(page_of(courses, page))
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, RepositoryError> {
        Ok(self.tables.read().await.courses.get(&id).cloned())
    }

    async fn update_course(
        &self,
        id: CourseId,
        fields: &CourseFields,
    ) -> Result<Course, RepositoryError> {
        let mut tables = self.tables.write().await;
        let course = tables.courses.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        let fields = fields.clone();
        course.title = fields.title;
        course.description = fields.description;
        course.weeks = fields.weeks;
        course.tuition = fields.tuition;
        course.minimum_skill = fields.minimum_skill;
        course.scholarship_available = fields.scholarship_available;
        course.credits = fields.credits;
        course.subject = fields.subject;
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn delete_course(&self, id: CourseId) -> Result<Option<Course>, RepositoryError> {
        Ok(self.tables.write().await.courses.remove(&id))
    }

    async fn credit_totals(&self, bootcamp: BootcampId) -> Result<CreditTotals, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(CreditTotals::from_courses(
            tables
                .courses
                .values()
                .filter(|c| c.bootcamp == bootcamp)
                .map(|c| (c.tuition, c.credits)),
        ))
    }

    async fn add_student(&self, course: CourseId, user: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&course)
            .ok_or(RepositoryError::NotFound)?;
        if course.students.contains(&user) {
            return Ok(false);
        }
        course.students.push(user);
        Ok(true)
    }

    async fn remove_student(
        &self,
        course: CourseId,
        user: UserId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&course)
            .ok_or(RepositoryError::NotFound)?;
        let before = course.students.len();
        course.students.retain(|s| *s != user);
        Ok(course.students.len() != before)
    }
}
