//! Courses, enrollment and the average-cost trigger.

use std::sync::Arc;

use tracing::instrument;

use campfinder_core::{BootcampId, CourseId, Pagination, UserId};

use super::bootcamps::BootcampService;
use super::error::ServiceError;
use super::validation;
use crate::db::{CourseStore, RepositoryError, UserStore};
use crate::models::bootcamp::Bootcamp;
use crate::models::course::{Course, CourseDraft, CourseFields, CoursePatch, NewCourse};
use crate::models::user::CallerIdentity;

const ENTITY: &str = "Course";

fn map_missing_course(e: RepositoryError) -> ServiceError {
    match e {
        RepositoryError::NotFound => ServiceError::NotFound(ENTITY),
        e => e.into(),
    }
}

/// Reject a subject the parent bootcamp does not offer.
fn check_subject(bootcamp: &Bootcamp, fields: &CourseFields) -> Result<(), ServiceError> {
    if bootcamp.careers.contains(&fields.subject) {
        Ok(())
    } else {
        Err(ServiceError::InvalidSubject {
            bootcamp: bootcamp.id,
            subject: fields.subject,
        })
    }
}

/// Course entity service.
#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn CourseStore>,
    users: Arc<dyn UserStore>,
    bootcamps: BootcampService,
}

impl CourseService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CourseStore>,
        users: Arc<dyn UserStore>,
        bootcamps: BootcampService,
    ) -> Self {
        Self {
            store,
            users,
            bootcamps,
        }
    }

    /// Recompute the parent's average cost. Failures are logged, never returned.
    async fn refresh_average_cost(&self, bootcamp: BootcampId) {
        if let Err(e) = self.bootcamps.recompute_average_cost(bootcamp).await {
            tracing::error!(bootcamp_id = %bootcamp, error = %e, "Failed to update average cost");
        }
    }

    /// One page of courses ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `limit` or `page` is not positive.
    pub async fn list(
        &self,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> Result<Vec<Course>, ServiceError> {
        let page = Pagination::from_optional(limit, page)?;
        Ok(self.store.list_courses(page).await?)
    }

    /// One page of a bootcamp's courses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the bootcamp does not exist and
    /// `InvalidArgument` for bad pagination.
    pub async fn list_by_bootcamp(
        &self,
        bootcamp: BootcampId,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> Result<Vec<Course>, ServiceError> {
        let page = Pagination::from_optional(limit, page)?;
        self.bootcamps.get(bootcamp).await?;
        Ok(self.store.list_courses_by_bootcamp(bootcamp, page).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no course has this id.
    pub async fn get(&self, id: CourseId) -> Result<Course, ServiceError> {
        self.store
            .find_course(id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    /// Create a course under an existing bootcamp.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown bootcamp, `Validation` for bad
    /// fields and `InvalidSubject` for a subject the bootcamp lacks.
    #[instrument(skip(self, course), fields(owner = %owner, bootcamp_id = %course.bootcamp))]
    pub async fn create(&self, owner: UserId, course: NewCourse) -> Result<Course, ServiceError> {
        let bootcamp = self.bootcamps.get(course.bootcamp).await?;

        let fields = validation::course(course.draft)?;
        check_subject(&bootcamp, &fields)?;

        let created = self
            .store
            .insert_course(owner, bootcamp.id, &fields)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("Bootcamp"),
                e => e.into(),
            })?;

        tracing::info!(course_id = %created.id, "Course created");
        self.refresh_average_cost(created.bootcamp).await;
        Ok(created)
    }

    async fn owned(&self, caller: &CallerIdentity, id: CourseId) -> Result<Course, ServiceError> {
        let course = self.get(id).await?;
        if course.owner != caller.user_id {
            tracing::warn!(course_id = %id, caller = %caller.user_id, "Course ownership check failed");
            return Err(ServiceError::PermissionDenied);
        }
        Ok(course)
    }

    /// Apply a partial update. The parent bootcamp never changes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `PermissionDenied` for a non-owner, `Validation`
    /// or `InvalidSubject`.
    #[instrument(skip(self, caller, patch), fields(course_id = %id, caller = %caller.user_id))]
    pub async fn update(
        &self,
        caller: &CallerIdentity,
        id: CourseId,
        patch: CoursePatch,
    ) -> Result<Course, ServiceError> {
        let existing = self.owned(caller, id).await?;

        let fields = validation::course(CourseDraft::from_existing(&existing).apply(patch))?;
        let bootcamp = self.bootcamps.get(existing.bootcamp).await?;
        check_subject(&bootcamp, &fields)?;

        let updated = self
            .store
            .update_course(id, &fields)
            .await
            .map_err(map_missing_course)?;

        tracing::info!(course_id = %updated.id, "Course updated");
        self.refresh_average_cost(updated.bootcamp).await;
        Ok(updated)
    }

    /// Delete the caller's course, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `PermissionDenied` for a non-owner.
    #[instrument(skip(self, caller), fields(course_id = %id, caller = %caller.user_id))]
    pub async fn delete(&self, id: CourseId, caller: &CallerIdentity) -> Result<Course, ServiceError> {
        self.owned(caller, id).await?;

        let deleted = self
            .store
            .delete_course(id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;

        tracing::info!(course_id = %deleted.id, "Course deleted");
        self.refresh_average_cost(deleted.bootcamp).await;
        Ok(deleted)
    }

    async fn ensure_user(&self, user: UserId) -> Result<(), ServiceError> {
        match self.users.find_user(user).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound("User")),
        }
    }

    /// Add a student to a course.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user or course and
    /// `AlreadyEnrolled` if the user is already a student.
    #[instrument(skip(self), fields(user_id = %user, course_id = %course))]
    pub async fn enroll(&self, user: UserId, course: CourseId) -> Result<Course, ServiceError> {
        self.ensure_user(user).await?;

        let added = self
            .store
            .add_student(course, user)
            .await
            .map_err(map_missing_course)?;
        if !added {
            return Err(ServiceError::AlreadyEnrolled);
        }

        tracing::info!("Student enrolled");
        self.get(course).await
    }

    /// Remove a student from a course.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user or course and `NotEnrolled`
    /// if the user is not a student.
    #[instrument(skip(self), fields(user_id = %user, course_id = %course))]
    pub async fn disenroll(&self, user: UserId, course: CourseId) -> Result<Course, ServiceError> {
        self.ensure_user(user).await?;

        let removed = self
            .store
            .remove_student(course, user)
            .await
            .map_err(map_missing_course)?;
        if !removed {
            return Err(ServiceError::NotEnrolled);
        }

        tracing::info!("Student disenrolled");
        self.get(course).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use campfinder_core::{Career, Email, FieldPatch, MinimumSkill, Pagination, Role};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::{BootcampStore, MemoryStore, RepositoryError};
    use crate::models::bootcamp::{Bootcamp, BootcampDraft, BootcampRecord};
    use crate::models::user::NewUser;
    use crate::test_support::StaticGeocoder;

    struct Fixture {
        store: Arc<MemoryStore>,
        courses: CourseService,
        bootcamps: BootcampService,
        publisher: CallerIdentity,
        bootcamp: BootcampId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::default());
        fixture_on(store.clone(), store).await
    }

    async fn fixture_on(
        store: Arc<MemoryStore>,
        bootcamp_store: Arc<dyn BootcampStore>,
    ) -> Fixture {
        let bootcamps = BootcampService::new(
            bootcamp_store,
            store.clone(),
            Arc::new(StaticGeocoder::default()),
        );
        let courses = CourseService::new(store.clone(), store.clone(), bootcamps.clone());

        let owner = store
            .insert_user(&NewUser {
                name: "Publisher".to_owned(),
                email: Email::parse("publisher@email.com").unwrap(),
                role: Role::Publisher,
                password_hash: "hash".to_owned(),
            })
            .await
            .unwrap();
        let bootcamp = bootcamps
            .create(
                owner.id,
                BootcampDraft {
                    name: Some("Devworks Bootcamp".to_owned()),
                    description: Some("Devworks is a full stack bootcamp".to_owned()),
                    address: Some("233 Bay State Rd Boston MA 02215".to_owned()),
                    careers: Some(vec![Career::WebDevelopment, Career::UiUx]),
                    ..BootcampDraft::default()
                },
            )
            .await
            .unwrap();

        Fixture {
            publisher: CallerIdentity::from(&owner),
            store,
            courses,
            bootcamps,
            bootcamp: bootcamp.id,
        }
    }

    fn new_course(bootcamp: BootcampId, tuition: i64, credits: i32) -> NewCourse {
        NewCourse {
            bootcamp,
            draft: CourseDraft {
                title: Some("Front End Web Development".to_owned()),
                description: Some("This course will provide you with the fundamentals".to_owned()),
                weeks: Some("8".to_owned()),
                tuition: Some(Decimal::from(tuition)),
                minimum_skill: Some(MinimumSkill::Beginner),
                scholarship_available: Some(true),
                credits: Some(credits),
                subject: Some(Career::WebDevelopment),
            },
        }
    }

    /// Bootcamp store whose average cost writes always fail.
    struct FrozenAverageStore(Arc<MemoryStore>);

    #[async_trait]
    impl BootcampStore for FrozenAverageStore {
        async fn insert_bootcamp(
            &self,
            owner: UserId,
            record: &BootcampRecord,
        ) -> Result<Bootcamp, RepositoryError> {
            self.0.insert_bootcamp(owner, record).await
        }

        async fn list_bootcamps(
            &self,
            page: Pagination,
        ) -> Result<Vec<Bootcamp>, RepositoryError> {
            self.0.list_bootcamps(page).await
        }

        async fn find_bootcamp(
            &self,
            id: BootcampId,
        ) -> Result<Option<Bootcamp>, RepositoryError> {
            self.0.find_bootcamp(id).await
        }

        async fn find_bootcamp_by_owner(
            &self,
            owner: UserId,
        ) -> Result<Option<Bootcamp>, RepositoryError> {
            self.0.find_bootcamp_by_owner(owner).await
        }

        async fn update_bootcamp(
            &self,
            id: BootcampId,
            record: &BootcampRecord,
        ) -> Result<Bootcamp, RepositoryError> {
            self.0.update_bootcamp(id, record).await
        }

        async fn set_average_cost(
            &self,
            _id: BootcampId,
            _average_cost: Option<Decimal>,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::DataCorruption("average_cost is read-only".to_owned()))
        }

        async fn delete_bootcamp(
            &self,
            id: BootcampId,
        ) -> Result<Option<Bootcamp>, RepositoryError> {
            self.0.delete_bootcamp(id).await
        }
    }

    async fn average(f: &Fixture) -> Option<Decimal> {
        f.bootcamps.get(f.bootcamp).await.unwrap().average_cost
    }

    #[tokio::test]
    async fn test_average_cost_follows_courses() {
        let f = fixture().await;
        let owner = f.publisher.user_id;

        let first = f
            .courses
            .create(owner, new_course(f.bootcamp, 100, 2))
            .await
            .unwrap();
        assert_eq!(average(&f).await, Some(Decimal::from(100)));

        let second = f
            .courses
            .create(owner, new_course(f.bootcamp, 400, 2))
            .await
            .unwrap();
        assert_eq!(average(&f).await, Some(Decimal::from(250)));

        f.courses
            .update(
                &f.publisher,
                second.id,
                CoursePatch {
                    credits: FieldPatch::Value(4),
                    ..CoursePatch::default()
                },
            )
            .await
            .unwrap();
        // (100*2 + 400*4) / 6 = 300
        assert_eq!(average(&f).await, Some(Decimal::from(300)));

        f.courses.delete(first.id, &f.publisher).await.unwrap();
        f.courses.delete(second.id, &f.publisher).await.unwrap();
        assert_eq!(average(&f).await, None);
    }

    #[tokio::test]
    async fn test_average_cost_failure_keeps_course_changes() {
        let store = Arc::new(MemoryStore::default());
        let f = fixture_on(store.clone(), Arc::new(FrozenAverageStore(store))).await;
        let owner = f.publisher.user_id;

        let course = f
            .courses
            .create(owner, new_course(f.bootcamp, 100, 2))
            .await
            .unwrap();
        assert_eq!(average(&f).await, None);

        let updated = f
            .courses
            .update(
                &f.publisher,
                course.id,
                CoursePatch {
                    credits: FieldPatch::Value(4),
                    ..CoursePatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.credits, 4);

        f.courses.delete(course.id, &f.publisher).await.unwrap();
        assert!(matches!(
            f.courses.get(course.id).await.unwrap_err(),
            ServiceError::NotFound("Course")
        ));
        assert_eq!(average(&f).await, None);
    }

    #[tokio::test]
    async fn test_subject_must_match_careers() {
        let f = fixture().await;
        let mut course = new_course(f.bootcamp, 100, 1);
        course.draft.subject = Some(Career::DataScience);

        let err = f
            .courses
            .create(f.publisher.user_id, course)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Bootcamp {} does not have Data Science career", f.bootcamp)
        );
    }

    #[tokio::test]
    async fn test_create_unknown_bootcamp() {
        let f = fixture().await;
        let err = f
            .courses
            .create(f.publisher.user_id, new_course(BootcampId::new(9999), 100, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Bootcamp")));
    }

    #[tokio::test]
    async fn test_update_revalidates_subject() {
        let f = fixture().await;
        let course = f
            .courses
            .create(f.publisher.user_id, new_course(f.bootcamp, 100, 1))
            .await
            .unwrap();

        let err = f
            .courses
            .update(
                &f.publisher,
                course.id,
                CoursePatch {
                    subject: FieldPatch::Value(Career::Business),
                    ..CoursePatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_SUBJECT");
    }

    #[tokio::test]
    async fn test_only_owner_mutates() {
        let f = fixture().await;
        let course = f
            .courses
            .create(f.publisher.user_id, new_course(f.bootcamp, 100, 1))
            .await
            .unwrap();
        let stranger = CallerIdentity {
            user_id: UserId::new(4242),
            role: Role::Publisher,
            email: Email::parse("stranger@email.com").unwrap(),
        };

        assert!(matches!(
            f.courses.delete(course.id, &stranger).await.unwrap_err(),
            ServiceError::PermissionDenied
        ));
        assert!(matches!(
            f.courses
                .update(&stranger, course.id, CoursePatch::default())
                .await
                .unwrap_err(),
            ServiceError::PermissionDenied
        ));
    }

    #[tokio::test]
    async fn test_enrollment_membership() {
        let f = fixture().await;
        let course = f
            .courses
            .create(f.publisher.user_id, new_course(f.bootcamp, 100, 1))
            .await
            .unwrap();
        let student = f.publisher.user_id;

        let enrolled = f.courses.enroll(student, course.id).await.unwrap();
        assert!(enrolled.has_student(student));

        let err = f.courses.enroll(student, course.id).await.unwrap_err();
        assert_eq!(err.to_string(), "User is already enrolled in this course");

        let left = f.courses.disenroll(student, course.id).await.unwrap();
        assert!(!left.has_student(student));

        let err = f.courses.disenroll(student, course.id).await.unwrap_err();
        assert_eq!(err.to_string(), "User is not enrolled in this course");
    }

    #[tokio::test]
    async fn test_enroll_unknown_entities() {
        let f = fixture().await;
        let course = f
            .courses
            .create(f.publisher.user_id, new_course(f.bootcamp, 100, 1))
            .await
            .unwrap();

        assert!(matches!(
            f.courses
                .enroll(UserId::new(9999), course.id)
                .await
                .unwrap_err(),
            ServiceError::NotFound("User")
        ));
        assert!(matches!(
            f.courses
                .enroll(f.publisher.user_id, CourseId::new(9999))
                .await
                .unwrap_err(),
            ServiceError::NotFound("Course")
        ));
    }

    #[tokio::test]
    async fn test_list_by_bootcamp() {
        let f = fixture().await;
        f.courses
            .create(f.publisher.user_id, new_course(f.bootcamp, 100, 1))
            .await
            .unwrap();

        let courses = f
            .courses
            .list_by_bootcamp(f.bootcamp, None, None)
            .await
            .unwrap();
        assert_eq!(courses.len(), 1);

        assert!(matches!(
            f.courses
                .list_by_bootcamp(BootcampId::new(9999), None, None)
                .await
                .unwrap_err(),
            ServiceError::NotFound("Bootcamp")
        ));
        assert!(f.courses.list(Some(1), Some(0)).await.is_err());
    }

    #[tokio::test]
    async fn test_deleting_bootcamp_removes_courses() {
        let f = fixture().await;
        let course = f
            .courses
            .create(f.publisher.user_id, new_course(f.bootcamp, 100, 1))
            .await
            .unwrap();

        f.bootcamps.delete(f.bootcamp, &f.publisher).await.unwrap();
        assert!(f.store.find_bootcamp(f.bootcamp).await.unwrap().is_none());
        assert!(matches!(
            f.courses.get(course.id).await.unwrap_err(),
            ServiceError::NotFound("Course")
        ));
    }
}
