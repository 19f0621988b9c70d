//! Course and enrollment repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use campfinder_core::{
    BootcampId, Career, CourseId, CreditTotals, MinimumSkill, Pagination, UserId,
};

use super::{CourseStore, RepositoryError, map_missing_reference};
use crate::models::course::{Course, CourseFields};

const COURSE_COLUMNS: &str = "c.id, c.title, c.description, c.weeks, c.tuition, \
     c.minimum_skill, c.scholarship_available, c.credits, c.subject, c.bootcamp_id, \
     c.owner_id, c.created_at, c.updated_at, \
     COALESCE((SELECT array_agg(cs.user_id ORDER BY cs.enrolled_at, cs.user_id) \
               FROM course_students cs WHERE cs.course_id = c.id), '{}') AS students";

#[derive(sqlx::FromRow)]
struct CourseRow {
    id: i32,
    title: String,
    description: String,
    weeks: String,
    tuition: Decimal,
    minimum_skill: String,
    scholarship_available: bool,
    credits: i32,
    subject: String,
    bootcamp_id: i32,
    owner_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    students: Vec<i32>,
}

impl TryFrom<CourseRow> for Course {
    type Error = RepositoryError;

    fn try_from(r: CourseRow) -> Result<Self, Self::Error> {
        let minimum_skill: MinimumSkill = r
            .minimum_skill
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;
        let subject: Career = r
            .subject
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e}")))?;

        Ok(Self {
            id: CourseId::new(r.id),
            title: r.title,
            description: r.description,
            weeks: r.weeks,
            tuition: r.tuition,
            minimum_skill,
            scholarship_available: r.scholarship_available,
            credits: r.credits,
            subject,
            bootcamp: BootcampId::new(r.bootcamp_id),
            students: r.students.into_iter().map(UserId::new).collect(),
            owner: UserId::new(r.owner_id),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// `PostgreSQL` implementation of [`CourseStore`].
#[derive(Clone)]
pub struct PgCourseRepository {
    pool: PgPool,
}

impl PgCourseRepository {
    /// Create a new course repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: i32) -> Result<Option<Course>, RepositoryError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = $1");
        let row: Option<CourseRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Course::try_from).transpose()
    }

    async fn course_exists(&self, id: CourseId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(id.as_i32())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl CourseStore for PgCourseRepository {
    async fn insert_course(
        &self,
        owner: UserId,
        bootcamp: BootcampId,
        fields: &CourseFields,
    ) -> Result<Course, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO courses (title, description, weeks, tuition, minimum_skill, \
             scholarship_available, credits, subject, bootcamp_id, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.weeks)
        .bind(fields.tuition)
        .bind(fields.minimum_skill.as_str())
        .bind(fields.scholarship_available)
        .bind(fields.credits)
        .bind(fields.subject.label())
        .bind(bootcamp.as_i32())
        .bind(owner.as_i32())
        .fetch_one(&self.pool)
        .await?;

        self.fetch_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn list_courses(&self, page: Pagination) -> Result<Vec<Course>, RepositoryError> {
        let sql =
            format!("SELECT {COURSE_COLUMNS} FROM courses c ORDER BY c.id LIMIT $1 OFFSET $2");
        let rows: Vec<CourseRow> = sqlx::query_as(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Course::try_from).collect()
    }

    async fn list_courses_by_bootcamp(
        &self,
        bootcamp: BootcampId,
        page: Pagination,
    ) -> Result<Vec<Course>, RepositoryError> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses c WHERE c.bootcamp_id = $1 \
             ORDER BY c.id LIMIT $2 OFFSET $3"
        );
        let rows: Vec<CourseRow> = sqlx::query_as(&sql)
            .bind(bootcamp.as_i32())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Course::try_from).collect()
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, RepositoryError> {
        self.fetch_by_id(id.as_i32()).await
    }

    async fn update_course(
        &self,
        id: CourseId,
        fields: &CourseFields,
    ) -> Result<Course, RepositoryError> {
        let result = sqlx::query(
            "UPDATE courses SET title = $2, description = $3, weeks = $4, tuition = $5, \
             minimum_skill = $6, scholarship_available = $7, credits = $8, subject = $9, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.weeks)
        .bind(fields.tuition)
        .bind(fields.minimum_skill.as_str())
        .bind(fields.scholarship_available)
        .bind(fields.credits)
        .bind(fields.subject.label())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.fetch_by_id(id.as_i32())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_course(&self, id: CourseId) -> Result<Option<Course>, RepositoryError> {
        let Some(course) = self.fetch_by_id(id.as_i32()).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        Ok((result.rows_affected() > 0).then_some(course))
    }

    async fn credit_totals(&self, bootcamp: BootcampId) -> Result<CreditTotals, RepositoryError> {
        let (weighted_tuition, credits): (Option<Decimal>, Option<i64>) = sqlx::query_as(
            "SELECT SUM(tuition * credits), SUM(credits)::BIGINT \
             FROM courses WHERE bootcamp_id = $1",
        )
        .bind(bootcamp.as_i32())
        .fetch_one(&self.pool)
        .await?;

        Ok(CreditTotals {
            weighted_tuition: weighted_tuition.unwrap_or_default(),
            credits: credits.unwrap_or_default(),
        })
    }

    async fn add_student(&self, course: CourseId, user: UserId) -> Result<bool, RepositoryError> {
        if !self.course_exists(course).await? {
            return Err(RepositoryError::NotFound);
        }

        // The course can still vanish before the insert lands.
        let result = sqlx::query(
            "INSERT INTO course_students (course_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(course.as_i32())
        .bind(user.as_i32())
        .execute(&self.pool)
        .await
        .map_err(map_missing_reference)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_student(
        &self,
        course: CourseId,
        user: UserId,
    ) -> Result<bool, RepositoryError> {
        if !self.course_exists(course).await? {
            return Err(RepositoryError::NotFound);
        }

        let result =
            sqlx::query("DELETE FROM course_students WHERE course_id = $1 AND user_id = $2")
                .bind(course.as_i32())
                .bind(user.as_i32())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    async fn migrated_pool() -> PgPool {
        let url = std::env::var("CAMPFINDER_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .unwrap();
        let pool = crate::db::create_pool(&SecretString::from(url)).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_enrollment_on_missing_course_is_not_found() {
        let repo = PgCourseRepository::new(migrated_pool().await);
        let course = CourseId::from(i32::MAX);
        let user = UserId::from(1);

        let added = repo.add_student(course, user).await;
        assert!(matches!(added, Err(RepositoryError::NotFound)));

        let removed = repo.remove_student(course, user).await;
        assert!(matches!(removed, Err(RepositoryError::NotFound)));
    }
}
