//! Bootcamp repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use campfinder_core::{BootcampId, Career, Email, Pagination, Slug, UserId};

use super::{BootcampStore, RepositoryError, map_unique_violation};
use crate::models::bootcamp::{Bootcamp, BootcampRecord, Location};

const BOOTCAMP_COLUMNS: &str = "id, name, slug, description, website, phone, email, address, \
     location_type, longitude, latitude, formatted_address, street, city, state, zipcode, \
     country, careers, average_cost, housing, job_assistance, job_guarantee, accept_gi, \
     user_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BootcampRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    website: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: String,
    location_type: Option<String>,
    longitude: Option<f64>,
    latitude: Option<f64>,
    formatted_address: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zipcode: Option<String>,
    country: Option<String>,
    careers: Vec<String>,
    average_cost: Option<Decimal>,
    housing: bool,
    job_assistance: bool,
    job_guarantee: bool,
    accept_gi: bool,
    user_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BootcampRow> for Bootcamp {
    type Error = RepositoryError;

    fn try_from(r: BootcampRow) -> Result<Self, Self::Error> {
        let email = r
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid bootcamp email in database: {e}"))
            })?;

        let careers = r
            .careers
            .iter()
            .map(|c| c.parse::<Career>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid career: {e}")))?;

        let location = match (r.location_type, r.longitude, r.latitude) {
            (Some(kind), Some(longitude), Some(latitude)) => Some(Location {
                kind,
                coordinates: [longitude, latitude],
                formatted_address: r.formatted_address.unwrap_or_default(),
                street: r.street.unwrap_or_default(),
                city: r.city.unwrap_or_default(),
                state: r.state.unwrap_or_default(),
                zipcode: r.zipcode.unwrap_or_default(),
                country: r.country.unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Self {
            id: BootcampId::new(r.id),
            name: r.name,
            slug: Slug::from_stored(r.slug),
            description: r.description,
            website: r.website,
            phone: r.phone,
            email,
            address: r.address,
            location,
            careers,
            average_cost: r.average_cost,
            housing: r.housing,
            job_assistance: r.job_assistance,
            job_guarantee: r.job_guarantee,
            accept_gi: r.accept_gi,
            user: UserId::new(r.user_id),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn career_labels(careers: &[Career]) -> Vec<String> {
    careers.iter().map(|c| c.label().to_owned()).collect()
}

/// `PostgreSQL` implementation of [`BootcampStore`].
#[derive(Clone)]
pub struct PgBootcampRepository {
    pool: PgPool,
}

impl PgBootcampRepository {
    /// Create a new bootcamp repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BootcampStore for PgBootcampRepository {
    async fn insert_bootcamp(
        &self,
        owner: UserId,
        record: &BootcampRecord,
    ) -> Result<Bootcamp, RepositoryError> {
        let sql = format!(
            "INSERT INTO bootcamps (name, slug, description, website, phone, email, address, \
             location_type, longitude, latitude, formatted_address, street, city, state, \
             zipcode, country, careers, housing, job_assistance, job_guarantee, accept_gi, \
             user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22) \
             RETURNING {BOOTCAMP_COLUMNS}"
        );
        let fields = &record.fields;
        let location = &record.location;
        let row: BootcampRow = sqlx::query_as(&sql)
            .bind(&fields.name)
            .bind(record.slug.as_str())
            .bind(&fields.description)
            .bind(&fields.website)
            .bind(&fields.phone)
            .bind(fields.email.as_ref().map(Email::as_str))
            .bind(&fields.address)
            .bind(&location.kind)
            .bind(location.longitude())
            .bind(location.latitude())
            .bind(&location.formatted_address)
            .bind(&location.street)
            .bind(&location.city)
            .bind(&location.state)
            .bind(&location.zipcode)
            .bind(&location.country)
            .bind(career_labels(&fields.careers))
            .bind(fields.housing)
            .bind(fields.job_assistance)
            .bind(fields.job_guarantee)
            .bind(fields.accept_gi)
            .bind(owner.as_i32())
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        row.try_into()
    }

    async fn list_bootcamps(&self, page: Pagination) -> Result<Vec<Bootcamp>, RepositoryError> {
        let sql =
            format!("SELECT {BOOTCAMP_COLUMNS} FROM bootcamps ORDER BY id LIMIT $1 OFFSET $2");
        let rows: Vec<BootcampRow> = sqlx::query_as(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Bootcamp::try_from).collect()
    }

    async fn find_bootcamp(&self, id: BootcampId) -> Result<Option<Bootcamp>, RepositoryError> {
        let sql = format!("SELECT {BOOTCAMP_COLUMNS} FROM bootcamps WHERE id = $1");
        let row: Option<BootcampRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Bootcamp::try_from).transpose()
    }

    async fn find_bootcamp_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Option<Bootcamp>, RepositoryError> {
        let sql =
            format!("SELECT {BOOTCAMP_COLUMNS} FROM bootcamps WHERE user_id = $1 ORDER BY id LIMIT 1");
        let row: Option<BootcampRow> = sqlx::query_as(&sql)
            .bind(owner.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Bootcamp::try_from).transpose()
    }

    async fn update_bootcamp(
        &self,
        id: BootcampId,
        record: &BootcampRecord,
    ) -> Result<Bootcamp, RepositoryError> {
        let sql = format!(
            "UPDATE bootcamps SET name = $2, slug = $3, description = $4, website = $5, \
             phone = $6, email = $7, address = $8, location_type = $9, longitude = $10, \
             latitude = $11, formatted_address = $12, street = $13, city = $14, state = $15, \
             zipcode = $16, country = $17, careers = $18, housing = $19, \
             job_assistance = $20, job_guarantee = $21, accept_gi = $22, updated_at = NOW() \
             WHERE id = $1 RETURNING {BOOTCAMP_COLUMNS}"
        );
        let fields = &record.fields;
        let location = &record.location;
        let row: Option<BootcampRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .bind(&fields.name)
            .bind(record.slug.as_str())
            .bind(&fields.description)
            .bind(&fields.website)
            .bind(&fields.phone)
            .bind(fields.email.as_ref().map(Email::as_str))
            .bind(&fields.address)
            .bind(&location.kind)
            .bind(location.longitude())
            .bind(location.latitude())
            .bind(&location.formatted_address)
            .bind(&location.street)
            .bind(&location.city)
            .bind(&location.state)
            .bind(&location.zipcode)
            .bind(&location.country)
            .bind(career_labels(&fields.careers))
            .bind(fields.housing)
            .bind(fields.job_assistance)
            .bind(fields.job_guarantee)
            .bind(fields.accept_gi)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn set_average_cost(
        &self,
        id: BootcampId,
        average_cost: Option<Decimal>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE bootcamps SET average_cost = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(average_cost)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_bootcamp(&self, id: BootcampId) -> Result<Option<Bootcamp>, RepositoryError> {
        let sql = format!("DELETE FROM bootcamps WHERE id = $1 RETURNING {BOOTCAMP_COLUMNS}");
        let row: Option<BootcampRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Bootcamp::try_from).transpose()
    }
}
