//! Bootcamp listings and their derived fields.

use std::sync::Arc;

use tracing::instrument;

use campfinder_core::{BootcampId, Pagination, UserId, average_cost};

use super::error::{ServiceError, ValidationError};
use super::geocoder::Geocoder;
use super::hooks::prepare_bootcamp_record;
use super::validation;
use crate::db::{BOOTCAMPS_NAME_KEY, BootcampStore, CourseStore, RepositoryError};
use crate::models::bootcamp::{Bootcamp, BootcampDraft, BootcampPatch};
use crate::models::user::CallerIdentity;

const ENTITY: &str = "Bootcamp";

fn map_name_conflict(e: RepositoryError) -> ServiceError {
    match e {
        e if e.is_conflict_on(BOOTCAMPS_NAME_KEY) => {
            ValidationError::new(ENTITY, "name", "Name already in use").into()
        }
        RepositoryError::NotFound => ServiceError::NotFound(ENTITY),
        e => e.into(),
    }
}

/// Bootcamp entity service.
#[derive(Clone)]
pub struct BootcampService {
    store: Arc<dyn BootcampStore>,
    courses: Arc<dyn CourseStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl BootcampService {
    #[must_use]
    pub fn new(
        store: Arc<dyn BootcampStore>,
        courses: Arc<dyn CourseStore>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            store,
            courses,
            geocoder,
        }
    }

    /// One page of bootcamps ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `limit` or `page` is not positive.
    pub async fn list(
        &self,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> Result<Vec<Bootcamp>, ServiceError> {
        let page = Pagination::from_optional(limit, page)?;
        Ok(self.store.list_bootcamps(page).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no bootcamp has this id.
    pub async fn get(&self, id: BootcampId) -> Result<Bootcamp, ServiceError> {
        self.store
            .find_bootcamp(id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    /// Create the caller's bootcamp.
    ///
    /// # Errors
    ///
    /// Returns `OwnershipConflict` if the caller already owns one,
    /// `Validation` for bad fields or a taken name and `Geocoding` if the
    /// address cannot be resolved.
    #[instrument(skip(self, draft), fields(owner = %owner))]
    pub async fn create(
        &self,
        owner: UserId,
        draft: BootcampDraft,
    ) -> Result<Bootcamp, ServiceError> {
        // Check-then-insert: two concurrent creates by one publisher can both pass.
        if self.store.find_bootcamp_by_owner(owner).await?.is_some() {
            return Err(ServiceError::OwnershipConflict);
        }

        let fields = validation::bootcamp(draft)?;
        let record = prepare_bootcamp_record(fields, self.geocoder.as_ref()).await?;

        let bootcamp = self
            .store
            .insert_bootcamp(owner, &record)
            .await
            .map_err(map_name_conflict)?;

        tracing::info!(bootcamp_id = %bootcamp.id, slug = %bootcamp.slug, "Bootcamp created");
        Ok(bootcamp)
    }

    async fn owned(&self, caller: &CallerIdentity, id: BootcampId) -> Result<Bootcamp, ServiceError> {
        let bootcamp = self.get(id).await?;
        if bootcamp.user != caller.user_id {
            tracing::warn!(bootcamp_id = %id, caller = %caller.user_id, "Bootcamp ownership check failed");
            return Err(ServiceError::PermissionDenied);
        }
        Ok(bootcamp)
    }

    /// Apply a partial update and re-run every save hook.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `PermissionDenied` for a non-owner, `Validation`
    /// or `Geocoding`.
    #[instrument(skip(self, caller, patch), fields(bootcamp_id = %id, caller = %caller.user_id))]
    pub async fn update(
        &self,
        caller: &CallerIdentity,
        id: BootcampId,
        patch: BootcampPatch,
    ) -> Result<Bootcamp, ServiceError> {
        let existing = self.owned(caller, id).await?;

        let draft = BootcampDraft::from_existing(&existing).apply(patch);
        let fields = validation::bootcamp(draft)?;
        let record = prepare_bootcamp_record(fields, self.geocoder.as_ref()).await?;

        let bootcamp = self
            .store
            .update_bootcamp(id, &record)
            .await
            .map_err(map_name_conflict)?;

        tracing::info!(bootcamp_id = %bootcamp.id, "Bootcamp updated");
        Ok(bootcamp)
    }

    /// Delete the caller's bootcamp and its courses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `PermissionDenied` for a non-owner.
    #[instrument(skip(self, caller), fields(bootcamp_id = %id, caller = %caller.user_id))]
    pub async fn delete(
        &self,
        id: BootcampId,
        caller: &CallerIdentity,
    ) -> Result<Bootcamp, ServiceError> {
        self.owned(caller, id).await?;

        let bootcamp = self
            .store
            .delete_bootcamp(id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;

        tracing::info!(bootcamp_id = %bootcamp.id, "Bootcamp deleted");
        Ok(bootcamp)
    }

    /// Recompute and store the credit-weighted average tuition.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the bootcamp is gone, or `Repository`.
    #[instrument(skip(self), fields(bootcamp_id = %id))]
    pub async fn recompute_average_cost(&self, id: BootcampId) -> Result<(), ServiceError> {
        let totals = self.courses.credit_totals(id).await?;
        let cost = average_cost(totals);

        self.store
            .set_average_cost(id, cost)
            .await
            .map_err(map_name_conflict)?;

        tracing::debug!(average_cost = ?cost, "Average cost recomputed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campfinder_core::{Career, Email, FieldPatch, Role};
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::course::CourseFields;
    use crate::test_support::{FailingGeocoder, StaticGeocoder};

    fn publisher(id: i32) -> CallerIdentity {
        CallerIdentity {
            user_id: UserId::new(id),
            role: Role::Publisher,
            email: Email::parse(&format!("publisher{id}@email.com")).unwrap(),
        }
    }

    fn service(store: &Arc<MemoryStore>) -> BootcampService {
        BootcampService::new(
            store.clone(),
            store.clone(),
            Arc::new(StaticGeocoder::default()),
        )
    }

    fn draft(name: &str) -> BootcampDraft {
        BootcampDraft {
            name: Some(name.to_owned()),
            description: Some("ModernTech has one goal".to_owned()),
            address: Some("220 Pawtucket St, Lowell, MA 01854".to_owned()),
            careers: Some(vec![Career::WebDevelopment, Career::DataScience]),
            ..BootcampDraft::default()
        }
    }

    #[tokio::test]
    async fn test_create_derives_fields() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);

        let bootcamp = service
            .create(UserId::new(1), draft("ModernTech Bootcamp"))
            .await
            .unwrap();

        assert_eq!(bootcamp.slug.as_str(), "moderntech-bootcamp");
        assert_eq!(bootcamp.user, UserId::new(1));
        assert!(bootcamp.average_cost.is_none());
        let location = bootcamp.location.unwrap();
        assert_eq!(bootcamp.address, location.formatted_address);
    }

    #[tokio::test]
    async fn test_one_bootcamp_per_publisher() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        service
            .create(UserId::new(1), draft("First Bootcamp"))
            .await
            .unwrap();

        let err = service
            .create(UserId::new(1), draft("Second Bootcamp"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Each publisher can own only one bootcamp");
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        service
            .create(UserId::new(1), draft("Codemasters"))
            .await
            .unwrap();

        let err = service
            .create(UserId::new(2), draft("Codemasters"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bootcamp validation failed: name: Name already in use"
        );
    }

    #[tokio::test]
    async fn test_geocoding_failure_persists_nothing() {
        let store = Arc::new(MemoryStore::default());
        let service = BootcampService::new(store.clone(), store.clone(), Arc::new(FailingGeocoder));

        let err = service
            .create(UserId::new(1), draft("Codemasters"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "GEOCODING_FAILED");
        assert!(service.list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        for id in 1..=3 {
            service
                .create(UserId::new(id), draft(&format!("Bootcamp {id}")))
                .await
                .unwrap();
        }

        let page = service.list(Some(2), Some(2)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Bootcamp 3");

        let err = service.list(Some(0), None).await.unwrap_err();
        assert_eq!(err.to_string(), "Limit and page must be greater than 0");
        assert!(service.list(None, Some(-1)).await.is_err());
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let bootcamp = service
            .create(UserId::new(1), draft("Codemasters"))
            .await
            .unwrap();

        let patch = BootcampPatch {
            housing: FieldPatch::Value(true),
            ..BootcampPatch::default()
        };
        let err = service
            .update(&publisher(2), bootcamp.id, patch.clone())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Permission denied");

        let updated = service
            .update(&publisher(1), bootcamp.id, patch)
            .await
            .unwrap();
        assert!(updated.housing);
        assert_eq!(updated.name, "Codemasters");
    }

    #[tokio::test]
    async fn test_update_recomputes_slug_and_null_semantics() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let bootcamp = service
            .create(
                UserId::new(1),
                BootcampDraft {
                    website: Some("https://codemasters.com".to_owned()),
                    ..draft("Codemasters")
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                &publisher(1),
                bootcamp.id,
                BootcampPatch {
                    name: FieldPatch::Value("Code Masters Pro".to_owned()),
                    website: FieldPatch::Null,
                    ..BootcampPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug.as_str(), "code-masters-pro");
        assert!(updated.website.is_none());

        let err = service
            .update(
                &publisher(1),
                bootcamp.id,
                BootcampPatch {
                    description: FieldPatch::Null,
                    ..BootcampPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bootcamp validation failed: description: Description is required"
        );
    }

    #[tokio::test]
    async fn test_delete_returns_snapshot() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let bootcamp = service
            .create(UserId::new(1), draft("Codemasters"))
            .await
            .unwrap();

        assert!(matches!(
            service.delete(bootcamp.id, &publisher(2)).await.unwrap_err(),
            ServiceError::PermissionDenied
        ));

        let deleted = service.delete(bootcamp.id, &publisher(1)).await.unwrap();
        assert_eq!(deleted.name, "Codemasters");
        assert!(matches!(
            service.get(bootcamp.id).await.unwrap_err(),
            ServiceError::NotFound("Bootcamp")
        ));
    }

    #[tokio::test]
    async fn test_recompute_average_cost() {
        let store = Arc::new(MemoryStore::default());
        let service = service(&store);
        let bootcamp = service
            .create(UserId::new(1), draft("Codemasters"))
            .await
            .unwrap();

        for (tuition, credits) in [(1000, 1), (2001, 2)] {
            let fields = CourseFields {
                title: "Course".to_owned(),
                description: "Course description".to_owned(),
                weeks: "8".to_owned(),
                tuition: Decimal::from(tuition),
                minimum_skill: campfinder_core::MinimumSkill::Beginner,
                scholarship_available: false,
                credits,
                subject: Career::WebDevelopment,
            };
            store
                .insert_course(UserId::new(1), bootcamp.id, &fields)
                .await
                .unwrap();
        }

        service.recompute_average_cost(bootcamp.id).await.unwrap();
        let bootcamp = service.get(bootcamp.id).await.unwrap();
        // (1000 + 4002) / 3 = 1667.333.. floored to 1667.33
        assert_eq!(bootcamp.average_cost, Some(Decimal::new(166_733, 2)));
    }
}
