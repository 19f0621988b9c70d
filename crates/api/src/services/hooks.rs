//! Derived state computed on every bootcamp save.
//!
//! Average cost lives in [`super::bootcamps::BootcampService::recompute_average_cost`]
//! and is triggered by the course service.

use chrono::{DateTime, Utc};

use campfinder_core::Slug;

use super::error::ServiceError;
use super::geocoder::{GeocodedAddress, Geocoder};
use crate::models::bootcamp::{BootcampFields, BootcampRecord, Location};

/// Derive the slug and location for validated bootcamp fields.
///
/// The address is always geocoded and replaced by the formatted address.
///
/// # Errors
///
/// Returns `ServiceError::Geocoding` if the geocoder fails or finds nothing.
pub async fn prepare_bootcamp_record(
    mut fields: BootcampFields,
    geocoder: &dyn Geocoder,
) -> Result<BootcampRecord, ServiceError> {
    let slug = Slug::from_name(&fields.name);
    let geocoded = geocoder.geocode(&fields.address).await?;

    let location = location_from(geocoded);
    fields.address.clone_from(&location.formatted_address);

    Ok(BootcampRecord {
        fields,
        slug,
        location,
    })
}

fn location_from(geocoded: GeocodedAddress) -> Location {
    Location {
        kind: Location::POINT.to_owned(),
        coordinates: [geocoded.longitude, geocoded.latitude],
        formatted_address: geocoded.formatted_address,
        street: geocoded.street,
        city: geocoded.city,
        state: geocoded.state,
        zipcode: geocoded.zipcode,
        country: geocoded.country,
    }
}

/// A reset code is dead once `now` reaches its expiry. No expiry on file
/// counts as expired.
#[must_use]
pub fn is_expired(expire: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expire.is_none_or(|at| now >= at)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use campfinder_core::Career;

    use super::*;
    use crate::services::geocoder::GeocodeError;
    use crate::test_support::{FailingGeocoder, StaticGeocoder};

    fn fields() -> BootcampFields {
        BootcampFields {
            name: "Devcentral Bootcamp".to_owned(),
            description: "Is coding your passion?".to_owned(),
            website: None,
            phone: None,
            email: None,
            address: "45 Upper College Rd Kingston RI 02881".to_owned(),
            careers: vec![Career::MobileDevelopment],
            housing: false,
            job_assistance: true,
            job_guarantee: false,
            accept_gi: true,
        }
    }

    #[tokio::test]
    async fn test_record_derives_slug_and_location() {
        let geocoder = StaticGeocoder::default();
        let record = prepare_bootcamp_record(fields(), &geocoder).await.unwrap();

        assert_eq!(record.slug.as_str(), "devcentral-bootcamp");
        assert_eq!(record.location.kind, "Point");
        assert_eq!(record.fields.address, record.location.formatted_address);
        assert!((record.location.longitude() - geocoder.address.longitude).abs() < f64::EPSILON);
        assert!((record.location.latitude() - geocoder.address.latitude).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_geocoder_failure_fails_save() {
        let err = prepare_bootcamp_record(fields(), &FailingGeocoder)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Geocoding(GeocodeError::NoResults)
        ));
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = Utc::now();
        assert!(!is_expired(Some(now + Duration::seconds(1)), now));
        assert!(is_expired(Some(now), now));
        assert!(is_expired(Some(now - Duration::seconds(1)), now));
        assert!(is_expired(None, now));
    }
}
