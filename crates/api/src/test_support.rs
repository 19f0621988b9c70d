//! In-memory collaborators for tests.
//!
//! Compiled for this crate's unit tests and, behind the `test-support`
//! feature, for the integration-test crate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use secrecy::SecretString;
use tokio::sync::Mutex;

use crate::db::MemoryStore;
use crate::services::auth::SessionTokens;
use crate::services::email::{DeliveryError, Mailer, OutgoingMail};
use crate::services::geocoder::{GeocodeError, GeocodedAddress, Geocoder};
use crate::services::{Services, Stores};

/// Token issuer with a fixed secret and a one-hour TTL.
#[must_use]
pub fn test_tokens() -> SessionTokens {
    SessionTokens::new(
        SecretString::from("t3st#Secr3t!v4lue$for&unit*tests^only".to_string()),
        Duration::hours(1),
    )
}

/// Mailer that keeps every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    /// Every message sent so far.
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }

    /// The 4-digit code carried by the most recent message.
    pub async fn last_code(&self) -> Option<String> {
        let sent = self.sent.lock().await;
        let mail = sent.last()?;
        mail.body
            .split(|c: char| !c.is_ascii_digit())
            .find(|word| word.len() == 4)
            .map(str::to_owned)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_mail(&self, mail: OutgoingMail) -> Result<(), DeliveryError> {
        self.sent.lock().await.push(mail);
        Ok(())
    }
}

/// Mailer whose every delivery fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send_mail(&self, _mail: OutgoingMail) -> Result<(), DeliveryError> {
        Err(DeliveryError::MissingCredentials)
    }
}

/// Geocoder that resolves every address to the same place.
#[derive(Debug, Clone)]
pub struct StaticGeocoder {
    pub address: GeocodedAddress,
}

impl Default for StaticGeocoder {
    fn default() -> Self {
        Self {
            address: GeocodedAddress {
                latitude: 42.350_846,
                longitude: -71.105_18,
                formatted_address: "233 Bay State Rd, Boston, MA 02215-1405, US".to_owned(),
                street: "233 Bay State Rd".to_owned(),
                city: "Boston".to_owned(),
                state: "MA".to_owned(),
                zipcode: "02215-1405".to_owned(),
                country: "US".to_owned(),
            },
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, _address: &str) -> Result<GeocodedAddress, GeocodeError> {
        Ok(self.address.clone())
    }
}

/// Geocoder that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGeocoder;

#[async_trait]
impl Geocoder for FailingGeocoder {
    async fn geocode(&self, _address: &str) -> Result<GeocodedAddress, GeocodeError> {
        Err(GeocodeError::NoResults)
    }
}

/// Services over a fresh [`MemoryStore`] with a recording mailer and a
/// static geocoder.
#[must_use]
pub fn memory_services() -> (Services, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let services = Services::new(
        Stores::shared(Arc::new(MemoryStore::default())),
        mailer.clone(),
        Arc::new(StaticGeocoder::default()),
        test_tokens(),
    );
    (services, mailer)
}
