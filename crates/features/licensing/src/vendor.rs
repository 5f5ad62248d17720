//! # Vendor Manager
//!
//! Issues artifacts for a single subject. Incoming licenses are normalized first
//! (missing issuer, holder, issue time, consumer type and amount get defaults) and then
//! validated before they are bound to a [`LicenseKeyGenerator`].

use crate::clock::{Clock, SystemClock};
use crate::error::LicenseError;
use crate::keys::VendorKeys;
use crate::manager::{KeyGenerator, LicenseVendorManager};
use crate::repository::{RepositoryContext, RepositoryModel};
use crate::store::Sink;
use sigil_domain::constants::{DEFAULT_CONSUMER_TYPE, DEFAULT_HOLDER, ISSUER_PREFIX};
use sigil_domain::license::License;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a vendor manager needs.
#[derive(Debug, Clone)]
pub struct VendorParameters {
    subject: String,
    keys: VendorKeys,
    model: RepositoryModel,
    context: RepositoryContext,
    clock: Arc<dyn Clock>,
}

impl VendorParameters {
    /// Parameters writing `v1` artifacts with the system clock.
    pub fn new(subject: impl Into<String>, keys: VendorKeys) -> Self {
        Self {
            subject: subject.into(),
            keys,
            model: RepositoryModel::default(),
            context: RepositoryContext::new(),
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub const fn model(mut self, model: RepositoryModel) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn context(mut self, context: RepositoryContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

/// Default vendor manager. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BasicVendorManager {
    params: Arc<VendorParameters>,
}

impl BasicVendorManager {
    /// Creates a manager.
    ///
    /// # Errors
    /// [`LicenseError::InvalidPayload`] if the subject is blank or the context has no
    /// repository for the configured model.
    pub fn new(params: VendorParameters) -> Result<Self, LicenseError> {
        if params.subject.trim().is_empty() {
            return Err(LicenseError::invalid("Vendor subject cannot be empty"));
        }
        params.context.for_version(params.model)?;
        Ok(Self { params: Arc::new(params) })
    }

    #[must_use]
    pub fn model(&self) -> RepositoryModel {
        self.params.model
    }

    fn normalize(&self, license: License) -> License {
        let subject = &self.params.subject;
        let mut builder = license.to_builder();

        if license.subject().is_empty() {
            builder = builder.subject(subject.as_str());
        }
        if license.issuer().is_empty() {
            builder = builder.issuer(format!("{ISSUER_PREFIX}{subject}"));
        }
        if license.holder().is_empty() {
            builder = builder.holder(DEFAULT_HOLDER);
        }
        if license.issued() == 0 {
            builder = builder.issued(self.params.clock.now_secs());
        }
        if license.consumer_type().is_empty() {
            builder = builder.consumer_type(DEFAULT_CONSUMER_TYPE);
        }
        if license.consumer_amount() == 0 {
            builder = builder.consumer_amount(1);
        }
        builder.build()
    }

    fn validate(&self, license: &License) -> Result<(), LicenseError> {
        if license.subject() != self.params.subject {
            return Err(LicenseError::InvalidPayload {
                message: format!(
                    "License subject '{}' does not match '{}'",
                    license.subject(),
                    self.params.subject
                )
                .into(),
                context: None,
            });
        }
        if let (Some(not_before), Some(not_after)) = (license.not_before(), license.not_after())
            && not_before > not_after
        {
            return Err(LicenseError::InvalidPayload {
                message: "Validity window is inverted".into(),
                context: Some(format!("not_before={not_before}, not_after={not_after}").into()),
            });
        }
        if license.extra().keys().any(String::is_empty) {
            return Err(LicenseError::invalid("Custom attribute keys cannot be empty"));
        }
        Ok(())
    }
}

impl LicenseVendorManager for BasicVendorManager {
    type Generator = LicenseKeyGenerator;

    fn subject(&self) -> &str {
        &self.params.subject
    }

    fn generator(&self, license: License) -> Result<LicenseKeyGenerator, LicenseError> {
        let license = self.normalize(license);
        if let Err(err) = self.validate(&license) {
            warn!(subject = %self.params.subject, error = %err, "Rejected license payload");
            return Err(err);
        }
        Ok(LicenseKeyGenerator { params: Arc::clone(&self.params), license })
    }
}

/// A normalized license bound to the vendor's keys and write model.
#[derive(Debug, Clone)]
pub struct LicenseKeyGenerator {
    params: Arc<VendorParameters>,
    license: License,
}

impl KeyGenerator for LicenseKeyGenerator {
    fn license(&self) -> &License {
        &self.license
    }

    fn write_to(&self, sink: &dyn Sink) -> Result<(), LicenseError> {
        let artifact = self.to_bytes()?;
        sink.write(&artifact)?;
        debug!(
            subject = %self.license.subject(),
            holder = %self.license.holder(),
            model = %self.params.model,
            bytes = artifact.len(),
            "License artifact written"
        );
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>, LicenseError> {
        let params = &self.params;
        params.context.encode(params.model, &self.license, &params.keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::LicenseErrorKind;

    fn manager() -> BasicVendorManager {
        let keys = VendorKeys::from_seed(&[1u8; 32], None);
        BasicVendorManager::new(
            VendorParameters::new("Widget", keys).clock(FixedClock::from_secs(1_700_000_000)),
        )
        .unwrap()
    }

    #[test]
    fn normalization_fills_defaults() {
        let generator = manager().generator(License::builder().build()).unwrap();
        let license = generator.license();

        assert_eq!(license.subject(), "Widget");
        assert_eq!(license.issuer(), "CN=Widget");
        assert_eq!(license.holder(), "CN=Unknown");
        assert_eq!(license.issued(), 1_700_000_000);
        assert_eq!(license.consumer_type(), "User");
        assert_eq!(license.consumer_amount(), 1);
    }

    #[test]
    fn normalization_keeps_explicit_values() {
        let input = License::builder()
            .subject("Widget")
            .issuer("CN=Vendor Inc")
            .holder("CN=Acme")
            .issued(42)
            .consumer_type("Seat")
            .consumer_amount(5)
            .build();
        let generator = manager().generator(input.clone()).unwrap();
        assert_eq!(generator.license(), &input);
    }

    #[test]
    fn foreign_subject_is_invalid() {
        let err = manager().generator(License::builder().subject("Gadget").build()).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::InvalidPayload);
    }

    #[test]
    fn inverted_window_is_invalid() {
        let license = License::builder().validity(200, 100).build();
        let err = manager().generator(license).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::InvalidPayload);
    }

    #[test]
    fn empty_attribute_key_is_invalid() {
        let license = License::builder().attribute("", "value").build();
        let err = manager().generator(license).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::InvalidPayload);
    }

    #[test]
    fn blank_subject_is_rejected() {
        let keys = VendorKeys::from_seed(&[1u8; 32], None);
        let err = BasicVendorManager::new(VendorParameters::new(" ", keys)).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::InvalidPayload);
    }

    #[test]
    fn sealed_model_without_secret_fails_on_write() {
        let keys = VendorKeys::from_seed(&[1u8; 32], None);
        let manager =
            BasicVendorManager::new(VendorParameters::new("Widget", keys).model(RepositoryModel::V2))
                .unwrap();
        let err = manager.generator(License::builder().build()).unwrap().to_bytes().unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::Internal);
    }
}
