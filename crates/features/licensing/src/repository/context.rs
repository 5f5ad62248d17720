use super::envelope;
use super::sealed::{AesGcmRepository, ChaChaRepository};
use super::signed::SignedRepository;
use super::{Repository, RepositoryModel};
use crate::error::LicenseError;
use crate::keys::{ConsumerKeys, VendorKeys};
use fxhash::FxHashMap;
use sigil_domain::license::License;
use std::sync::Arc;

/// Registry of repositories keyed by version byte.
///
/// Reading dispatches on the artifact's own header, so a manager that writes `v3` still
/// reads `v1` and `v2` artifacts issued earlier. Writing always uses the model the caller
/// asks for.
#[derive(Debug, Clone)]
pub struct RepositoryContext {
    repositories: FxHashMap<u8, Arc<dyn Repository>>,
}

impl RepositoryContext {
    /// Context with every built-in model registered.
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .with(SignedRepository::new())
            .with(AesGcmRepository::new())
            .with(ChaChaRepository::new())
    }

    /// Context without any repository.
    #[must_use]
    pub fn empty() -> Self {
        Self { repositories: FxHashMap::default() }
    }

    #[must_use]
    pub fn with(mut self, repository: impl Repository + 'static) -> Self {
        self.register(Arc::new(repository));
        self
    }

    /// Adds a repository, replacing any previous one for the same model.
    pub fn register(&mut self, repository: Arc<dyn Repository>) -> Option<Arc<dyn Repository>> {
        self.repositories.insert(repository.model().version(), repository)
    }

    /// Returns the repository for `model`.
    ///
    /// # Errors
    /// Returns [`LicenseError::InvalidPayload`] if no repository is registered for it.
    pub fn for_version(&self, model: RepositoryModel) -> Result<&dyn Repository, LicenseError> {
        self.repositories.get(&model.version()).map(Arc::as_ref).ok_or_else(|| {
            LicenseError::InvalidPayload {
                message: format!("No repository registered for {model}").into(),
                context: None,
            }
        })
    }

    /// Registered models in version order.
    #[must_use]
    pub fn models(&self) -> Vec<RepositoryModel> {
        let mut models: Vec<_> =
            self.repositories.values().map(|repository| repository.model()).collect();
        models.sort_unstable();
        models
    }

    /// Reads the model from an artifact header without authenticating it.
    ///
    /// # Errors
    /// Returns [`LicenseError::CorruptArtifact`] if the header is malformed.
    pub fn peek_version(artifact: &[u8]) -> Result<RepositoryModel, LicenseError> {
        envelope::peek(artifact)
    }

    /// Encodes `license` with the repository for `model`.
    ///
    /// # Errors
    /// See [`Repository::encode`]; [`LicenseError::InvalidPayload`] for unknown models.
    pub fn encode(
        &self,
        model: RepositoryModel,
        license: &License,
        keys: &VendorKeys,
    ) -> Result<Vec<u8>, LicenseError> {
        self.for_version(model)?.encode(license, keys)
    }

    /// Decodes `artifact` with the repository that wrote it.
    ///
    /// # Errors
    /// See [`Repository::decode`]. Artifacts of unregistered models are corrupt from the
    /// point of view of this context.
    pub fn decode(&self, artifact: &[u8], keys: &ConsumerKeys) -> Result<License, LicenseError> {
        let model = Self::peek_version(artifact)?;
        let repository = self.for_version(model).map_err(|_| LicenseError::CorruptArtifact {
            message: format!("Artifact model {model} is not readable here").into(),
            context: None,
        })?;
        repository.decode(artifact, keys)
    }
}

impl Default for RepositoryContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LicenseErrorKind;
    use crate::keys::SharedSecret;

    fn keys() -> VendorKeys {
        VendorKeys::from_seed(&[4u8; 32], Some(SharedSecret::new(b"secret".to_vec()).unwrap()))
    }

    #[test]
    fn default_context_registers_all_models() {
        assert_eq!(RepositoryContext::new().models(), RepositoryModel::ALL.to_vec());
    }

    #[test]
    fn decode_dispatches_on_header() {
        let context = RepositoryContext::new();
        let license = License::builder().subject("Widget").build();

        for model in RepositoryModel::ALL {
            let artifact = context.encode(model, &license, &keys()).unwrap();
            assert_eq!(RepositoryContext::peek_version(&artifact).unwrap(), model);
            assert_eq!(context.decode(&artifact, &keys().consumer_keys()).unwrap(), license);
        }
    }

    #[test]
    fn custom_context_only_serves_registered_models() {
        let context = RepositoryContext::empty().with(SignedRepository::new());
        let license = License::builder().subject("Widget").build();

        let err = context.encode(RepositoryModel::V3, &license, &keys()).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::InvalidPayload);

        let v3 = RepositoryContext::new().encode(RepositoryModel::V3, &license, &keys()).unwrap();
        let err = context.decode(&v3, &keys().consumer_keys()).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::CorruptArtifact);
    }

    #[test]
    fn register_replaces_existing_model() {
        let mut context = RepositoryContext::new();
        let previous = context.register(Arc::new(SignedRepository::new()));
        assert!(previous.is_some());
        assert_eq!(context.models().len(), 3);
    }
}
