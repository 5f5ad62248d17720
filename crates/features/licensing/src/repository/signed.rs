use super::envelope::{self, SIGNATURE_LEN};
use super::{Repository, RepositoryModel};
use crate::error::LicenseError;
use crate::keys::{ConsumerKeys, VendorKeys};
use sigil_domain::license::License;

/// `v1`: plaintext payload under an Ed25519 signature.
///
/// ```text
/// [MAGIC(4)][V(1)][SIGNATURE(64)][PAYLOAD(N)]
/// ```
///
/// The signature covers the header and the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedRepository;

impl SignedRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Repository for SignedRepository {
    fn model(&self) -> RepositoryModel {
        RepositoryModel::V1
    }

    fn encode(&self, license: &License, keys: &VendorKeys) -> Result<Vec<u8>, LicenseError> {
        let header = envelope::header(RepositoryModel::V1);
        let payload = envelope::to_payload(license)?;
        let signature = envelope::sign(keys.signing_key(), &header, &payload);
        debug_assert_eq!(signature.len(), SIGNATURE_LEN);
        Ok(envelope::assemble(&header, &signature, &payload))
    }

    fn decode(&self, artifact: &[u8], keys: &ConsumerKeys) -> Result<License, LicenseError> {
        let (header, signature, payload) = envelope::split(artifact, RepositoryModel::V1, 0)?;
        envelope::verify(keys.verifying_key(), header, payload, signature)?;
        envelope::from_payload(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LicenseErrorKind;

    fn keys() -> VendorKeys {
        VendorKeys::from_seed(&[7u8; 32], None)
    }

    fn license() -> License {
        License::builder().subject("Widget").issuer("CN=Widget").holder("CN=Acme").build()
    }

    #[test]
    fn roundtrip() {
        let repo = SignedRepository::new();
        let artifact = repo.encode(&license(), &keys()).unwrap();
        assert_eq!(repo.decode(&artifact, &keys().consumer_keys()).unwrap(), license());
    }

    #[test]
    fn foreign_vendor_is_rejected() {
        let repo = SignedRepository::new();
        let artifact = repo.encode(&license(), &keys()).unwrap();
        let stranger = VendorKeys::from_seed(&[8u8; 32], None).consumer_keys();

        let err = repo.decode(&artifact, &stranger).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::AuthenticationFailed);
    }

    #[test]
    fn appended_bytes_fail_authentication() {
        let repo = SignedRepository::new();
        let mut artifact = repo.encode(&license(), &keys()).unwrap();
        artifact.push(0);

        let err = repo.decode(&artifact, &keys().consumer_keys()).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::AuthenticationFailed);
    }
}
