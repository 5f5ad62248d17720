//! # Artifact Repositories
//!
//! A repository turns a [`License`] into an authenticated artifact and back. Each
//! [`RepositoryModel`] pairs one codec with one authentication scheme:
//!
//! | Model | Byte | Authentication                         |
//! |-------|------|----------------------------------------|
//! | `v1`  | 0x01 | Ed25519 signature                      |
//! | `v2`  | 0x02 | AES-256-GCM, then Ed25519 signature    |
//! | `v3`  | 0x03 | ChaCha20-Poly1305, then Ed25519 signature |
//!
//! Every artifact starts with the same five-byte header (`"SGL\0"` + version byte), so
//! [`RepositoryContext`] can dispatch an artifact to the repository that wrote it.
//! Decoding always authenticates before the payload is deserialized.

mod context;
mod envelope;
mod sealed;
mod signed;

pub use context::RepositoryContext;
pub use sealed::{AesGcmRepository, ChaChaRepository, SealedRepository};
pub use signed::SignedRepository;

use crate::error::LicenseError;
use crate::keys::{ConsumerKeys, VendorKeys};
use serde::{Deserialize, Serialize};
use sigil_domain::license::License;
use std::fmt;
use std::str::FromStr;

/// Version tag selecting one codec/authentication pairing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryModel {
    #[default]
    V1,
    V2,
    V3,
}

impl RepositoryModel {
    pub const ALL: [Self; 3] = [Self::V1, Self::V2, Self::V3];

    /// Version byte written into the artifact header.
    #[must_use]
    pub const fn version(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    #[must_use]
    pub const fn from_version(version: u8) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
        }
    }

    /// Whether the payload is encrypted and needs a shared secret.
    #[must_use]
    pub const fn is_sealed(self) -> bool {
        !matches!(self, Self::V1)
    }
}

impl fmt::Display for RepositoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepositoryModel {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            "v3" => Ok(Self::V3),
            other => Err(LicenseError::InvalidPayload {
                message: format!("Unknown repository model '{other}'").into(),
                context: Some("expected one of v1, v2, v3".into()),
            }),
        }
    }
}

/// Codec plus authentication for one [`RepositoryModel`].
///
/// Implementations must be deterministic: the same license and keys always produce the
/// same bytes.
pub trait Repository: Send + Sync + fmt::Debug {
    fn model(&self) -> RepositoryModel;

    /// Encodes and authenticates `license`.
    ///
    /// # Errors
    /// [`LicenseError::Encoding`] if the payload cannot be serialized, or
    /// [`LicenseError::Internal`] if the vendor keys lack material this model needs.
    fn encode(&self, license: &License, keys: &VendorKeys) -> Result<Vec<u8>, LicenseError>;

    /// Authenticates and decodes `artifact`.
    ///
    /// # Errors
    /// [`LicenseError::CorruptArtifact`] for malformed input, or
    /// [`LicenseError::AuthenticationFailed`] if verification fails.
    fn decode(&self, artifact: &[u8], keys: &ConsumerKeys) -> Result<License, LicenseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_tags_roundtrip() {
        for model in RepositoryModel::ALL {
            assert_eq!(model.as_str().parse::<RepositoryModel>().unwrap(), model);
            assert_eq!(RepositoryModel::from_version(model.version()), Some(model));
        }
        assert_eq!(" V2 ".parse::<RepositoryModel>().unwrap(), RepositoryModel::V2);
        assert!("v4".parse::<RepositoryModel>().is_err());
        assert_eq!(RepositoryModel::from_version(0), None);
    }

    #[test]
    fn only_v1_is_unsealed() {
        assert!(!RepositoryModel::V1.is_sealed());
        assert!(RepositoryModel::V2.is_sealed());
        assert!(RepositoryModel::V3.is_sealed());
    }
}
