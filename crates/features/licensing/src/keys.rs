//! # Key Material
//!
//! Vendors hold a [`VendorKeys`] (Ed25519 signing key plus an optional shared secret);
//! consumers hold the matching [`ConsumerKeys`] (verifying key plus the same secret).
//! The secret is only needed by sealed artifact formats, which derive their AEAD keys
//! from it.
//!
//! A [`Keyset`] is the persisted form: a small postcard blob that the vendor keeps
//! private. Never commit it to version control.

use crate::error::LicenseError;
use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Input keying material shared between vendor and consumer for sealed formats.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wraps raw secret bytes.
    ///
    /// # Errors
    /// Returns [`LicenseError::Internal`] if `bytes` is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, LicenseError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(LicenseError::Internal {
                message: "Shared secret cannot be empty".into(),
                context: None,
            });
        }
        Ok(Self(bytes))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}

/// Vendor-side key material: signs (and, for sealed formats, encrypts) artifacts.
#[derive(Clone)]
pub struct VendorKeys {
    signing: SigningKey,
    secret: Option<SharedSecret>,
}

impl VendorKeys {
    #[must_use]
    pub const fn new(signing: SigningKey, secret: Option<SharedSecret>) -> Self {
        Self { signing, secret }
    }

    /// Builds keys from a 32-byte Ed25519 seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; 32], secret: Option<SharedSecret>) -> Self {
        Self::new(SigningKey::from_bytes(seed), secret)
    }

    /// Generates a fresh signing key from the operating system's CSPRNG.
    ///
    /// # Errors
    /// Returns [`LicenseError::Internal`] if the system RNG fails.
    #[cfg(feature = "issuance")]
    pub fn generate(secret: Option<SharedSecret>) -> Result<Self, LicenseError> {
        let mut seed = [0u8; 32];
        getrandom::fill(&mut seed).map_err(|e| LicenseError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to generate signing seed".into()),
        })?;
        let keys = Self::from_seed(&seed, secret);
        seed.zeroize();
        Ok(keys)
    }

    #[must_use]
    pub const fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    #[must_use]
    pub const fn secret(&self) -> Option<&SharedSecret> {
        self.secret.as_ref()
    }

    /// Derives the key material a consumer needs to read this vendor's artifacts.
    #[must_use]
    pub fn consumer_keys(&self) -> ConsumerKeys {
        ConsumerKeys::new(self.signing.verifying_key(), self.secret.clone())
    }

    /// Exports the persisted form of these keys.
    #[must_use]
    pub fn to_keyset(&self) -> Keyset {
        Keyset {
            signing_key: self.signing.to_bytes(),
            verifying_key: self.signing.verifying_key().to_bytes(),
            secret: self.secret.as_ref().map(|s| s.expose().to_vec()),
        }
    }
}

impl fmt::Debug for VendorKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorKeys")
            .field("verifying", &self.signing.verifying_key())
            .field("secret", &self.secret)
            .finish()
    }
}

/// Consumer-side key material: authenticates (and, for sealed formats, decrypts) artifacts.
#[derive(Debug, Clone)]
pub struct ConsumerKeys {
    verifying: VerifyingKey,
    secret: Option<SharedSecret>,
}

impl ConsumerKeys {
    #[must_use]
    pub const fn new(verifying: VerifyingKey, secret: Option<SharedSecret>) -> Self {
        Self { verifying, secret }
    }

    /// Builds keys from a raw 32-byte Ed25519 public key.
    ///
    /// # Errors
    /// Returns [`LicenseError::Internal`] if the bytes are not a valid curve point.
    pub fn from_public_bytes(
        public: &[u8; 32],
        secret: Option<SharedSecret>,
    ) -> Result<Self, LicenseError> {
        let verifying = VerifyingKey::from_bytes(public).map_err(|e| LicenseError::Internal {
            message: e.to_string().into(),
            context: Some("Invalid verifying key".into()),
        })?;
        Ok(Self::new(verifying, secret))
    }

    #[must_use]
    pub const fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }

    #[must_use]
    pub const fn secret(&self) -> Option<&SharedSecret> {
        self.secret.as_ref()
    }
}

/// Persisted key material.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Keyset {
    pub signing_key: [u8; 32],
    pub verifying_key: [u8; 32],
    pub secret: Option<Vec<u8>>,
}

impl Keyset {
    /// Generates a new keyset, optionally carrying a shared secret for sealed formats.
    ///
    /// # Errors
    /// Returns [`LicenseError::Internal`] if the system RNG fails or `secret` is empty.
    #[cfg(feature = "issuance")]
    pub fn generate(secret: Option<&[u8]>) -> Result<Self, LicenseError> {
        let secret = secret.map(SharedSecret::new).transpose()?;
        Ok(VendorKeys::generate(secret)?.to_keyset())
    }

    /// Decodes a keyset blob.
    ///
    /// # Errors
    /// Returns [`LicenseError::Encoding`] if the blob is not a keyset.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LicenseError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    /// Encodes the keyset for storage.
    ///
    /// # Errors
    /// Returns [`LicenseError::Encoding`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LicenseError> {
        Ok(postcard::to_stdvec(self)?)
    }

    fn shared_secret(&self) -> Result<Option<SharedSecret>, LicenseError> {
        self.secret.as_deref().map(SharedSecret::new).transpose()
    }

    /// Vendor keys, after checking that both halves belong together.
    ///
    /// # Errors
    /// Returns [`LicenseError::Internal`] if the stored public key does not match the
    /// signing key.
    pub fn vendor_keys(&self) -> Result<VendorKeys, LicenseError> {
        let keys = VendorKeys::from_seed(&self.signing_key, self.shared_secret()?);
        if keys.signing.verifying_key().to_bytes() != self.verifying_key {
            return Err(LicenseError::Internal {
                message: "Keyset public key does not match its signing key".into(),
                context: None,
            });
        }
        Ok(keys)
    }

    /// Consumer keys. Only the public half is used.
    ///
    /// # Errors
    /// Returns [`LicenseError::Internal`] for an invalid public key or empty secret.
    pub fn consumer_keys(&self) -> Result<ConsumerKeys, LicenseError> {
        ConsumerKeys::from_public_bytes(&self.verifying_key, self.shared_secret()?)
    }
}

impl fmt::Debug for Keyset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyset")
            .field("verifying_key", &self.verifying_key)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}
