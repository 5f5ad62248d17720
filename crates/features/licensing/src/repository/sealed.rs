use super::envelope;
use super::{Repository, RepositoryModel};
use crate::error::LicenseError;
use crate::keys::{ConsumerKeys, SharedSecret, VendorKeys};
use aead::inout::InOutBuf;
use aead::{AeadInOut, Key, KeyInit, Nonce};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use sigil_domain::license::License;
use std::fmt;
use std::marker::PhantomData;
use zeroize::Zeroizing;

const KDF_SALT: &[u8] = b"sigil-license-artifact";
const NONCE_INFO: &[u8] = b"sigil:nonce";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// `v2`: AES-256-GCM sealed artifacts.
pub type AesGcmRepository = SealedRepository<Aes256Gcm>;

/// `v3`: ChaCha20-Poly1305 sealed artifacts.
pub type ChaChaRepository = SealedRepository<ChaCha20Poly1305>;

/// Encrypt-then-sign repository over an AEAD cipher.
///
/// ```text
/// [MAGIC(4)][V(1)][SIGNATURE(64)][NONCE(12)][CIPHERTEXT(N)][TAG(16)]
/// ```
///
/// - The AEAD key is HKDF-SHA256 of the shared secret, bound to the model tag.
/// - The nonce is HKDF of the AEAD key and the payload digest, so encoding is
///   deterministic and distinct payloads never share a nonce.
/// - The header is the associated data; the signature covers header, nonce,
///   ciphertext and tag.
pub struct SealedRepository<C> {
    model: RepositoryModel,
    _cipher: PhantomData<fn() -> C>,
}

impl SealedRepository<Aes256Gcm> {
    #[must_use]
    pub const fn new() -> Self {
        Self { model: RepositoryModel::V2, _cipher: PhantomData }
    }
}

impl Default for SealedRepository<Aes256Gcm> {
    fn default() -> Self {
        Self::new()
    }
}

impl SealedRepository<ChaCha20Poly1305> {
    #[must_use]
    pub const fn new() -> Self {
        Self { model: RepositoryModel::V3, _cipher: PhantomData }
    }
}

impl Default for SealedRepository<ChaCha20Poly1305> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for SealedRepository<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedRepository").field("model", &self.model).finish()
    }
}

impl<C: AeadInOut + KeyInit> SealedRepository<C> {
    fn key_material(&self, secret: &SharedSecret) -> Result<Zeroizing<[u8; KEY_LEN]>, LicenseError> {
        let (_, hk) = Hkdf::<Sha256>::extract(Some(KDF_SALT), secret.expose());
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        hk.expand(self.model.as_str().as_bytes(), key.as_mut_slice())
            .map_err(|_| LicenseError::from("HKDF expansion failed for artifact key"))?;
        Ok(key)
    }

    fn nonce(key: &[u8; KEY_LEN], payload: &[u8]) -> Result<Nonce<C>, LicenseError> {
        let digest = Sha256::digest(payload);
        let (_, hk) = Hkdf::<Sha256>::extract(Some(&key[..]), &digest);
        let mut nonce = [0u8; NONCE_LEN];
        hk.expand(NONCE_INFO, &mut nonce)
            .map_err(|_| LicenseError::from("HKDF expansion failed for artifact nonce"))?;
        Nonce::<C>::try_from(&nonce[..])
            .map_err(|_| LicenseError::from(format!("Cipher nonce is not {NONCE_LEN} bytes")))
    }

    fn cipher(key: &[u8; KEY_LEN]) -> Result<C, LicenseError> {
        let key = Key::<C>::try_from(&key[..])
            .map_err(|_| LicenseError::from(format!("Cipher key is not {KEY_LEN} bytes")))?;
        Ok(C::new(&key))
    }
}

impl<C: AeadInOut + KeyInit> Repository for SealedRepository<C> {
    fn model(&self) -> RepositoryModel {
        self.model
    }

    fn encode(&self, license: &License, keys: &VendorKeys) -> Result<Vec<u8>, LicenseError> {
        let secret = keys.secret().ok_or_else(|| LicenseError::Internal {
            message: "Vendor keys carry no shared secret".into(),
            context: Some(format!("{} artifacts are encrypted", self.model).into()),
        })?;

        let header = envelope::header(self.model);
        let payload = Zeroizing::new(envelope::to_payload(license)?);
        let key = self.key_material(secret)?;
        let nonce = Self::nonce(&key, &payload)?;
        let cipher = Self::cipher(&key)?;

        let mut body = Vec::with_capacity(NONCE_LEN + payload.len() + TAG_LEN);
        body.extend_from_slice(&nonce);
        body.extend_from_slice(&payload);

        let in_out = InOutBuf::from(&mut body[NONCE_LEN..]);
        let tag = cipher
            .encrypt_inout_detached(&nonce, &header, in_out)
            .map_err(|_| LicenseError::from("AEAD encryption failed"))?;
        body.extend_from_slice(tag.as_slice());

        let signature = envelope::sign(keys.signing_key(), &header, &body);
        Ok(envelope::assemble(&header, &signature, &body))
    }

    fn decode(&self, artifact: &[u8], keys: &ConsumerKeys) -> Result<License, LicenseError> {
        let (header, signature, body) = envelope::split(artifact, self.model, NONCE_LEN + TAG_LEN)?;
        envelope::verify(keys.verifying_key(), header, body, signature)?;

        let secret = keys.secret().ok_or_else(|| LicenseError::AuthenticationFailed {
            message: "Consumer keys carry no shared secret".into(),
            context: Some(format!("{} artifacts are encrypted", self.model).into()),
        })?;

        let (nonce_slice, rest) = body.split_at(NONCE_LEN);
        let (ciphertext, tag_slice) = rest.split_at(rest.len() - TAG_LEN);

        let nonce = nonce_slice
            .try_into()
            .map_err(|_| LicenseError::corrupt("Invalid nonce length"))?;
        let tag =
            tag_slice.try_into().map_err(|_| LicenseError::corrupt("Invalid tag length"))?;

        let key = self.key_material(secret)?;
        let cipher = Self::cipher(&key)?;

        let mut payload = Zeroizing::new(ciphertext.to_vec());
        let in_out = InOutBuf::from(&mut payload[..]);
        cipher
            .decrypt_inout_detached(&nonce, header, in_out, &tag)
            .map_err(|_| LicenseError::unauthenticated("AEAD authentication failed"))?;

        envelope::from_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LicenseErrorKind;

    fn keys(secret: &[u8]) -> VendorKeys {
        VendorKeys::from_seed(&[5u8; 32], Some(SharedSecret::new(secret.to_vec()).unwrap()))
    }

    fn license() -> License {
        License::builder().subject("Widget").info("confidential terms").build()
    }

    #[test]
    fn payload_is_not_visible_in_artifact() {
        let artifact = AesGcmRepository::new().encode(&license(), &keys(b"s")).unwrap();
        let needle = b"confidential terms";
        assert!(!artifact.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn ciphers_produce_distinct_artifacts() {
        let v2 = AesGcmRepository::new().encode(&license(), &keys(b"s")).unwrap();
        let v3 = ChaChaRepository::new().encode(&license(), &keys(b"s")).unwrap();
        assert_ne!(v2[envelope::HEADER_LEN..], v3[envelope::HEADER_LEN..]);
    }

    #[test]
    fn wrong_secret_fails_authentication() {
        let repo = ChaChaRepository::new();
        let artifact = repo.encode(&license(), &keys(b"right")).unwrap();

        let err = repo.decode(&artifact, &keys(b"wrong").consumer_keys()).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::AuthenticationFailed);
    }

    #[test]
    fn missing_secret_fails_authentication() {
        let repo = AesGcmRepository::new();
        let artifact = repo.encode(&license(), &keys(b"s")).unwrap();
        let public_only = ConsumerKeys::new(*keys(b"s").consumer_keys().verifying_key(), None);

        let err = repo.decode(&artifact, &public_only).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::AuthenticationFailed);
    }

    #[test]
    fn encoding_without_secret_is_an_internal_error() {
        let bare = VendorKeys::from_seed(&[5u8; 32], None);
        let err = AesGcmRepository::new().encode(&license(), &bare).unwrap_err();
        assert_eq!(err.kind(), LicenseErrorKind::Internal);
    }
}
