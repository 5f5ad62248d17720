//! Shared artifact framing: header, canonical payload bytes and Ed25519 signatures.

use super::RepositoryModel;
use crate::error::LicenseError;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use sigil_domain::license::License;

pub(crate) const MAGIC: [u8; 4] = *b"SGL\0";
pub(crate) const HEADER_LEN: usize = MAGIC.len() + 1;
pub(crate) const SIGNATURE_LEN: usize = 64;

pub(crate) fn header(model: RepositoryModel) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..MAGIC.len()].copy_from_slice(&MAGIC);
    header[MAGIC.len()] = model.version();
    header
}

/// Reads the model from an artifact header.
pub(crate) fn peek(artifact: &[u8]) -> Result<RepositoryModel, LicenseError> {
    if artifact.len() < HEADER_LEN {
        return Err(LicenseError::CorruptArtifact {
            message: format!("Artifact too short ({} bytes)", artifact.len()).into(),
            context: None,
        });
    }
    if artifact[..MAGIC.len()] != MAGIC {
        return Err(LicenseError::corrupt("Not a license artifact"));
    }
    let version = artifact[MAGIC.len()];
    RepositoryModel::from_version(version).ok_or_else(|| LicenseError::CorruptArtifact {
        message: "Unsupported artifact version".into(),
        context: Some(format!("version={version}").into()),
    })
}

/// Splits `HEADER | SIGNATURE | BODY`, checking the header belongs to `expected`.
pub(crate) fn split(
    artifact: &[u8],
    expected: RepositoryModel,
    min_body: usize,
) -> Result<(&[u8], &[u8], &[u8]), LicenseError> {
    let model = peek(artifact)?;
    if model != expected {
        return Err(LicenseError::CorruptArtifact {
            message: format!("Artifact is {model}, repository reads {expected}").into(),
            context: None,
        });
    }
    if artifact.len() < HEADER_LEN + SIGNATURE_LEN + min_body {
        return Err(LicenseError::CorruptArtifact {
            message: format!("Artifact truncated ({} bytes)", artifact.len()).into(),
            context: Some(model.as_str().into()),
        });
    }
    let (header, rest) = artifact.split_at(HEADER_LEN);
    let (signature, body) = rest.split_at(SIGNATURE_LEN);
    Ok((header, signature, body))
}

pub(crate) fn sign(key: &SigningKey, header: &[u8], body: &[u8]) -> [u8; SIGNATURE_LEN] {
    key.sign(&[header, body].concat()).to_bytes()
}

pub(crate) fn verify(
    key: &VerifyingKey,
    header: &[u8],
    body: &[u8],
    signature: &[u8],
) -> Result<(), LicenseError> {
    let signature = Signature::from_slice(signature)
        .map_err(|_| LicenseError::unauthenticated("Malformed signature"))?;
    key.verify_strict(&[header, body].concat(), &signature)
        .map_err(|_| LicenseError::unauthenticated("Signature does not match"))
}

pub(crate) fn assemble(header: &[u8], signature: &[u8], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.len() + signature.len() + body.len());
    out.extend_from_slice(header);
    out.extend_from_slice(signature);
    out.extend_from_slice(body);
    out
}

/// Canonical payload bytes.
pub(crate) fn to_payload(license: &License) -> Result<Vec<u8>, LicenseError> {
    Ok(postcard::to_stdvec(license)?)
}

/// Deserializes an authenticated payload. Trailing bytes are rejected.
pub(crate) fn from_payload(payload: &[u8]) -> Result<License, LicenseError> {
    match postcard::take_from_bytes::<License>(payload) {
        Ok((license, [])) => Ok(license),
        Ok((_, rest)) => Err(LicenseError::CorruptArtifact {
            message: format!("{} trailing bytes after payload", rest.len()).into(),
            context: None,
        }),
        Err(e) => Err(LicenseError::CorruptArtifact {
            message: e.to_string().into(),
            context: Some("payload".into()),
        }),
    }
}
