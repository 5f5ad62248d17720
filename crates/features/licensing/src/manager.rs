//! Checked manager surfaces.
//!
//! Every operation reports failure as a [`LicenseError`]. Wrap a manager with
//! `.unchecked()` to get the same operations returning plain values.

use crate::error::LicenseError;
use crate::store::{Sink, Source};
use crate::unchecked::{UncheckedConsumerManager, UncheckedGenerator, UncheckedVendorManager};
use sigil_domain::license::License;
use std::fmt;

/// Whether a consumer manager currently holds an installed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LicenseState {
    Uninstalled,
    Installed,
}

impl fmt::Display for LicenseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninstalled => "uninstalled",
            Self::Installed => "installed",
        })
    }
}

/// A payload bound for issuance.
pub trait KeyGenerator {
    /// The normalized license this generator writes.
    fn license(&self) -> &License;

    /// Encodes the bound license and writes the artifact to `sink`.
    fn write_to(&self, sink: &dyn Sink) -> Result<(), LicenseError>;

    /// Encodes the bound license without writing it anywhere.
    fn to_bytes(&self) -> Result<Vec<u8>, LicenseError>;

    fn unchecked(self) -> UncheckedGenerator<Self>
    where
        Self: Sized,
    {
        UncheckedGenerator::new(self)
    }
}

/// Vendor side: issues artifacts for one subject.
pub trait LicenseVendorManager {
    type Generator: KeyGenerator;

    fn subject(&self) -> &str;

    /// Normalizes and validates `license`, binding it to a generator.
    fn generator(&self, license: License) -> Result<Self::Generator, LicenseError>;

    fn unchecked(self) -> UncheckedVendorManager<Self>
    where
        Self: Sized,
    {
        UncheckedVendorManager::new(self)
    }
}

/// Consumer side: installs, inspects and verifies one artifact for one subject.
pub trait LicenseConsumerManager {
    fn subject(&self) -> &str;

    fn state(&self) -> LicenseState;

    /// Authenticates the artifact read from `source` and makes it the installed one.
    /// On failure the previous state is kept.
    fn install(&self, source: &dyn Source) -> Result<License, LicenseError>;

    /// The installed license, without re-authentication.
    fn view(&self) -> Result<License, LicenseError>;

    /// Re-authenticates the persisted artifact and checks validity and consumer limits.
    fn verify(&self) -> Result<(), LicenseError>;

    /// [`Self::view`] after a successful [`Self::verify`].
    fn view_verified(&self) -> Result<License, LicenseError>;

    fn uninstall(&self) -> Result<(), LicenseError>;

    fn unchecked(self) -> UncheckedConsumerManager<Self>
    where
        Self: Sized,
    {
        UncheckedConsumerManager::new(self)
    }
}
