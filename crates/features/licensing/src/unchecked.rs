//! # Unchecked Adapters
//!
//! Wrappers exposing the manager operations without `Result`. Any [`LicenseError`] is
//! raised as a panic whose payload is an [`UncheckedLicenseError`] carrying the
//! original error untouched. Recover it with [`catch_unchecked`].
//!
//! The adapters add no behavior of their own; [`UncheckedConsumerManager::checked`] and
//! friends hand back the wrapped instance.
//!
//! Binaries built with `panic = "abort"` cannot recover these panics.

use crate::error::{LicenseError, LicenseErrorKind};
use crate::manager::{KeyGenerator, LicenseConsumerManager, LicenseState, LicenseVendorManager};
use crate::store::{Sink, Source};
use sigil_domain::license::License;
use std::panic::{self, UnwindSafe};

/// The single failure raised by unchecked adapters.
#[derive(Debug, thiserror::Error)]
#[error("Unchecked license failure: {source}")]
pub struct UncheckedLicenseError {
    #[from]
    source: LicenseError,
}

impl UncheckedLicenseError {
    /// Kind of the wrapped error.
    #[must_use]
    pub const fn kind(&self) -> LicenseErrorKind {
        self.source.kind()
    }

    #[must_use]
    pub const fn get_ref(&self) -> &LicenseError {
        &self.source
    }

    #[must_use]
    pub fn into_inner(self) -> LicenseError {
        self.source
    }
}

fn raise<T>(result: Result<T, LicenseError>) -> T {
    match result {
        Ok(value) => value,
        Err(source) => panic::panic_any(UncheckedLicenseError { source }),
    }
}

/// Runs `f`, turning an unchecked license panic back into an error.
///
/// Panics with any other payload are resumed.
///
/// # Errors
/// Returns the [`UncheckedLicenseError`] raised inside `f`.
pub fn catch_unchecked<T>(f: impl FnOnce() -> T + UnwindSafe) -> Result<T, UncheckedLicenseError> {
    panic::catch_unwind(f).map_err(|payload| match payload.downcast::<UncheckedLicenseError>() {
        Ok(err) => *err,
        Err(other) => panic::resume_unwind(other),
    })
}

/// Unchecked view of a [`LicenseConsumerManager`].
#[derive(Debug)]
pub struct UncheckedConsumerManager<M> {
    manager: M,
}

impl<M: LicenseConsumerManager> UncheckedConsumerManager<M> {
    pub const fn new(manager: M) -> Self {
        Self { manager }
    }

    pub const fn checked(&self) -> &M {
        &self.manager
    }

    pub fn into_checked(self) -> M {
        self.manager
    }

    pub fn subject(&self) -> &str {
        self.manager.subject()
    }

    pub fn state(&self) -> LicenseState {
        self.manager.state()
    }

    pub fn install(&self, source: &dyn Source) -> License {
        raise(self.manager.install(source))
    }

    pub fn view(&self) -> License {
        raise(self.manager.view())
    }

    pub fn verify(&self) {
        raise(self.manager.verify());
    }

    pub fn view_verified(&self) -> License {
        raise(self.manager.view_verified())
    }

    pub fn uninstall(&self) {
        raise(self.manager.uninstall());
    }
}

/// Unchecked view of a [`LicenseVendorManager`].
#[derive(Debug)]
pub struct UncheckedVendorManager<M> {
    manager: M,
}

impl<M: LicenseVendorManager> UncheckedVendorManager<M> {
    pub const fn new(manager: M) -> Self {
        Self { manager }
    }

    pub const fn checked(&self) -> &M {
        &self.manager
    }

    pub fn into_checked(self) -> M {
        self.manager
    }

    pub fn subject(&self) -> &str {
        self.manager.subject()
    }

    pub fn generator(&self, license: License) -> UncheckedGenerator<M::Generator> {
        UncheckedGenerator::new(raise(self.manager.generator(license)))
    }
}

/// Unchecked view of a [`KeyGenerator`].
#[derive(Debug)]
pub struct UncheckedGenerator<G> {
    generator: G,
}

impl<G: KeyGenerator> UncheckedGenerator<G> {
    pub const fn new(generator: G) -> Self {
        Self { generator }
    }

    pub const fn checked(&self) -> &G {
        &self.generator
    }

    pub fn into_checked(self) -> G {
        self.generator
    }

    pub fn license(&self) -> &License {
        self.generator.license()
    }

    pub fn write_to(&self, sink: &dyn Sink) {
        raise(self.generator.write_to(sink));
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        raise(self.generator.to_bytes())
    }
}
