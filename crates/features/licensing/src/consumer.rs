//! # Consumer Manager
//!
//! Holds at most one installed artifact per manager, persisted through a [`Store`].
//!
//! ```text
//!              install (ok)
//!   Uninstalled ───────────► Installed ──┐ install / view / verify
//!        ▲                      │  ◄─────┘
//!        └──────── uninstall ───┘
//! ```
//!
//! Readers ([`view`](LicenseConsumerManager::view),
//! [`verify`](LicenseConsumerManager::verify)) share the slot lock; install and
//! uninstall hold it exclusively for the whole read, decode, persist and swap sequence.

use crate::clock::{Clock, SystemClock};
use crate::error::LicenseError;
use crate::keys::ConsumerKeys;
use crate::manager::{LicenseConsumerManager, LicenseState};
use crate::repository::RepositoryContext;
use crate::store::{MemoryStore, Source, Store};
use parking_lot::RwLock;
use sigil_domain::constants::DEFAULT_CONSUMER_TYPE;
use sigil_domain::license::License;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a consumer manager needs.
#[derive(Debug)]
pub struct ConsumerParameters {
    subject: String,
    keys: ConsumerKeys,
    context: RepositoryContext,
    clock: Arc<dyn Clock>,
    store: Box<dyn Store>,
    consumer_type: String,
    consumers: u32,
}

impl ConsumerParameters {
    /// Parameters for one `"User"` consumer, an in-memory slot and the system clock.
    pub fn new(subject: impl Into<String>, keys: ConsumerKeys) -> Self {
        Self {
            subject: subject.into(),
            keys,
            context: RepositoryContext::new(),
            clock: Arc::new(SystemClock),
            store: Box::new(MemoryStore::new()),
            consumer_type: DEFAULT_CONSUMER_TYPE.to_owned(),
            consumers: 1,
        }
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

    /// Slot that persists the installed artifact.
    #[must_use]
    pub fn store(mut self, store: impl Store + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Consumer type and count this installation counts against the license.
    #[must_use]
    pub fn consumers(mut self, consumer_type: impl Into<String>, consumers: u32) -> Self {
        self.consumer_type = consumer_type.into();
        self.consumers = consumers;
        self
    }
}

#[derive(Debug)]
struct Installed {
    artifact: Vec<u8>,
    license: License,
}

/// Default consumer manager.
#[derive(Debug)]
pub struct BasicConsumerManager {
    params: ConsumerParameters,
    slot: RwLock<Option<Installed>>,
}

impl BasicConsumerManager {
    /// Creates a manager, restoring the installed state from the store if it holds a
    /// readable artifact.
    ///
    /// An artifact that fails to decode is ignored (the manager starts uninstalled and
    /// the next install overwrites it).
    ///
    /// # Errors
    /// [`LicenseError::InvalidPayload`] for a blank subject, [`LicenseError::StoreIo`] if
    /// an existing artifact cannot be read.
    pub fn new(params: ConsumerParameters) -> Result<Self, LicenseError> {
        if params.subject.trim().is_empty() {
            return Err(LicenseError::invalid("Consumer subject cannot be empty"));
        }

        let restored = if params.store.exists() {
            let artifact = params.store.read()?;
            match params.context.decode(&artifact, &params.keys) {
                Ok(license) => {
                    debug!(subject = %params.subject, "Restored installed license");
                    Some(Installed { artifact, license })
                }
                Err(err) => {
                    warn!(subject = %params.subject, error = %err, "Ignoring unreadable stored license");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self { params, slot: RwLock::new(restored) })
    }

    /// Applies the business rules to an authenticated license.
    fn check(&self, license: &License) -> Result<(), LicenseError> {
        let params = &self.params;
        if license.subject() != params.subject {
            return Err(LicenseError::InvalidPayload {
                message: format!(
                    "License subject '{}' does not match '{}'",
                    license.subject(),
                    params.subject
                )
                .into(),
                context: None,
            });
        }

        let now = params.clock.now_secs();
        if let Some(not_before) = license.not_before()
            && now < not_before
        {
            return Err(LicenseError::NotYetValid {
                message: format!("valid from {not_before}, now {now}").into(),
                context: None,
            });
        }
        if let Some(not_after) = license.not_after()
            && now > not_after
        {
            return Err(LicenseError::Expired {
                message: format!("valid until {not_after}, now {now}").into(),
                context: None,
            });
        }

        if license.consumer_type() != params.consumer_type {
            return Err(LicenseError::ConsumerLimitExceeded {
                message: format!(
                    "License counts '{}' consumers, installation requires '{}'",
                    license.consumer_type(),
                    params.consumer_type
                )
                .into(),
                context: None,
            });
        }
        if params.consumers > license.consumer_amount() {
            return Err(LicenseError::ConsumerLimitExceeded {
                message: format!(
                    "{} consumers requested, license admits {}",
                    params.consumers,
                    license.consumer_amount()
                )
                .into(),
                context: None,
            });
        }
        Ok(())
    }

    /// Re-reads and re-authenticates the persisted artifact, which must still be the
    /// installed one. Returns the license that passed the checks.
    fn verify_locked(&self, installed: &Installed) -> Result<License, LicenseError> {
        let artifact = self.params.store.read()?;
        if artifact != installed.artifact {
            return Err(LicenseError::unauthenticated(
                "Stored artifact differs from the installed one",
            ));
        }
        let license = self.params.context.decode(&artifact, &self.params.keys)?;
        self.check(&license)?;
        Ok(license)
    }
}

impl LicenseConsumerManager for BasicConsumerManager {
    fn subject(&self) -> &str {
        &self.params.subject
    }

    fn state(&self) -> LicenseState {
        if self.slot.read().is_some() { LicenseState::Installed } else { LicenseState::Uninstalled }
    }

    fn install(&self, source: &dyn Source) -> Result<License, LicenseError> {
        let mut slot = self.slot.write();

        let installed = source
            .read()
            .and_then(|artifact| {
                let license = self.params.context.decode(&artifact, &self.params.keys)?;
                Ok(Installed { artifact, license })
            })
            .inspect_err(|err| {
                warn!(subject = %self.params.subject, error = %err, "License install rejected");
            })?;

        self.params.store.write(&installed.artifact)?;
        let license = installed.license.clone();
        *slot = Some(installed);

        debug!(subject = %self.params.subject, holder = %license.holder(), "License installed");
        Ok(license)
    }

    fn view(&self) -> Result<License, LicenseError> {
        self.slot
            .read()
            .as_ref()
            .map(|installed| installed.license.clone())
            .ok_or_else(LicenseError::not_installed)
    }

    fn verify(&self) -> Result<(), LicenseError> {
        self.view_verified().map(drop)
    }

    fn view_verified(&self) -> Result<License, LicenseError> {
        let slot = self.slot.read();
        let installed = slot.as_ref().ok_or_else(LicenseError::not_installed)?;
        self.verify_locked(installed).inspect_err(|err| {
            warn!(subject = %self.params.subject, error = %err, "License verification failed");
        })
    }

    fn uninstall(&self) -> Result<(), LicenseError> {
        let mut slot = self.slot.write();
        if slot.is_none() {
            return Err(LicenseError::not_installed());
        }
        self.params.store.delete()?;
        *slot = None;

        debug!(subject = %self.params.subject, "License uninstalled");
        Ok(())
    }
}
