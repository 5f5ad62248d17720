//! # Licensing System
//!
//! License issuance on the vendor side and installation/verification on the consumer
//! side, over authenticated binary artifacts.
//!
//! ## Architecture
//!
//! 1.  **Repositories ([`repository`]):** versioned codecs. Every artifact is signed with
//!     Ed25519; `v2` and `v3` additionally encrypt the payload with an AEAD cipher.
//! 2.  **Vendor ([`vendor`]):** normalizes and validates a [`License`] and writes the
//!     artifact through a [`Sink`](store::Sink).
//! 3.  **Consumer ([`consumer`]):** installs an artifact from a [`Source`](store::Source), keeps it in a
//!     [`Store`](store::Store), and verifies it against a [`Clock`](clock::Clock) and consumer limits.
//! 4.  **Unchecked adapters ([`unchecked`]):** the same operations without `Result`.
//!
//! Key generation (`VendorKeys::generate`, `Keyset::generate`) is gated behind the
//! `issuance` feature so consumer builds do not pull in an RNG.
//!
//! ## Example
//!
//! ```rust
//! use sigil_licensing::prelude::*;
//!
//! let keys = VendorKeys::from_seed(&[7u8; 32], None);
//! let vendor = BasicVendorManager::new(VendorParameters::new("Widget", keys.clone())).unwrap();
//! let artifact = vendor.generator(License::builder().holder("CN=Acme").build()).unwrap();
//!
//! let store = MemoryStore::new();
//! artifact.write_to(&store).unwrap();
//!
//! let consumer =
//!     BasicConsumerManager::new(ConsumerParameters::new("Widget", keys.consumer_keys())).unwrap();
//! consumer.install(&store).unwrap();
//! consumer.verify().unwrap();
//! assert_eq!(consumer.view().unwrap().holder(), "CN=Acme");
//! ```

pub mod clock;
pub mod consumer;
mod error;
pub mod keys;
pub mod manager;
pub mod repository;
pub mod store;
pub mod unchecked;
pub mod vendor;

pub use crate::error::{LicenseError, LicenseErrorExt, LicenseErrorKind};
pub use sigil_domain::license::{License, LicenseBuilder};

pub type Result<T> = std::result::Result<T, LicenseError>;

pub mod prelude {
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::consumer::{BasicConsumerManager, ConsumerParameters};
    pub use crate::keys::{ConsumerKeys, Keyset, SharedSecret, VendorKeys};
    pub use crate::manager::{
        KeyGenerator, LicenseConsumerManager, LicenseState, LicenseVendorManager,
    };
    pub use crate::repository::{Repository, RepositoryContext, RepositoryModel};
    pub use crate::store::{FileStore, MemoryStore, Sink, Source, Store};
    pub use crate::unchecked::{UncheckedLicenseError, catch_unchecked};
    pub use crate::vendor::{BasicVendorManager, LicenseKeyGenerator, VendorParameters};
    pub use crate::{License, LicenseBuilder, LicenseError, LicenseErrorKind};
}
