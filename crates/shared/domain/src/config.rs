use crate::constants::{DEFAULT_CONSUMER_TYPE, DEFAULT_REPOSITORY_VERSION};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration shared by the vendor and consumer tooling.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SigilConfigInner {
    pub licensing: LicensingConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct SigilConfig {
    #[serde(flatten, default)]
    inner: Arc<SigilConfigInner>,
}

impl Deref for SigilConfig {
    type Target = SigilConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SigilConfig {
    fn deref_mut(&mut self) -> &mut SigilConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// License manager settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LicensingConfig {
    /// Product the managers are bound to.
    pub subject: String,
    /// Artifact format tag used when writing (`"v1"`, `"v2"`, `"v3"`).
    pub version: String,
    /// Postcard-encoded keyset file.
    pub keyset: PathBuf,
    /// Shared secret for encrypted artifact formats.
    pub secret: Option<String>,
    /// File holding the installed artifact on the consumer side.
    pub store: PathBuf,
    /// Consumer type this installation counts against.
    pub consumer_type: String,
    /// Number of consumers this installation requires.
    pub consumers: u32,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Optional `EnvFilter` directives, e.g. `"sigil_licensing=debug"`.
    pub filter: Option<String>,
    /// Directory for rolling log files; console only when absent.
    pub directory: Option<PathBuf>,
    /// Emit JSON lines in log files.
    pub json: bool,
}

// --- Default ---

impl Default for LicensingConfig {
    fn default() -> Self {
        Self {
            subject: "sigil".to_owned(),
            version: DEFAULT_REPOSITORY_VERSION.to_owned(),
            keyset: PathBuf::from("private/keyset"),
            secret: None,
            store: PathBuf::from("license.lic"),
            consumer_type: DEFAULT_CONSUMER_TYPE.to_owned(),
            consumers: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, directory: None, json: false }
    }
}
