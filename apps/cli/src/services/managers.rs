//! Builds vendor and consumer managers from the licensing configuration.

use anyhow::{Context, Result};
use sigil_kernel::domain::config::LicensingConfig;
use sigil_licensing::prelude::*;

/// Reads the keyset file named in the configuration.
pub fn load_keyset(config: &LicensingConfig) -> Result<Keyset> {
    let bytes = FileStore::new(&config.keyset)
        .read()
        .with_context(|| format!("No keyset at {}; run `sigil keygen` first", config.keyset.display()))?;
    Keyset::from_bytes(&bytes).context("Failed to deserialize keyset")
}

/// The configured secret wins over the one stored in the keyset.
fn secret_override(config: &LicensingConfig) -> Result<Option<SharedSecret>> {
    config
        .secret
        .as_deref()
        .map(|secret| SharedSecret::new(secret.as_bytes()))
        .transpose()
        .context("Invalid licensing.secret")
}

/// Vendor manager writing `model`, or the configured version when `None`.
pub fn vendor_manager(
    config: &LicensingConfig,
    model: Option<RepositoryModel>,
) -> Result<BasicVendorManager> {
    let keyset = load_keyset(config)?;
    let mut keys = keyset.vendor_keys()?;
    if let Some(secret) = secret_override(config)? {
        keys = VendorKeys::new(keys.signing_key().clone(), Some(secret));
    }
    let model = match model {
        Some(model) => model,
        None => config.version.parse().context("Invalid licensing.version")?,
    };

    Ok(BasicVendorManager::new(VendorParameters::new(&config.subject, keys).model(model))?)
}

pub fn consumer_manager(config: &LicensingConfig) -> Result<BasicConsumerManager> {
    let keyset = load_keyset(config)?;
    let mut keys = keyset.consumer_keys()?;
    if let Some(secret) = secret_override(config)? {
        keys = ConsumerKeys::new(*keys.verifying_key(), Some(secret));
    }

    let params = ConsumerParameters::new(&config.subject, keys)
        .store(FileStore::new(&config.store))
        .consumers(&config.consumer_type, config.consumers);
    Ok(BasicConsumerManager::new(params)?)
}
