use anyhow::{Result, bail};
use sigil_kernel::domain::config::LicensingConfig;
use sigil_licensing::prelude::*;
use tracing::info;

/// Generates a keyset and writes it to the configured path.
///
/// # Errors
/// Fails if a keyset already exists and `force` is not set, or if writing fails.
pub fn generate_keyset(config: &LicensingConfig, secret: Option<&str>, force: bool) -> Result<()> {
    let store = FileStore::new(&config.keyset);
    if store.exists() && !force {
        bail!("Keyset {} already exists; pass --force to replace it", config.keyset.display());
    }

    let keyset = Keyset::generate(secret.map(str::as_bytes))?;
    store.write(&keyset.to_bytes()?)?;

    info!(path = %config.keyset.display(), sealed = keyset.secret.is_some(), "Keyset generated");
    println!("Keyset written to {}", config.keyset.display());
    println!("Keep it private: anyone holding it can issue licenses.");
    Ok(())
}
