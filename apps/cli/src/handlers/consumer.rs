use crate::handlers::print_license;
use crate::services::managers;
use anyhow::{Context, Result};
use sigil_kernel::domain::config::LicensingConfig;
use sigil_licensing::prelude::*;
use std::path::Path;

pub fn install(config: &LicensingConfig, path: &Path) -> Result<()> {
    let manager = managers::consumer_manager(config)?;
    let license = manager
        .install(&FileStore::new(path))
        .with_context(|| format!("Failed to install {}", path.display()))?;
    print_license(&license)
}

pub fn view(config: &LicensingConfig, verify: bool) -> Result<()> {
    let manager = managers::consumer_manager(config)?;
    let license = if verify { manager.view_verified()? } else { manager.view()? };
    print_license(&license)
}

pub fn verify(config: &LicensingConfig) -> Result<()> {
    let manager = managers::consumer_manager(config)?;
    manager.verify()?;
    println!("License for '{}' is valid", manager.subject());
    Ok(())
}

pub fn uninstall(config: &LicensingConfig) -> Result<()> {
    let manager = managers::consumer_manager(config)?;
    manager.uninstall()?;
    println!("License for '{}' uninstalled", manager.subject());
    Ok(())
}

pub fn subject(config: &LicensingConfig) {
    println!("{}", config.subject);
}
