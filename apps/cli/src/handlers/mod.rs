pub mod consumer;
pub mod keygen;
pub mod vendor;

use anyhow::Result;
use sigil_licensing::License;

/// Prints a license as pretty JSON on stdout.
pub(crate) fn print_license(license: &License) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(license)?);
    Ok(())
}
