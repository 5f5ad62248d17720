use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use sigil_domain::constants::ENV_PREFIX;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default configuration file stem, resolved by the `config` crate against every supported
/// extension (`sigil.toml`, `sigil.yaml`, `sigil.json`, ...).
pub const DEFAULT_CONFIG_STEM: &str = "sigil";

/// Custom error type for config loading.
#[sigil_derive::sigil_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// Layers, lowest priority first:
/// 1. **Base File**: An explicit `path` is required to exist. Without one, the optional
///    `sigil.*` file in the working directory is used when present.
/// 2. **Environment Overrides**: Variables prefixed with `SIGIL__`. Nested structures are
///    accessed with double underscores (`SIGIL__LICENSING__SUBJECT` maps to `licensing.subject`).
///
/// # Errors
/// * The explicitly requested file cannot be found or parsed.
/// * The merged settings do not match the structure of `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_STEM), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading configuration");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
