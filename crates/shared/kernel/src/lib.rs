//! Kernel utilities shared across Sigil applications.
//! Keep this crate lightweight; it re-exports the domain models and the layered config loader.
//!
//! ## Config loading
//! ```rust,no_run
//! use sigil_kernel::config::load_config;
//! use sigil_kernel::domain::config::SigilConfig;
//!
//! let cfg: SigilConfig = load_config(Some("sigil.toml")).unwrap_or_default();
//! println!("subject: {}", cfg.licensing.subject);
//! ```

pub mod config;

pub use sigil_domain as domain;
