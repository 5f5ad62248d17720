//! Well-known values shared by issuers and consumers.

/// Consumer type assigned to licenses that do not name one.
pub const DEFAULT_CONSUMER_TYPE: &str = "User";

/// Holder assigned to licenses that do not name one.
pub const DEFAULT_HOLDER: &str = "CN=Unknown";

/// Prefix used to build a default issuer distinguished name from the subject.
pub const ISSUER_PREFIX: &str = "CN=";

/// Default artifact format tag.
pub const DEFAULT_REPOSITORY_VERSION: &str = "v1";

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "SIGIL";
