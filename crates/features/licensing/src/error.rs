use std::borrow::Cow;

/// Failure taxonomy of every checked licensing operation.
///
/// Branch on [`LicenseError::kind`] rather than on variant fields; the message and
/// context are for humans.
#[sigil_derive::sigil_error]
pub enum LicenseError {
    /// The license violates structural constraints, or the manager cannot serve it.
    #[error("Invalid license payload{}: {message}", format_context(.context))]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Signature or AEAD verification failed, or key material is missing.
    #[error("License authentication failed{}: {message}", format_context(.context))]
    AuthenticationFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The artifact is not structurally a license artifact.
    #[error("Corrupt license artifact{}: {message}", format_context(.context))]
    CorruptArtifact { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Reading from a source or writing to a sink failed.
    #[error("License store I/O error{}: {source}", format_context(.context))]
    StoreIo { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("No license installed{}: {message}", format_context(.context))]
    NotInstalled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("License has expired{}: {message}", format_context(.context))]
    Expired { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("License is not yet valid{}: {message}", format_context(.context))]
    NotYetValid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("License consumer limit exceeded{}: {message}", format_context(.context))]
    ConsumerLimitExceeded { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Postcard failure while producing canonical bytes.
    #[error("License encoding error{}: {source}", format_context(.context))]
    Encoding { source: postcard::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for entropy, keyset and other unexpected failures.
    #[error("Internal licensing error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl LicenseError {
    pub(crate) fn corrupt(message: impl Into<Cow<'static, str>>) -> Self {
        Self::CorruptArtifact { message: message.into(), context: None }
    }

    pub(crate) fn unauthenticated(message: impl Into<Cow<'static, str>>) -> Self {
        Self::AuthenticationFailed { message: message.into(), context: None }
    }

    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidPayload { message: message.into(), context: None }
    }

    pub(crate) fn not_installed() -> Self {
        Self::NotInstalled { message: "install a license first".into(), context: None }
    }
}
