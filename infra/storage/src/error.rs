use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[trip_derive::trip_error]
pub enum StorageError {
    #[error("Invalid store key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Stored value is not valid UTF-8{}: {message}", format_context(.context))]
    Encoding { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
