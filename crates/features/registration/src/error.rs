use crate::submission::SubmissionError;
use std::borrow::Cow;
use trip_domain::fields::FieldSet;
use trip_storage::StorageError;

/// Why a registration attempt did not complete.
#[trip_derive::trip_error]
pub enum RegistrationError {
    /// One or more fields failed validation; each is errored inline on the form.
    #[error("Invalid form fields{}: {fields}", format_context(.context))]
    Validation { fields: FieldSet, context: Option<Cow<'static, str>> },

    /// The email is already on the registered list.
    #[error("Email already registered{}: {message}", format_context(.context))]
    DuplicateEmail { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Every seat is taken; the form has been replaced by the trip-full panel.
    #[error("Trip is full{}: {message}", format_context(.context))]
    CapacityReached { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The form endpoint could not be reached or refused the submission.
    #[error("Submission failed{}: {source}", format_context(.context))]
    Transport { source: SubmissionError, context: Option<Cow<'static, str>> },

    /// Recording the registration locally failed.
    #[error("Persisting registration failed{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Internal registration error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RegistrationError {
    /// Whether the user can fix the problem and submit again in this session.
    ///
    /// A full trip is terminal for the session; everything else leaves the form usable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CapacityReached { .. } | Self::Internal { .. })
    }
}
