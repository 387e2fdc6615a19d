//! # Registration
//!
//! The gatekeeper in front of a capped trip sign-up form.
//!
//! A submission passes three gates before it is forwarded:
//!
//! 1. **Capacity**: once the persisted counter reaches capacity the form is replaced by the
//!    trip-full panel and nothing else runs.
//! 2. **Validation**: name, email, phone and captcha are checked; failures are reported
//!    inline per field.
//! 3. **Duplicates**: an email already on the registered list (compared case-insensitively)
//!    is refused.
//!
//! Accepted forms go to a [`Submitter`]. Only after it reports success are the counter and
//! the email list updated in the [`KeyValueStore`](trip_storage::KeyValueStore).
//!
//! ## Example
//!
//! ```rust,no_run
//! use trip_domain::fields::Field;
//! use trip_registration::{Gatekeeper, GatekeeperSettings, HttpSubmitter, UiEvent};
//! use trip_storage::MemoryStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let submitter = HttpSubmitter::new("https://forms.example.com/trip", None)?;
//! let mut gate =
//!     Gatekeeper::open(MemoryStore::new(), submitter, GatekeeperSettings::default()).await?;
//!
//! gate.dispatch(UiEvent::PageLoaded).await?;
//! gate.fill(Field::Name, "Ana Lee");
//! gate.fill(Field::Email, "ana@example.com");
//! gate.fill(Field::Phone, "5551234567");
//! gate.fill(Field::Captcha, "goa");
//!
//! let follow_ups = gate.dispatch(UiEvent::Submit).await?;
//! println!("{} spots left, {} follow-ups", gate.store().spots_left(), follow_ups.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod events;
mod format;
mod gatekeeper;
mod store;
mod submission;
mod validate;
mod view;

pub use error::{RegistrationError, RegistrationErrorExt};
pub use events::{EventKind, EventTable, Handler, Scheduled, UiEvent};
pub use format::{phone_digits, title_case};
pub use gatekeeper::{Gatekeeper, GatekeeperSettings, SubmissionPhase};
pub use store::RegistrationStore;
pub use submission::{HttpSubmitter, SubmissionError, SubmissionErrorExt, Submitter};
pub use validate::{
    EMAIL_INVALID, EMAIL_TAKEN, EMAIL_TAKEN_ON_SUBMIT, FieldFailure, Mode, NAME_BAD_CHARS,
    NAME_TOO_SHORT, PHONE_INVALID, Validators, Verdict,
};
pub use view::{FieldStatus, FillTier, FormView, Panel, Progress, SUBMIT_FAILED_ALERT};

/// Stand-alone field checks, usable without a [`Gatekeeper`].
pub mod validators {
    pub use crate::validate::{email, failed_fields, name, phone};
}
