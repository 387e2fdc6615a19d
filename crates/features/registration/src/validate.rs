//! Field validators.
//!
//! Each validator is a pure function of the typed value (plus the registered list for
//! email and the configured answer for the captcha). Messages differ slightly between
//! blur feedback and the full check run on submit.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use trip_domain::fields::{Field, FieldSet};
use trip_domain::model::{RegistrationForm, RegistrationState};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("name pattern is valid"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static PHONE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-()]").expect("separator pattern is valid"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{3,14}$").expect("phone pattern is valid"));

const NAME_MIN_CHARS: usize = 2;

pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters long";
pub const NAME_BAD_CHARS: &str = "Name should only contain letters and spaces";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const EMAIL_TAKEN: &str = "This email is already registered";
pub const EMAIL_TAKEN_ON_SUBMIT: &str = "This email is already registered for the trip";
pub const PHONE_INVALID: &str = "Please enter a valid phone number";

/// When a check runs. Blur feedback leaves empty fields alone and uses shorter wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Blur,
    Submit,
}

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(Cow<'static, str>),
}

impl Verdict {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }

    fn from_problem(problem: Option<&'static str>) -> Self {
        problem.map_or(Self::Valid, |message| Self::Invalid(Cow::Borrowed(message)))
    }
}

/// A failed field from a full form check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: Field,
    pub message: Cow<'static, str>,
}

/// The validator set, bound to one captcha answer.
#[derive(Debug, Clone)]
pub struct Validators {
    captcha_answer: String,
}

impl Validators {
    /// The answer is compared case-insensitively, so it is stored uppercased.
    #[must_use]
    pub fn new(captcha_answer: &str) -> Self {
        Self { captcha_answer: captcha_answer.trim().to_uppercase() }
    }

    #[must_use]
    pub fn captcha_answer(&self) -> &str {
        &self.captcha_answer
    }

    /// Blur feedback for one field. `None` means the field is empty and stays neutral.
    #[must_use]
    pub fn on_blur(&self, field: Field, value: &str, state: &RegistrationState) -> Option<Verdict> {
        if value.trim().is_empty() {
            return None;
        }

        Some(match field {
            Field::Email => match email(value) {
                Verdict::Valid if state.contains_email(value) => {
                    Verdict::Invalid(Cow::Borrowed(EMAIL_TAKEN))
                },
                verdict => verdict,
            },
            _ => self.check(field, value, Mode::Blur),
        })
    }

    /// Validates one field's shape. The duplicate-email gate is separate; see
    /// [`Self::on_blur`] and the submit flow.
    #[must_use]
    pub fn check(&self, field: Field, value: &str, mode: Mode) -> Verdict {
        match field {
            Field::Name => name(value),
            Field::Email => email(value),
            Field::Phone => phone(value),
            Field::Captcha => self.captcha(value, mode),
        }
    }

    /// Runs every field check in form order and collects the failures.
    #[must_use]
    pub fn check_form(&self, form: &RegistrationForm) -> Vec<FieldFailure> {
        Field::ALL
            .into_iter()
            .filter_map(|field| match self.check(field, form.get(field), Mode::Submit) {
                Verdict::Valid => None,
                Verdict::Invalid(message) => Some(FieldFailure { field, message }),
            })
            .collect()
    }

    #[must_use]
    pub fn captcha(&self, value: &str, mode: Mode) -> Verdict {
        if value.trim().to_uppercase() == self.captcha_answer {
            return Verdict::Valid;
        }

        let answer = &self.captcha_answer;
        Verdict::Invalid(Cow::Owned(match mode {
            Mode::Blur => format!("Please type \"{answer}\" to verify"),
            Mode::Submit => format!("Please type \"{answer}\" to verify you are not a bot"),
        }))
    }
}

/// At least two characters after trimming, letters and whitespace only.
#[must_use]
pub fn name(value: &str) -> Verdict {
    let trimmed = value.trim();
    Verdict::from_problem(if trimmed.chars().count() < NAME_MIN_CHARS {
        Some(NAME_TOO_SHORT)
    } else if !NAME_PATTERN.is_match(trimmed) {
        Some(NAME_BAD_CHARS)
    } else {
        None
    })
}

/// `local@domain.tld` shape with no whitespace and a single `@`.
#[must_use]
pub fn email(value: &str) -> Verdict {
    Verdict::from_problem((!EMAIL_PATTERN.is_match(value.trim())).then_some(EMAIL_INVALID))
}

/// Spaces, dashes and parentheses are ignored; what remains is an optional `+`, a non-zero
/// leading digit and 4 to 15 digits in total.
#[must_use]
pub fn phone(value: &str) -> Verdict {
    let compact = PHONE_SEPARATORS.replace_all(value, "");
    Verdict::from_problem((!PHONE_PATTERN.is_match(&compact)).then_some(PHONE_INVALID))
}

/// Names of the failed fields, for logs and error values.
#[must_use]
pub fn failed_fields(failures: &[FieldFailure]) -> FieldSet {
    failures.iter().map(|failure| failure.field).collect()
}
