//! Presentation state of the registration page.
//!
//! The gatekeeper mutates a [`FormView`]; a host (terminal, web shell, test) renders it.

use serde::Serialize;
use std::borrow::Cow;
use trip_domain::fields::Field;
use trip_domain::model::RegistrationForm;

pub const SUBMIT_FAILED_ALERT: &str = "There was an error submitting the form. Please try again.";

const FILLING_PERCENT: f64 = 50.0;
const CRITICAL_PERCENT: f64 = 80.0;

/// Inline status of one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum FieldStatus {
    #[default]
    Neutral,
    Errored(Cow<'static, str>),
    Succeeded,
}

/// Which panel occupies the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Form,
    Success,
    TripFull,
}

/// Color band of the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillTier {
    Open,
    Filling,
    Critical,
}

/// Seats left and how full the trip is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub spots_left: u32,
    pub fill_percent: f64,
    pub tier: FillTier,
}

impl Progress {
    /// Counts above capacity render as a full bar with no seats left.
    #[must_use]
    pub fn compute(count: u32, capacity: u32) -> Self {
        let fill_percent = if capacity == 0 {
            100.0
        } else {
            (f64::from(count) / f64::from(capacity) * 100.0).min(100.0)
        };

        let tier = if fill_percent >= CRITICAL_PERCENT {
            FillTier::Critical
        } else if fill_percent >= FILLING_PERCENT {
            FillTier::Filling
        } else {
            FillTier::Open
        };

        Self { spots_left: capacity.saturating_sub(count), fill_percent, tier }
    }
}

/// Everything the page shows.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub form: RegistrationForm,
    statuses: [FieldStatus; 4],
    panel: Panel,
    loading: bool,
    progress: Progress,
    alert: Option<Cow<'static, str>>,
}

impl FormView {
    #[must_use]
    pub fn new(progress: Progress) -> Self {
        Self {
            form: RegistrationForm::default(),
            statuses: Default::default(),
            panel: Panel::Form,
            loading: false,
            progress,
            alert: None,
        }
    }

    #[must_use]
    pub const fn status(&self, field: Field) -> &FieldStatus {
        &self.statuses[slot(field)]
    }

    pub fn show_error(&mut self, field: Field, message: impl Into<Cow<'static, str>>) {
        self.statuses[slot(field)] = FieldStatus::Errored(message.into());
    }

    pub fn show_success(&mut self, field: Field) {
        self.statuses[slot(field)] = FieldStatus::Succeeded;
    }

    /// Drops an error message. A success mark is left in place.
    pub fn clear_error(&mut self, field: Field) {
        let status = &mut self.statuses[slot(field)];
        if matches!(status, FieldStatus::Errored(_)) {
            *status = FieldStatus::Neutral;
        }
    }

    /// Returns every field to neutral, success marks included.
    pub fn clear_all_errors(&mut self) {
        self.statuses = Default::default();
    }

    /// Fields currently showing an error, in form order.
    pub fn errored_fields(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.into_iter().filter_map(|field| match self.status(field) {
            FieldStatus::Errored(message) => Some((field, message.as_ref())),
            _ => None,
        })
    }

    #[must_use]
    pub const fn panel(&self) -> Panel {
        self.panel
    }

    /// Switching panels hides the other two.
    pub const fn show_panel(&mut self, panel: Panel) {
        self.panel = panel;
    }

    /// Whether the submit control is disabled with a loading indicator.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    pub const fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
    }

    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn raise_alert(&mut self, message: impl Into<Cow<'static, str>>) {
        self.alert = Some(message.into());
    }

    /// Returns the pending alert, leaving none, the way a host dismisses it.
    pub fn take_alert(&mut self) -> Option<Cow<'static, str>> {
        self.alert.take()
    }
}

const fn slot(field: Field) -> usize {
    match field {
        Field::Name => 0,
        Field::Email => 1,
        Field::Phone => 2,
        Field::Captcha => 3,
    }
}
