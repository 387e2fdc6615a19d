use crate::error::RegistrationError;
use crate::events::{EventTable, Handler, Scheduled, UiEvent};
use crate::format;
use crate::store::RegistrationStore;
use crate::submission::Submitter;
use crate::validate::{self, EMAIL_TAKEN_ON_SUBMIT, Validators, Verdict};
use crate::view::{FormView, Panel, Progress, SUBMIT_FAILED_ALERT};
use std::time::Duration;
use trip_domain::config::AppConfig;
use trip_domain::constants::{DEFAULT_CAPACITY, DEFAULT_CAPTCHA_ANSWER, DEFAULT_FULL_PANEL_DELAY_MS};
use trip_domain::fields::Field;
use trip_domain::model::normalize_email;
use trip_storage::KeyValueStore;

/// Where the current submission attempt stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Knobs the gatekeeper is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatekeeperSettings {
    pub capacity: u32,
    pub captcha_answer: String,
    pub full_panel_delay: Duration,
    pub input_formatters: bool,
}

impl Default for GatekeeperSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            captcha_answer: DEFAULT_CAPTCHA_ANSWER.to_owned(),
            full_panel_delay: Duration::from_millis(DEFAULT_FULL_PANEL_DELAY_MS),
            input_formatters: true,
        }
    }
}

impl From<&AppConfig> for GatekeeperSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            capacity: config.trip.capacity,
            captcha_answer: config.trip.captcha_answer.clone(),
            full_panel_delay: config.trip.full_panel_delay(),
            input_formatters: config.form.input_formatters,
        }
    }
}

/// Owns one registration page: its persisted state, its view and the submission flow.
///
/// Every interaction goes through [`Self::dispatch`]. Handlers never sleep; delayed work
/// comes back as [`Scheduled`] events for the host to dispatch later.
#[derive(Debug)]
pub struct Gatekeeper<K, S> {
    store: RegistrationStore<K>,
    submitter: S,
    validators: Validators,
    events: EventTable,
    view: FormView,
    phase: SubmissionPhase,
    full_panel_delay: Duration,
}

impl<K: KeyValueStore, S: Submitter> Gatekeeper<K, S> {
    /// Reads the persisted state and prepares a blank form.
    ///
    /// # Errors
    /// See [`RegistrationStore::open`].
    pub async fn open(
        backend: K,
        submitter: S,
        settings: GatekeeperSettings,
    ) -> Result<Self, RegistrationError> {
        let store = RegistrationStore::open(backend, settings.capacity).await?;
        let view = FormView::new(Progress::compute(store.count(), store.capacity()));

        Ok(Self {
            store,
            submitter,
            validators: Validators::new(&settings.captcha_answer),
            events: EventTable::standard(settings.input_formatters),
            view,
            phase: SubmissionPhase::Idle,
            full_panel_delay: settings.full_panel_delay,
        })
    }

    /// Replaces the standard event wiring.
    #[must_use]
    pub fn with_events(mut self, events: EventTable) -> Self {
        self.events = events;
        self
    }

    /// Runs every handler bound to `event`, in order.
    ///
    /// Typed input is written into the form before the handlers see it.
    ///
    /// # Errors
    /// Only a submission can fail. The returned error says why it was refused; the view
    /// already reflects it (inline field errors, the trip-full panel, or an alert).
    pub async fn dispatch(&mut self, event: UiEvent) -> Result<Vec<Scheduled>, RegistrationError> {
        tracing::trace!(?event, "Dispatching page event");

        if let UiEvent::Input { field, value } = &event {
            self.view.form.set(*field, value.as_str());
        }

        let mut scheduled = Vec::new();
        for handler in self.events.handlers(&event) {
            self.run(handler, event.field(), &mut scheduled).await?;
        }
        Ok(scheduled)
    }

    /// Sets a field's value without raising any event, like a host pre-filling the form.
    pub fn fill(&mut self, field: Field, value: impl Into<String>) {
        self.view.form.set(field, value);
    }

    #[must_use]
    pub const fn view(&self) -> &FormView {
        &self.view
    }

    /// Mutable access for hosts that dismiss alerts or restore a panel.
    pub const fn view_mut(&mut self) -> &mut FormView {
        &mut self.view
    }

    #[must_use]
    pub const fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    #[must_use]
    pub const fn store(&self) -> &RegistrationStore<K> {
        &self.store
    }

    #[must_use]
    pub const fn submitter(&self) -> &S {
        &self.submitter
    }

    async fn run(
        &mut self,
        handler: Handler,
        field: Option<Field>,
        scheduled: &mut Vec<Scheduled>,
    ) -> Result<(), RegistrationError> {
        match (handler, field) {
            (Handler::CapacityCheck, _) => self.check_capacity().await,
            (Handler::Submit, _) => scheduled.extend(self.submit().await?),
            (Handler::ValidateField, Some(field)) => self.validate_field(field),
            (Handler::ClearError, Some(field)) => self.view.clear_error(field),
            (Handler::PhoneDigits, Some(Field::Phone)) => {
                let digits = format::phone_digits(&self.view.form.phone);
                self.view.form.phone = digits;
            },
            (Handler::TitleCaseName, Some(Field::Name)) => {
                let name = format::title_case(&self.view.form.name);
                self.view.form.name = name;
            },
            (Handler::ShowTripFull, _) => {
                tracing::info!("Showing trip-full panel");
                self.view.show_panel(Panel::TripFull);
            },
            (handler, field) => {
                tracing::debug!(?handler, ?field, "Handler does not apply to this event, skipped");
            },
        }
        Ok(())
    }

    async fn check_capacity(&mut self) {
        self.store.load().await;
        self.refresh_progress();
        if self.store.is_full() {
            tracing::info!(count = self.store.count(), "Trip is full, registration closed");
            self.view.show_panel(Panel::TripFull);
        }
    }

    fn validate_field(&mut self, field: Field) {
        let value = self.view.form.get(field);
        match self.validators.on_blur(field, value, self.store.state()) {
            None => {},
            Some(Verdict::Valid) => self.view.show_success(field),
            Some(Verdict::Invalid(message)) => self.view.show_error(field, message),
        }
    }

    async fn submit(&mut self) -> Result<Option<Scheduled>, RegistrationError> {
        if self.view.is_loading() {
            tracing::debug!("Submission already in flight, ignoring submit");
            return Ok(None);
        }

        self.phase = SubmissionPhase::Validating;
        self.view.take_alert();

        if self.store.is_full() {
            self.phase = SubmissionPhase::Idle;
            self.view.show_panel(Panel::TripFull);
            tracing::warn!(count = self.store.count(), "Submission refused, trip is full");
            return Err(RegistrationError::CapacityReached {
                message: format!("All {} spots have been filled", self.store.capacity()).into(),
                context: None,
            });
        }

        self.view.clear_all_errors();
        let failures = self.validators.check_form(&self.view.form);
        if !failures.is_empty() {
            self.phase = SubmissionPhase::Idle;
            let fields = validate::failed_fields(&failures);
            for failure in failures {
                self.view.show_error(failure.field, failure.message);
            }
            tracing::debug!(%fields, "Submission refused, invalid fields");
            return Err(RegistrationError::Validation { fields, context: None });
        }

        let email = normalize_email(&self.view.form.email);
        if self.store.is_duplicate(&email) {
            self.phase = SubmissionPhase::Idle;
            self.view.show_error(Field::Email, EMAIL_TAKEN_ON_SUBMIT);
            tracing::info!("Submission refused, email already registered");
            return Err(RegistrationError::DuplicateEmail { message: email.into(), context: None });
        }

        self.phase = SubmissionPhase::Submitting;
        self.view.set_loading(true);

        if let Err(source) = self.submitter.submit(&self.view.form).await {
            tracing::error!(error = %source, "Submission failed, form kept for retry");
            return Err(self.fail(RegistrationError::Transport { source, context: None }));
        }

        if let Err(e) = self.store.record_registration(&email).await {
            tracing::error!(error = %e, "Submission accepted but not persisted locally");
            return Err(self.fail(e));
        }

        self.refresh_progress();
        self.view.show_panel(Panel::Success);
        self.view.form.reset();
        self.view.set_loading(false);
        self.phase = SubmissionPhase::Succeeded;
        tracing::info!(spots_left = self.store.spots_left(), "Registration submitted");

        Ok(self.store.is_full().then(|| Scheduled {
            after: self.full_panel_delay,
            event: UiEvent::FullPanelDue,
        }))
    }

    /// Leaves the form as typed and tells the user to try again.
    fn fail(&mut self, error: RegistrationError) -> RegistrationError {
        self.phase = SubmissionPhase::Failed;
        self.view.set_loading(false);
        self.view.raise_alert(SUBMIT_FAILED_ALERT);
        error
    }

    fn refresh_progress(&mut self) {
        self.view.set_progress(Progress::compute(self.store.count(), self.store.capacity()));
    }
}
