use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use trip_domain::constants::{COUNTER_KEY, EMAIL_LIST_KEY};
use trip_domain::fields::{Field, FieldSet};
use trip_domain::model::RegistrationForm;
use trip_registration::*;
use trip_storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StoreKey};

#[derive(Debug, Clone, Default)]
struct FakeEndpoint {
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl FakeEndpoint {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Submitter for FakeEndpoint {
    async fn submit(&self, _form: &RegistrationForm) -> Result<(), SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SubmissionError::Rejected { message: "status 500".into(), context: None });
        }
        Ok(())
    }
}

/// A [`MemoryStore`] whose writes to one key fail until told otherwise.
#[derive(Debug, Clone)]
struct FlakyStore {
    inner: MemoryStore,
    broken: StoreKey,
    failing: Arc<AtomicBool>,
}

impl FlakyStore {
    fn new(inner: MemoryStore, broken: &str) -> Self {
        Self { inner, broken: key(broken), failing: Arc::new(AtomicBool::new(true)) }
    }

    fn repair(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &StoreKey, value: &str) -> Result<(), StorageError> {
        if *key == self.broken && self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                source: std::io::Error::other("disk full"),
                context: None,
            });
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &StoreKey) -> Result<bool, StorageError> {
        self.inner.remove(key).await
    }
}

fn key(name: &str) -> StoreKey {
    StoreKey::try_from(name).unwrap()
}

async fn gatekeeper(
    backend: MemoryStore,
    endpoint: &FakeEndpoint,
) -> Gatekeeper<MemoryStore, FakeEndpoint> {
    let mut gate = Gatekeeper::open(backend, endpoint.clone(), GatekeeperSettings::default())
        .await
        .unwrap();
    gate.dispatch(UiEvent::PageLoaded).await.unwrap();
    gate
}

fn fill_valid<K: KeyValueStore, S: Submitter>(gate: &mut Gatekeeper<K, S>, email: &str) {
    gate.fill(Field::Name, "Ana Lee");
    gate.fill(Field::Email, email);
    gate.fill(Field::Phone, "+1 (555) 123-4567");
    gate.fill(Field::Captcha, "goa");
}

#[tokio::test]
async fn last_seat_schedules_trip_full_panel() {
    let backend = MemoryStore::seeded([(COUNTER_KEY, "9")]).unwrap();
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(backend.clone(), &endpoint).await;
    assert_eq!(gate.view().panel(), Panel::Form);

    fill_valid(&mut gate, "Ana@Example.com");
    let follow_ups = gate.dispatch(UiEvent::Submit).await.unwrap();

    assert_eq!(endpoint.calls(), 1);
    assert_eq!(gate.phase(), SubmissionPhase::Succeeded);
    assert_eq!(gate.view().panel(), Panel::Success);
    assert_eq!(gate.view().form, RegistrationForm::default());
    assert!(!gate.view().is_loading());
    assert_eq!(gate.view().progress().spots_left, 0);
    assert_eq!(backend.snapshot(&key(COUNTER_KEY)).as_deref(), Some("10"));
    assert_eq!(backend.snapshot(&key(EMAIL_LIST_KEY)).as_deref(), Some(r#"["ana@example.com"]"#));

    assert_eq!(
        follow_ups,
        [Scheduled { after: Duration::from_millis(3000), event: UiEvent::FullPanelDue }]
    );
    for follow_up in follow_ups {
        gate.dispatch(follow_up.event).await.unwrap();
    }
    assert_eq!(gate.view().panel(), Panel::TripFull);
}

#[tokio::test]
async fn seats_remaining_schedules_nothing() {
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(MemoryStore::new(), &endpoint).await;

    fill_valid(&mut gate, "ana@example.com");
    let follow_ups = gate.dispatch(UiEvent::Submit).await.unwrap();

    assert!(follow_ups.is_empty());
    assert_eq!(gate.store().count(), 1);
    assert_eq!(gate.view().progress().spots_left, 9);
    assert_eq!(gate.view().progress().tier, FillTier::Open);
}

#[tokio::test]
async fn full_trip_refuses_before_validation() {
    let backend = MemoryStore::seeded([(COUNTER_KEY, "10")]).unwrap();
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(backend, &endpoint).await;
    assert_eq!(gate.view().panel(), Panel::TripFull);

    // Blank form: capacity wins over validation.
    let err = gate.dispatch(UiEvent::Submit).await.unwrap_err();
    assert!(matches!(err, RegistrationError::CapacityReached { .. }));
    assert!(!err.is_recoverable());
    assert_eq!(endpoint.calls(), 0);
    assert_eq!(gate.view().errored_fields().count(), 0);
    assert_eq!(gate.view().panel(), Panel::TripFull);
}

#[tokio::test]
async fn invalid_fields_are_reported_inline() {
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(MemoryStore::new(), &endpoint).await;

    gate.fill(Field::Name, "A");
    gate.fill(Field::Email, "ana@");
    gate.fill(Field::Phone, "0123");
    gate.fill(Field::Captcha, "rio");

    let err = gate.dispatch(UiEvent::Submit).await.unwrap_err();
    let RegistrationError::Validation { fields, .. } = &err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(*fields, FieldSet::all());
    assert_eq!(gate.phase(), SubmissionPhase::Idle);
    assert_eq!(endpoint.calls(), 0);

    let view = gate.view();
    assert_eq!(view.status(Field::Name), &FieldStatus::Errored(NAME_TOO_SHORT.into()));
    assert_eq!(view.status(Field::Email), &FieldStatus::Errored(EMAIL_INVALID.into()));
    assert_eq!(view.status(Field::Phone), &FieldStatus::Errored(PHONE_INVALID.into()));
    assert_eq!(
        view.status(Field::Captcha),
        &FieldStatus::Errored("Please type \"GOA\" to verify you are not a bot".into())
    );
}

#[tokio::test]
async fn passing_fields_stay_neutral_on_submit() {
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(MemoryStore::new(), &endpoint).await;

    fill_valid(&mut gate, "ana@example.com");
    gate.dispatch(UiEvent::Blur(Field::Name)).await.unwrap();
    assert_eq!(gate.view().status(Field::Name), &FieldStatus::Succeeded);

    gate.fill(Field::Phone, "12");
    gate.dispatch(UiEvent::Submit).await.unwrap_err();
    assert_eq!(gate.view().status(Field::Name), &FieldStatus::Neutral);
    assert_eq!(gate.view().errored_fields().map(|(f, _)| f).collect::<Vec<_>>(), [Field::Phone]);
}

#[tokio::test]
async fn duplicate_email_is_refused_in_any_case() {
    let backend = MemoryStore::seeded([
        (COUNTER_KEY, "1"),
        (EMAIL_LIST_KEY, r#"["ana@example.com"]"#),
    ])
    .unwrap();
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(backend.clone(), &endpoint).await;

    fill_valid(&mut gate, "ANA@EXAMPLE.COM");
    let err = gate.dispatch(UiEvent::Submit).await.unwrap_err();

    assert!(matches!(err, RegistrationError::DuplicateEmail { .. }));
    assert!(err.is_recoverable());
    assert_eq!(endpoint.calls(), 0);
    assert_eq!(
        gate.view().status(Field::Email),
        &FieldStatus::Errored(EMAIL_TAKEN_ON_SUBMIT.into())
    );
    assert_eq!(backend.snapshot(&key(COUNTER_KEY)).as_deref(), Some("1"));
}

#[tokio::test]
async fn transport_failure_keeps_state_and_allows_retry() {
    let backend = MemoryStore::seeded([(COUNTER_KEY, "3")]).unwrap();
    let endpoint = FakeEndpoint::default();
    endpoint.set_failing(true);
    let mut gate = gatekeeper(backend.clone(), &endpoint).await;

    fill_valid(&mut gate, "ana@example.com");
    let err = gate.dispatch(UiEvent::Submit).await.unwrap_err();

    assert!(matches!(err, RegistrationError::Transport { .. }));
    assert_eq!(gate.phase(), SubmissionPhase::Failed);
    assert!(!gate.view().is_loading());
    assert_eq!(gate.view().alert(), Some(SUBMIT_FAILED_ALERT));
    assert_eq!(gate.view().panel(), Panel::Form);
    assert_eq!(gate.view().form.email, "ana@example.com");
    assert_eq!(gate.store().count(), 3);
    assert!(!gate.store().is_duplicate("ana@example.com"));
    assert_eq!(backend.snapshot(&key(COUNTER_KEY)).as_deref(), Some("3"));

    endpoint.set_failing(false);
    gate.dispatch(UiEvent::Submit).await.unwrap();

    assert_eq!(endpoint.calls(), 2);
    assert_eq!(gate.phase(), SubmissionPhase::Succeeded);
    assert_eq!(gate.store().count(), 4);
    assert_eq!(gate.view().panel(), Panel::Success);
    assert_eq!(gate.view().alert(), None);
}

#[tokio::test]
async fn failed_local_write_is_reported_and_retryable() {
    for broken in [COUNTER_KEY, EMAIL_LIST_KEY] {
        let memory = MemoryStore::seeded([(COUNTER_KEY, "3")]).unwrap();
        let backend = FlakyStore::new(memory.clone(), broken);
        let endpoint = FakeEndpoint::default();
        let mut gate =
            Gatekeeper::open(backend.clone(), endpoint.clone(), GatekeeperSettings::default())
                .await
                .unwrap();

        fill_valid(&mut gate, "ana@example.com");
        let err = gate.dispatch(UiEvent::Submit).await.unwrap_err();

        assert!(matches!(err, RegistrationError::Storage { .. }), "{broken}: {err:?}");
        assert!(err.is_recoverable());
        assert_eq!(gate.phase(), SubmissionPhase::Failed);
        assert!(!gate.view().is_loading());
        assert_eq!(gate.view().alert(), Some(SUBMIT_FAILED_ALERT));
        assert_eq!(gate.view().panel(), Panel::Form);
        assert_eq!(gate.view().form.email, "ana@example.com");
        assert_eq!(gate.store().count(), 3);
        assert!(!gate.store().is_duplicate("ana@example.com"));
        assert_eq!(memory.snapshot(&key(COUNTER_KEY)).as_deref(), Some("3"));

        backend.repair();
        let follow_ups = gate.dispatch(UiEvent::Submit).await.unwrap();

        assert!(follow_ups.is_empty());
        assert_eq!(endpoint.calls(), 2);
        assert_eq!(gate.phase(), SubmissionPhase::Succeeded);
        assert_eq!(gate.view().panel(), Panel::Success);
        assert_eq!(gate.view().alert(), None);
        assert_eq!(gate.store().count(), 4);
        assert_eq!(memory.snapshot(&key(COUNTER_KEY)).as_deref(), Some("4"));
        assert_eq!(
            memory.snapshot(&key(EMAIL_LIST_KEY)).as_deref(),
            Some(r#"["ana@example.com"]"#)
        );
    }
}

#[tokio::test]
async fn typing_formats_and_clears_errors() {
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(MemoryStore::new(), &endpoint).await;

    gate.dispatch(UiEvent::Submit).await.unwrap_err();
    assert!(matches!(gate.view().status(Field::Phone), FieldStatus::Errored(_)));

    gate.dispatch(UiEvent::Input { field: Field::Phone, value: "+1 (555) 123-45678".to_owned() })
        .await
        .unwrap();
    assert_eq!(gate.view().form.phone, "1555123456");
    assert_eq!(gate.view().status(Field::Phone), &FieldStatus::Neutral);

    gate.dispatch(UiEvent::Input { field: Field::Name, value: "aNA lEE".to_owned() })
        .await
        .unwrap();
    assert_eq!(gate.view().form.name, "aNA lEE");
    gate.dispatch(UiEvent::Blur(Field::Name)).await.unwrap();
    assert_eq!(gate.view().form.name, "Ana Lee");
    assert_eq!(gate.view().status(Field::Name), &FieldStatus::Succeeded);
}

#[tokio::test]
async fn formatters_can_be_disabled() {
    let endpoint = FakeEndpoint::default();
    let settings = GatekeeperSettings { input_formatters: false, ..GatekeeperSettings::default() };
    let mut gate = Gatekeeper::open(MemoryStore::new(), endpoint, settings).await.unwrap();

    gate.dispatch(UiEvent::Input { field: Field::Phone, value: "555-1234".to_owned() })
        .await
        .unwrap();
    assert_eq!(gate.view().form.phone, "555-1234");
}

#[tokio::test]
async fn blur_feedback() {
    let backend = MemoryStore::seeded([(EMAIL_LIST_KEY, r#"["ana@example.com"]"#)]).unwrap();
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(backend, &endpoint).await;

    gate.dispatch(UiEvent::Blur(Field::Email)).await.unwrap();
    assert_eq!(gate.view().status(Field::Email), &FieldStatus::Neutral);

    gate.fill(Field::Email, "Ana@example.com");
    gate.dispatch(UiEvent::Blur(Field::Email)).await.unwrap();
    assert_eq!(gate.view().status(Field::Email), &FieldStatus::Errored(EMAIL_TAKEN.into()));

    gate.fill(Field::Captcha, "rio");
    gate.dispatch(UiEvent::Blur(Field::Captcha)).await.unwrap();
    assert_eq!(
        gate.view().status(Field::Captcha),
        &FieldStatus::Errored("Please type \"GOA\" to verify".into())
    );
}

#[tokio::test]
async fn custom_event_table_replaces_wiring() {
    let endpoint = FakeEndpoint::default();
    let mut table = EventTable::new();
    table.on(EventKind::Submit, None, Handler::ShowTripFull);

    let mut gate =
        Gatekeeper::open(MemoryStore::new(), endpoint.clone(), GatekeeperSettings::default())
            .await
            .unwrap()
            .with_events(table);

    fill_valid(&mut gate, "ana@example.com");
    gate.dispatch(UiEvent::Submit).await.unwrap();
    assert_eq!(endpoint.calls(), 0);
    assert_eq!(gate.view().panel(), Panel::TripFull);
}

#[tokio::test]
async fn registrations_survive_restart_on_disk() {
    let temp = TempDir::new().unwrap();
    let endpoint = FakeEndpoint::default();
    let settings = GatekeeperSettings { capacity: 2, ..GatekeeperSettings::default() };

    {
        let store = FileStore::builder().root(temp.path()).connect().await.unwrap();
        let mut gate = Gatekeeper::open(store, endpoint.clone(), settings.clone()).await.unwrap();
        fill_valid(&mut gate, "ana@example.com");
        gate.dispatch(UiEvent::Submit).await.unwrap();
    }

    let store = FileStore::builder().root(temp.path()).create(false).connect().await.unwrap();
    let mut gate = Gatekeeper::open(store, endpoint.clone(), settings).await.unwrap();
    gate.dispatch(UiEvent::PageLoaded).await.unwrap();
    assert_eq!(gate.store().count(), 1);
    assert_eq!(gate.view().progress().spots_left, 1);

    fill_valid(&mut gate, "Ana@Example.com");
    assert!(matches!(
        gate.dispatch(UiEvent::Submit).await,
        Err(RegistrationError::DuplicateEmail { .. })
    ));

    fill_valid(&mut gate, "bo@example.com");
    let follow_ups = gate.dispatch(UiEvent::Submit).await.unwrap();
    assert_eq!(follow_ups.len(), 1);
    assert!(gate.store().is_full());
}

#[tokio::test]
async fn repeated_blur_on_unchanged_field_is_stable() {
    let endpoint = FakeEndpoint::default();
    let mut gate = gatekeeper(MemoryStore::new(), &endpoint).await;
    fill_valid(&mut gate, "ana@example.com");

    for field in Field::ALL {
        gate.dispatch(UiEvent::Blur(field)).await.unwrap();
        let first = gate.view().status(field).clone();
        gate.dispatch(UiEvent::Blur(field)).await.unwrap();
        assert_eq!(gate.view().status(field), &first);
        assert_eq!(first, FieldStatus::Succeeded);
    }
}
