//! Page events and the table binding them to handlers.
//!
//! The host forwards what the user does as [`UiEvent`]s. Which handlers run, and in what
//! order, is data in an [`EventTable`] rather than wiring inside the gatekeeper.

use fxhash::FxHashMap;
use std::time::Duration;
use trip_domain::fields::Field;

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The page finished loading.
    PageLoaded,
    /// The user pressed submit.
    Submit,
    /// Focus left a field.
    Blur(Field),
    /// The user typed; `value` is the field's full new content.
    Input { field: Field, value: String },
    /// A delayed switch to the trip-full panel fell due.
    FullPanelDue,
}

impl UiEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PageLoaded => EventKind::PageLoaded,
            Self::Submit => EventKind::Submit,
            Self::Blur(_) => EventKind::Blur,
            Self::Input { .. } => EventKind::Input,
            Self::FullPanelDue => EventKind::FullPanelDue,
        }
    }

    #[must_use]
    pub const fn field(&self) -> Option<Field> {
        match self {
            Self::Blur(field) | Self::Input { field, .. } => Some(*field),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PageLoaded,
    Submit,
    Blur,
    Input,
    FullPanelDue,
}

/// A unit of behavior the gatekeeper knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Reload persisted state, refresh progress, show the trip-full panel if no seats remain.
    CapacityCheck,
    /// The full submission flow.
    Submit,
    /// Blur feedback for the event's field.
    ValidateField,
    /// Drop the field's error while the user edits it.
    ClearError,
    /// Reduce phone input to at most ten digits.
    PhoneDigits,
    /// Title-case the name.
    TitleCaseName,
    ShowTripFull,
}

/// A follow-up event the host must dispatch once `after` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled {
    pub after: Duration,
    pub event: UiEvent,
}

/// Ordered handlers per event kind, optionally narrowed to one field.
///
/// Field-specific bindings run after the field-agnostic ones for the same kind.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    bindings: FxHashMap<(EventKind, Option<Field>), Vec<Handler>>,
}

impl EventTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The page's wiring. `formatters` adds the phone and name rewriting.
    #[must_use]
    pub fn standard(formatters: bool) -> Self {
        let mut table = Self::new();
        table
            .on(EventKind::PageLoaded, None, Handler::CapacityCheck)
            .on(EventKind::Submit, None, Handler::Submit)
            .on(EventKind::Blur, None, Handler::ValidateField)
            .on(EventKind::Input, None, Handler::ClearError)
            .on(EventKind::FullPanelDue, None, Handler::ShowTripFull);

        if formatters {
            table
                .on(EventKind::Input, Some(Field::Phone), Handler::PhoneDigits)
                .on(EventKind::Blur, Some(Field::Name), Handler::TitleCaseName);
        }
        table
    }

    /// Appends `handler` to the binding for `kind` (and `field`, when given).
    pub fn on(&mut self, kind: EventKind, field: Option<Field>, handler: Handler) -> &mut Self {
        self.bindings.entry((kind, field)).or_default().push(handler);
        self
    }

    /// Handlers to run for `event`, in order.
    #[must_use]
    pub fn handlers(&self, event: &UiEvent) -> Vec<Handler> {
        let kind = event.kind();
        let general = self.bindings.get(&(kind, None)).into_iter().flatten();
        let specific = event
            .field()
            .and_then(|field| self.bindings.get(&(kind, Some(field))))
            .into_iter()
            .flatten();
        general.chain(specific).copied().collect()
    }
}
