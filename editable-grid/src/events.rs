//! Typed publish/subscribe surface for lifecycle notifications.
//!
//! Every lifecycle transition and every validation outcome emits exactly
//! one event, synchronously, before the triggering call returns (for
//! operations with a network step, the pending event fires before the
//! request and the resolution event after). Listener panics are isolated:
//! they are logged and the engine's own transition proceeds.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::error;

use crate::editor::InputElement;
use crate::grid::{RowData, RowToken};

/// Discriminant used when subscribing to a single event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Edit,
    Edited,
    Updated,
    InputValid,
    InputInvalid,
    Delete,
    Deleted,
    NewRow,
    NewRowSave,
    NewRowSaved,
    NewRowCancel,
    NewRowCancelled,
    Cancel,
    Cancelled,
    RowDblClick,
    HttpError,
    Error,
}

impl EventKind {
    /// Wire name, as exposed to hosts.
    pub fn name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Edited => "edited",
            Self::Updated => "updated",
            Self::InputValid => "input-valid",
            Self::InputInvalid => "input-invalid",
            Self::Delete => "delete",
            Self::Deleted => "deleted",
            Self::NewRow => "new-row",
            Self::NewRowSave => "new-row-save",
            Self::NewRowSaved => "new-row-saved",
            Self::NewRowCancel => "new-row-cancel",
            Self::NewRowCancelled => "new-row-cancelled",
            Self::Cancel => "cancel",
            Self::Cancelled => "cancelled",
            Self::RowDblClick => "row-dbl-click",
            Self::HttpError => "http-error",
            Self::Error => "error",
        }
    }
}

/// A lifecycle notification with its payload.
#[derive(Debug, Clone)]
pub enum Event {
    /// A row entered edit mode; `elements` are the rendered editors, one
    /// per editable field, in field order.
    Edit {
        row: RowToken,
        row_data: RowData,
        elements: Vec<(String, InputElement)>,
    },
    /// Every field validated; the update request is about to go out.
    Edited {
        row: RowToken,
        row_data: RowData,
        old_row_data: RowData,
    },
    /// The backend confirmed the update.
    Updated {
        row: RowToken,
        row_data: RowData,
        old_row_data: RowData,
        response: Value,
    },
    InputValid {
        row: RowToken,
        field: String,
        value: Value,
    },
    InputInvalid {
        row: RowToken,
        field: String,
        value: Value,
        message: String,
    },
    /// A delete was requested; the confirm gate runs after this fires.
    Delete {
        row: RowToken,
        row_data: RowData,
    },
    Deleted {
        row: RowToken,
        row_data: RowData,
    },
    NewRow {
        row: RowToken,
    },
    NewRowSave {
        row: RowToken,
        row_data: RowData,
    },
    NewRowSaved {
        row: RowToken,
        row_data: RowData,
        response: Value,
    },
    NewRowCancel {
        row: RowToken,
    },
    NewRowCancelled {
        row: RowToken,
    },
    Cancel {
        row: RowToken,
        row_data: RowData,
    },
    Cancelled {
        row: RowToken,
        row_data: RowData,
    },
    RowDblClick {
        row: RowToken,
        row_data: RowData,
    },
    HttpError {
        status: u16,
        status_text: String,
        url: String,
    },
    Error {
        message: String,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Edit { .. } => EventKind::Edit,
            Self::Edited { .. } => EventKind::Edited,
            Self::Updated { .. } => EventKind::Updated,
            Self::InputValid { .. } => EventKind::InputValid,
            Self::InputInvalid { .. } => EventKind::InputInvalid,
            Self::Delete { .. } => EventKind::Delete,
            Self::Deleted { .. } => EventKind::Deleted,
            Self::NewRow { .. } => EventKind::NewRow,
            Self::NewRowSave { .. } => EventKind::NewRowSave,
            Self::NewRowSaved { .. } => EventKind::NewRowSaved,
            Self::NewRowCancel { .. } => EventKind::NewRowCancel,
            Self::NewRowCancelled { .. } => EventKind::NewRowCancelled,
            Self::Cancel { .. } => EventKind::Cancel,
            Self::Cancelled { .. } => EventKind::Cancelled,
            Self::RowDblClick { .. } => EventKind::RowDblClick,
            Self::HttpError { .. } => EventKind::HttpError,
            Self::Error { .. } => EventKind::Error,
        }
    }
}

type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Plain in-process dispatcher: no inheritance chain, no host event
/// primitive, just a listener list walked synchronously on emit.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<(Option<EventKind>, Listener)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one event kind.
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.lock().push((Some(kind), Arc::new(listener)));
    }

    /// Subscribe to every event.
    pub fn on_any<F>(&self, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.lock().push((None, Arc::new(listener)));
    }

    /// Deliver one event to every matching listener, in subscription
    /// order. A panicking listener is logged and skipped; it cannot abort
    /// the transition that emitted the event.
    pub fn emit(&self, event: &Event) {
        let kind = event.kind();
        let matching: Vec<Listener> = self
            .lock()
            .iter()
            .filter(|(wanted, _)| wanted.is_none() || *wanted == Some(kind))
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in matching {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                error!(event = kind.name(), "event listener panicked");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Option<EventKind>, Listener)>> {
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
