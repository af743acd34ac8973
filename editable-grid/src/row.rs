//! Per-row lifecycle state.

use crate::editor::InputElement;
use crate::grid::RowData;

/// Lifecycle state of one row. A row with no recorded state is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowState {
    #[default]
    Display,
    Editing,
    Submitting,
    NewUnsaved,
    Deleting,
}

/// A rendered editor bound to one cell for the duration of an edit.
#[derive(Debug, Clone)]
pub struct CellEditor {
    pub field: String,
    pub element: InputElement,
}

/// Transient state of an active edit: the pre-edit snapshot (so cancel can
/// restore without loss) and the rendered editors the host feeds input
/// into. Dropped wholesale on commit or cancel.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub snapshot: RowData,
    pub editors: Vec<CellEditor>,
}

impl EditSession {
    pub fn editor(&self, field: &str) -> Option<&InputElement> {
        self.editors
            .iter()
            .find(|cell| cell.field == field)
            .map(|cell| &cell.element)
    }

    pub fn editor_mut(&mut self, field: &str) -> Option<&mut InputElement> {
        self.editors
            .iter_mut()
            .find(|cell| cell.field == field)
            .map(|cell| &mut cell.element)
    }

    /// Field/element pairs in field order, for event payloads.
    pub fn elements(&self) -> Vec<(String, InputElement)> {
        self.editors
            .iter()
            .map(|cell| (cell.field.clone(), cell.element.clone()))
            .collect()
    }
}
