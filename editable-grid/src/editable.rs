//! The engine: one instance per table. It owns row lifecycle state,
//! renders editors for the host to materialize, validates input and
//! reconciles every mutation with the backend.
//!
//! Operations on different rows are independent; operations on the same
//! row are serialized by state (a second `begin_edit` or `submit_edit`
//! while a request is in flight is a no-op, never queued). Network
//! failures surface as events and leave the row in its pre-call state;
//! configuration mistakes come back as [`ConfigError`].

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::config::{NormalizedOptions, Operation, Options};
use crate::editor::InputElement;
use crate::error::{ConfigError, RequestError};
use crate::events::{Event, EventBus, EventKind};
use crate::grid::{column_configs, Action, ColumnConfig, DataGrid, RowData, RowToken};
use crate::http::{ApiResponse, HttpClient, Transport};
use crate::row::{CellEditor, EditSession, RowState};
use crate::utils::json_at_path;

/// Host-supplied delete gate; returning `false` vetoes the request.
pub type DeleteConfirm = Box<dyn Fn(RowToken, &RowData) -> bool + Send + Sync>;

pub struct Editable<G: DataGrid> {
    options: NormalizedOptions,
    grid: G,
    bus: EventBus,
    transport: Box<dyn Transport>,
    states: HashMap<RowToken, RowState>,
    sessions: HashMap<RowToken, EditSession>,
    /// The single allowed unsaved row, while one exists.
    pending_new: Option<RowToken>,
    delete_confirm: Option<DeleteConfirm>,
}

impl<G: DataGrid> Editable<G> {
    /// Build an engine bound to one grid. Options are normalized here, so
    /// configuration mistakes surface before the first interaction.
    pub fn new(options: Options, grid: G) -> Result<Self, ConfigError> {
        Self::with_transport(options, grid, Box::new(HttpClient::new()))
    }

    /// Same as [`new`](Self::new) with a custom backend transport.
    pub fn with_transport(
        options: Options,
        grid: G,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        let options = options.normalize()?;
        Ok(Self {
            options,
            grid,
            bus: EventBus::new(),
            transport,
            states: HashMap::new(),
            sessions: HashMap::new(),
            pending_new: None,
            delete_confirm: None,
        })
    }

    pub fn options(&self) -> &NormalizedOptions {
        &self.options
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    /// Subscribe to one event kind.
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.bus.on(kind, listener);
    }

    /// Subscribe to every event.
    pub fn on_any<F>(&self, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.bus.on_any(listener);
    }

    /// Gate delete requests behind a host decision. Without one, every
    /// requested delete proceeds.
    pub fn set_delete_confirm<F>(&mut self, confirm: F)
    where
        F: Fn(RowToken, &RowData) -> bool + Send + Sync + 'static,
    {
        self.delete_confirm = Some(Box::new(confirm));
    }

    /// Lifecycle state of a row; rows the engine has no record of are on
    /// display.
    pub fn state(&self, row: RowToken) -> RowState {
        self.states.get(&row).copied().unwrap_or_default()
    }

    /// The rendered editors of an active edit, in field order.
    pub fn elements(&self, row: RowToken) -> Option<Vec<(String, InputElement)>> {
        self.sessions.get(&row).map(EditSession::elements)
    }

    /// Column configuration for the host grid, fields then buttons.
    pub fn column_configs(&self) -> Result<Vec<ColumnConfig>, ConfigError> {
        column_configs(&self.options)
    }

    /// Put a display row into edit mode: snapshot its data and render one
    /// editor per editable field, seeded with the current value. The host
    /// swaps the row's action icons to the save/cancel affordances. Calling
    /// this again before the edit resolves is a no-op.
    #[tracing::instrument(skip(self))]
    pub fn begin_edit(&mut self, row: RowToken) -> Result<(), ConfigError> {
        if !self.options.editable {
            return Err(ConfigError::NotEditable);
        }
        if !self.options.has_editable_field() {
            return Err(ConfigError::NoEditableField);
        }
        if self.state(row) != RowState::Display {
            return Ok(());
        }

        let data = self.grid.data(row).ok_or(ConfigError::UnknownRow(row.0))?;
        let row_idx = self.grid.index(row);

        let mut editors = Vec::new();
        for field in &self.options.fields {
            let Some(editor) = &field.editor else {
                continue;
            };
            let current = data.get(&field.name).cloned().unwrap_or(Value::Null);
            editors.push(CellEditor {
                field: field.name.clone(),
                element: editor.render(&field.name, &current, row_idx, true),
            });
        }

        let session = EditSession {
            snapshot: data.clone(),
            editors,
        };
        let elements = session.elements();
        self.sessions.insert(row, session);
        self.states.insert(row, RowState::Editing);
        self.bus.emit(&Event::Edit {
            row,
            row_data: data,
            elements,
        });
        Ok(())
    }

    /// Write a host-side input change into the rendered editor for `field`.
    /// Ignored unless the row has an active session with that field.
    pub fn set_input_value(&mut self, row: RowToken, field: &str, value: &Value) {
        if let Some(element) = self
            .sessions
            .get_mut(&row)
            .and_then(|session| session.editor_mut(field))
        {
            element.write_value(value);
        }
    }

    /// Abandon an active edit: uncommitted editor state is discarded and
    /// the pre-edit snapshot is restored.
    #[tracing::instrument(skip(self))]
    pub fn cancel_edit(&mut self, row: RowToken) {
        if self.state(row) != RowState::Editing {
            return;
        }
        let Some(session) = self.sessions.remove(&row) else {
            return;
        };

        let snapshot = session.snapshot;
        self.bus.emit(&Event::Cancel {
            row,
            row_data: snapshot.clone(),
        });
        self.grid.set_data(row, snapshot.clone());
        self.grid.draw(false);
        self.states.remove(&row);
        self.bus.emit(&Event::Cancelled {
            row,
            row_data: snapshot,
        });
    }

    /// Validate every submittable field left to right and push an update to
    /// the backend. The first invalid field aborts the whole submit with no
    /// values applied and the row keeps editing; a backend failure keeps
    /// the edited widget state so the user can retry or cancel.
    #[tracing::instrument(skip(self))]
    pub async fn submit_edit(&mut self, row: RowToken) -> Result<(), ConfigError> {
        if self.state(row) != RowState::Editing {
            return Ok(());
        }
        let target = self.options.target(Operation::Update)?.clone();
        let Some(session) = self.sessions.get(&row) else {
            return Ok(());
        };

        let old_data = session.snapshot.clone();
        let Some(staged) = self.run_validation(row, session) else {
            return Ok(());
        };

        let mut new_data = old_data.clone();
        for (field, value) in &staged {
            new_data.insert(field.clone(), value.clone());
        }

        self.states.insert(row, RowState::Submitting);
        self.bus.emit(&Event::Edited {
            row,
            row_data: new_data.clone(),
            old_row_data: old_data.clone(),
        });

        let body = self.payload_with_identifier(row, &old_data, staged);
        let result = self.transport.dispatch(&target, &body).await;
        match result {
            Ok(response) => {
                self.grid.set_data(row, new_data.clone());
                self.grid.draw(false);
                self.states.remove(&row);
                self.sessions.remove(&row);
                self.bus.emit(&Event::Updated {
                    row,
                    row_data: new_data,
                    old_row_data: old_data,
                    response: response.data,
                });
            }
            Err(err) => {
                self.states.insert(row, RowState::Editing);
                self.emit_request_error(err);
            }
        }
        Ok(())
    }

    /// Ask to delete a display row. The `delete` event fires first and the
    /// configured confirm gate can veto the request. On success the row
    /// leaves the grid; on failure it reverts to display untouched.
    #[tracing::instrument(skip(self))]
    pub async fn begin_delete(&mut self, row: RowToken) -> Result<(), ConfigError> {
        if self.state(row) != RowState::Display {
            return Ok(());
        }
        let target = self.options.target(Operation::Delete)?.clone();
        let data = self.grid.data(row).ok_or(ConfigError::UnknownRow(row.0))?;

        self.bus.emit(&Event::Delete {
            row,
            row_data: data.clone(),
        });
        if let Some(confirm) = &self.delete_confirm {
            if !confirm(row, &data) {
                debug!(row = row.0, "delete vetoed by the host");
                return Ok(());
            }
        }

        self.states.insert(row, RowState::Deleting);
        let mut body = RowData::new();
        body.insert(
            self.options.row_identifier_field.clone(),
            self.row_identifier(row, &data),
        );

        let result = self.transport.dispatch(&target, &body).await;
        match result {
            Ok(_) => {
                self.grid.remove(row);
                self.grid.draw(false);
                self.states.remove(&row);
                self.sessions.remove(&row);
                self.bus.emit(&Event::Deleted {
                    row,
                    row_data: data,
                });
            }
            Err(err) => {
                self.states.remove(&row);
                self.emit_request_error(err);
            }
        }
        Ok(())
    }

    /// Insert an unsaved row at the top of the current page, one editor per
    /// field seeded with its type-appropriate empty default (fields without
    /// an editor fall back to a plain string input). At most one unsaved
    /// row exists at a time; while one is pending this is a no-op returning
    /// `None`.
    #[tracing::instrument(skip(self))]
    pub fn add_row(&mut self) -> Result<Option<RowToken>, ConfigError> {
        if !self.options.editable {
            return Err(ConfigError::NotEditable);
        }
        if self.pending_new.is_some() {
            return Ok(None);
        }

        let mut data = RowData::new();
        let mut editors = Vec::new();
        for field in &self.options.fields {
            let editor = field.editor.clone().unwrap_or_default();
            let seed = editor.default_value();
            editors.push(CellEditor {
                field: field.name.clone(),
                element: editor.render(&field.name, &seed, None, false),
            });
            data.insert(field.name.clone(), seed);
        }

        let row = self.grid.add(data.clone());
        self.grid.draw(false);
        self.sessions.insert(
            row,
            EditSession {
                snapshot: data,
                editors,
            },
        );
        self.states.insert(row, RowState::NewUnsaved);
        self.pending_new = Some(row);
        self.bus.emit(&Event::NewRow { row });
        Ok(Some(row))
    }

    /// Validate the unsaved row and create it on the backend. The response
    /// must yield an identifier through the create endpoint's `prop` path;
    /// when it does, the row becomes a regular display row.
    #[tracing::instrument(skip(self))]
    pub async fn save_new_row(&mut self, row: RowToken) -> Result<(), ConfigError> {
        if self.state(row) != RowState::NewUnsaved {
            return Ok(());
        }
        let target = self.options.target(Operation::Create)?.clone();
        let Some(session) = self.sessions.get(&row) else {
            return Ok(());
        };

        let base = session.snapshot.clone();
        self.bus.emit(&Event::NewRowSave {
            row,
            row_data: base.clone(),
        });
        let Some(staged) = self.run_validation(row, session) else {
            return Ok(());
        };

        self.states.insert(row, RowState::Submitting);
        let result = self.transport.dispatch(&target, &staged).await;
        match result {
            Ok(response) => {
                let prop = target.prop.as_deref().unwrap_or("content.result");
                self.finish_new_row(row, prop, base, staged, response);
            }
            Err(err) => {
                self.states.insert(row, RowState::NewUnsaved);
                self.emit_request_error(err);
            }
        }
        Ok(())
    }

    fn finish_new_row(
        &mut self,
        row: RowToken,
        prop: &str,
        base: RowData,
        staged: RowData,
        response: ApiResponse,
    ) {
        let Some(id) = json_at_path(&response.data, prop).cloned() else {
            // The row cannot become a display row without an identifier;
            // surface the broken response and leave it unsaved.
            self.states.insert(row, RowState::NewUnsaved);
            self.bus.emit(&Event::Error {
                message: format!("no identifier at `{prop}` in the create response"),
            });
            return;
        };

        let mut data = base;
        for (field, value) in &staged {
            data.insert(field.clone(), value.clone());
        }
        // Only response keys matching declared fields are merged; the row
        // keeps the shape the field list promises.
        if let Value::Object(response_data) = &response.data {
            for field in &self.options.fields {
                if let Some(value) = response_data.get(&field.name) {
                    data.insert(field.name.clone(), value.clone());
                }
            }
        }
        data.insert(self.options.row_identifier_field.clone(), id);

        self.grid.set_data(row, data.clone());
        self.grid.draw(false);
        self.states.remove(&row);
        self.sessions.remove(&row);
        self.pending_new = None;
        self.bus.emit(&Event::NewRowSaved {
            row,
            row_data: data,
            response: response.data,
        });
    }

    /// Drop the unsaved row. No network call is involved.
    #[tracing::instrument(skip(self))]
    pub fn cancel_new_row(&mut self, row: RowToken) {
        if self.state(row) != RowState::NewUnsaved {
            return;
        }
        self.bus.emit(&Event::NewRowCancel { row });
        self.grid.remove(row);
        self.grid.draw(false);
        self.sessions.remove(&row);
        self.states.remove(&row);
        if self.pending_new == Some(row) {
            self.pending_new = None;
        }
        self.bus.emit(&Event::NewRowCancelled { row });
    }

    /// Route a click on a named action affordance, so hosts can delegate
    /// clicks wholesale at the table level. Unknown names are ignored.
    pub async fn handle_action(&mut self, name: &str, row: RowToken) -> Result<(), ConfigError> {
        match Action::from_name(name) {
            Some(Action::EditRow) => self.begin_edit(row),
            Some(Action::DeleteRow) => self.begin_delete(row).await,
            Some(Action::SaveEdit) => self.submit_edit(row).await,
            Some(Action::CancelEdit) => {
                self.cancel_edit(row);
                Ok(())
            }
            Some(Action::SaveNewRow) => self.save_new_row(row).await,
            Some(Action::CancelNewRow) => {
                self.cancel_new_row(row);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Double-click delegation: surfaces the row so hosts can decide to
    /// start an edit from it.
    pub fn handle_double_click(&mut self, row: RowToken) {
        if let Some(data) = self.grid.data(row) {
            self.bus.emit(&Event::RowDblClick {
                row,
                row_data: data,
            });
        }
    }

    /// Left-to-right validation pass over the submittable fields that carry
    /// editors. The first invalid field emits `input-invalid` and aborts
    /// the pass with nothing applied; valid fields emit `input-valid` as
    /// they are read.
    fn run_validation(&self, row: RowToken, session: &EditSession) -> Option<RowData> {
        let mut staged = RowData::new();
        for field in &self.options.fields {
            if !field.submittable {
                continue;
            }
            let Some(element) = session.editor(&field.name) else {
                continue;
            };

            let value = element.read_value();
            if let Err(message) = element.validate() {
                self.bus.emit(&Event::InputInvalid {
                    row,
                    field: field.name.clone(),
                    value,
                    message,
                });
                return None;
            }
            self.bus.emit(&Event::InputValid {
                row,
                field: field.name.clone(),
                value: value.clone(),
            });
            staged.insert(field.name.clone(), value);
        }
        Some(staged)
    }

    /// Prefer the configured identifier column; a row that has no
    /// identifier yet is addressed by its positional index instead.
    fn row_identifier(&self, row: RowToken, data: &RowData) -> Value {
        match data.get(&self.options.row_identifier_field) {
            Some(value) if !value.is_null() => value.clone(),
            _ => self
                .grid
                .index(row)
                .map(|idx| Value::from(idx as u64))
                .unwrap_or(Value::Null),
        }
    }

    fn payload_with_identifier(
        &self,
        row: RowToken,
        data: &RowData,
        mut staged: RowData,
    ) -> RowData {
        staged.insert(
            self.options.row_identifier_field.clone(),
            self.row_identifier(row, data),
        );
        staged
    }

    fn emit_request_error(&self, err: RequestError) {
        match err {
            RequestError::Status {
                status,
                status_text,
                url,
            } => self.bus.emit(&Event::HttpError {
                status,
                status_text,
                url,
            }),
            other => self.bus.emit(&Event::Error {
                message: other.to_string(),
            }),
        }
    }
}
