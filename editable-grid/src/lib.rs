// lib.rs
//! In-place row editing for host-rendered data grids.
//!
//! One [`Editable`] engine binds to one table. It owns the row-edit
//! lifecycle (display, editing, unsaved new rows, deletion), renders
//! editor widgets for the host to materialize, validates input, and
//! reconciles every mutation with a backend over HTTP. The grid itself
//! (layout, sorting, paging) stays on the host side of the [`DataGrid`]
//! contract, and every lifecycle step is announced on a typed event bus.

mod config;
mod editable;
mod editor;
mod error;
mod events;
mod field;
mod grid;
mod http;
pub mod log;
mod row;
mod utils;

pub use config::{
    BodyFormat, DataTarget, IconAction, NormalizedOptions, Operation, Options, RequestTarget,
    SourceSpec,
};
pub use editable::{DeleteConfirm, Editable};
pub use editor::{
    CheckboxOptions, Control, Editor, EditorBase, InputElement, NumberOptions, SelectChoice,
    SelectOptions, TextOptions,
};
pub use error::{ConfigError, RequestError};
pub use events::{Event, EventBus, EventKind};
pub use field::{DisplayType, FieldSchema};
pub use grid::{
    column_configs, icon_for, render_cell, Action, ActionKind, CellRender, ColumnConfig, DataGrid,
    IconElement, RowData, RowToken,
};
pub use http::{ApiResponse, HttpClient, RequestInit, Transport};
pub use row::{CellEditor, EditSession, RowState};
pub use utils::{format_number, json_at_path};
