//! The external grid contract and the column/button binding layer.
//!
//! The grid component itself (layout, sorting, paging, the actual table)
//! lives on the host side of [`DataGrid`]; this module translates the
//! field and button declarations into the grid's column model and resolves
//! row-level clicks back into engine actions by widget name, so clicks can
//! be delegated once at the table level and dynamically added rows stay
//! wired without re-registration.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{IconAction, NormalizedOptions};
use crate::editor::Editor;
use crate::error::ConfigError;
use crate::field::DisplayType;
use crate::utils::{format_number, value_to_display};

/// Opaque reference to a row inside the host grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowToken(pub u64);

/// Row payload: field name to JSON value.
pub type RowData = serde_json::Map<String, Value>;

/// Minimal contract the engine consumes from the host's grid component.
/// The grid owns the rows; the engine references them only through tokens.
pub trait DataGrid {
    fn data(&self, row: RowToken) -> Option<RowData>;
    fn set_data(&mut self, row: RowToken, data: RowData);
    /// Stable identifier the grid tracks for the row, if any.
    fn id(&self, row: RowToken) -> Option<Value>;
    /// Positional index of the row in the grid's current order.
    fn index(&self, row: RowToken) -> Option<usize>;
    /// Insert a new row; it should surface at the top of the current page.
    fn add(&mut self, data: RowData) -> RowToken;
    fn remove(&mut self, row: RowToken);
    /// Redraw; `redraw_paging` false keeps the current page.
    fn draw(&mut self, redraw_paging: bool);
}

/// Row-level action buttons a host can declare on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Edit,
    Delete,
    Submit,
    Cancel,
}

/// Engine-recognized click targets, resolved from the `name` attribute on
/// the clicked element. Clicks on anything else are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EditRow,
    DeleteRow,
    SaveEdit,
    CancelEdit,
    SaveNewRow,
    CancelNewRow,
}

impl Action {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "edit-row-icon" => Some(Self::EditRow),
            "delete-row-icon" => Some(Self::DeleteRow),
            "save-row-edit-icon" => Some(Self::SaveEdit),
            "cancel-row-edit-icon" => Some(Self::CancelEdit),
            "save-new-row-icon" => Some(Self::SaveNewRow),
            "cancel-new-row-icon" => Some(Self::CancelNewRow),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::EditRow => "edit-row-icon",
            Self::DeleteRow => "delete-row-icon",
            Self::SaveEdit => "save-row-edit-icon",
            Self::CancelEdit => "cancel-row-edit-icon",
            Self::SaveNewRow => "save-new-row-icon",
            Self::CancelNewRow => "cancel-new-row-icon",
        }
    }

    fn icon_action(self) -> IconAction {
        match self {
            Self::EditRow => IconAction::EditRow,
            Self::DeleteRow => IconAction::DeleteRow,
            Self::SaveEdit | Self::SaveNewRow => IconAction::SubmitRow,
            Self::CancelEdit | Self::CancelNewRow => IconAction::CancelRow,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::EditRow => "Edit",
            Self::DeleteRow => "Delete",
            Self::SaveEdit | Self::SaveNewRow => "Save",
            Self::CancelEdit | Self::CancelNewRow => "Cancel",
        }
    }
}

/// A rendered action affordance the host places in a button cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconElement {
    /// The `name` attribute click routing keys on.
    pub name: String,
    pub class_name: String,
    pub title: String,
}

/// How a display cell is turned into presentable content.
#[derive(Debug, Clone, PartialEq)]
pub enum CellRender {
    Plain,
    Checkbox {
        active_label: String,
        inactive_label: String,
    },
    Money {
        decimals: usize,
    },
    Date,
    Button {
        action: ActionKind,
        icon: IconElement,
    },
}

/// One column handed to the host grid's configuration.
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    /// Data key; `None` for computed columns (buttons).
    pub data: Option<String>,
    pub kind: DisplayType,
    pub orderable: bool,
    pub visible: bool,
    pub render: CellRender,
}

/// Resolve the icon affordance for one action under the configured icon
/// source. Fails when the source has no icon registered for it.
pub fn icon_for(options: &NormalizedOptions, action: Action) -> Result<IconElement, ConfigError> {
    let class = options.icon(action.icon_action())?;
    Ok(IconElement {
        name: action.name().to_string(),
        class_name: class.to_string(),
        title: action.title().to_string(),
    })
}

/// Translate the declared fields and buttons into grid columns: field
/// columns first, in declaration order, then one non-orderable column per
/// action button.
pub fn column_configs(options: &NormalizedOptions) -> Result<Vec<ColumnConfig>, ConfigError> {
    let mut columns: Vec<ColumnConfig> = options
        .fields
        .iter()
        .map(|field| ColumnConfig {
            data: Some(field.name.clone()),
            kind: field.display_type,
            orderable: field.orderable,
            visible: field.visible,
            render: field_render(field.display_type, field.editor.as_ref()),
        })
        .collect();

    for button in &options.buttons {
        if *button == ActionKind::Edit && !options.editable {
            return Err(ConfigError::NotEditable);
        }
        let action = match button {
            ActionKind::Edit => Action::EditRow,
            ActionKind::Delete => Action::DeleteRow,
            ActionKind::Submit => Action::SaveEdit,
            ActionKind::Cancel => Action::CancelEdit,
        };
        columns.push(ColumnConfig {
            data: None,
            kind: DisplayType::Html,
            orderable: false,
            visible: true,
            render: CellRender::Button {
                action: *button,
                icon: icon_for(options, action)?,
            },
        });
    }

    Ok(columns)
}

fn field_render(display_type: DisplayType, editor: Option<&Editor>) -> CellRender {
    match display_type {
        DisplayType::Money => CellRender::Money { decimals: 2 },
        DisplayType::Money3 => CellRender::Money { decimals: 3 },
        DisplayType::Date => CellRender::Date,
        _ => match editor {
            Some(Editor::Checkbox(opts)) => CellRender::Checkbox {
                active_label: opts.active_label.clone(),
                inactive_label: opts.inactive_label.clone(),
            },
            _ => CellRender::Plain,
        },
    }
}

/// Turn one cell value into display content. Pure; the host calls this
/// from its column render hook.
pub fn render_cell(render: &CellRender, value: &Value) -> String {
    match render {
        CellRender::Plain => value_to_display(value),
        CellRender::Checkbox {
            active_label,
            inactive_label,
        } => match value {
            Value::Bool(true) => active_label.clone(),
            Value::Bool(false) => inactive_label.clone(),
            // Preformatted values pass straight through.
            Value::String(s) => s.clone(),
            other => value_to_display(other),
        },
        CellRender::Money { decimals } => match value.as_f64() {
            Some(amount) => format_number(amount, *decimals, '.', ' '),
            None => value_to_display(value),
        },
        CellRender::Date => match value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            Some(ts) => ts.format("%Y-%m-%d").to_string(),
            None => value_to_display(value),
        },
        CellRender::Button { icon, .. } => format!(
            r#"<span name="{}" class="{}" title="{}"></span>"#,
            icon.name, icon.class_name, icon.title
        ),
    }
}
