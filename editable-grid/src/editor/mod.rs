//! Editor descriptors and the widgets they render.
//!
//! An editor is stateless configuration. `render` produces a fresh
//! [`InputElement`] on every call; the previous element is simply
//! abandoned, so no widget state survives a redraw.

mod element;

pub use element::{Control, InputElement, SelectChoice};

pub(crate) use element::{as_number, truthy};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::value_to_display;

/// Options shared by every editor kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorBase {
    pub required: bool,
    pub readonly: bool,
    pub disabled: bool,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    #[serde(flatten)]
    pub base: EditorBase,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberOptions {
    #[serde(flatten)]
    pub base: EditorBase,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckboxOptions {
    #[serde(flatten)]
    pub base: EditorBase,
    /// Display string rendered for `true` while the row is not in edit mode.
    pub active_label: String,
    pub inactive_label: String,
}

impl Default for CheckboxOptions {
    fn default() -> Self {
        Self {
            base: EditorBase::default(),
            active_label: "Yes".to_string(),
            inactive_label: "No".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectOptions {
    #[serde(flatten)]
    pub base: EditorBase,
    /// Static, externally supplied option records. Rebuilt in full on every
    /// render; there is no incremental diffing.
    pub options: Vec<serde_json::Map<String, Value>>,
    pub value_key: String,
    pub label_key: String,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            base: EditorBase::default(),
            options: Vec::new(),
            value_key: "id".to_string(),
            label_key: "label".to_string(),
        }
    }
}

/// The fixed set of editor kinds. Matches on this enum are exhaustive;
/// there is no open-ended "custom widget" escape hatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Editor {
    StringInput(TextOptions),
    EmailInput(TextOptions),
    TextArea(TextOptions),
    NumberInput(NumberOptions),
    Checkbox(CheckboxOptions),
    SelectStatic(SelectOptions),
}

impl Default for Editor {
    fn default() -> Self {
        Self::StringInput(TextOptions::default())
    }
}

impl Editor {
    pub fn base(&self) -> &EditorBase {
        match self {
            Self::StringInput(o) | Self::EmailInput(o) | Self::TextArea(o) => &o.base,
            Self::NumberInput(o) => &o.base,
            Self::Checkbox(o) => &o.base,
            Self::SelectStatic(o) => &o.base,
        }
    }

    /// Seed value for a cell of a freshly added, not yet saved row.
    pub fn default_value(&self) -> Value {
        match self {
            Self::NumberInput(_) => Value::from(0),
            Self::Checkbox(_) => Value::Bool(false),
            Self::StringInput(_) | Self::EmailInput(_) | Self::TextArea(_) | Self::SelectStatic(_) => {
                Value::String(String::new())
            }
        }
    }

    /// Render a fresh element for one cell, seeded with the current value.
    /// `edit_mode` distinguishes an in-place row edit from the add-new-row
    /// form; it only affects the generated id/name attributes.
    pub fn render(
        &self,
        field_name: &str,
        current: &Value,
        row_idx: Option<usize>,
        edit_mode: bool,
    ) -> InputElement {
        let control = match self {
            Self::StringInput(o) | Self::EmailInput(o) | Self::TextArea(o) => Control::Text {
                value: value_to_display(current),
                multiline: matches!(self, Self::TextArea(_)),
                email: matches!(self, Self::EmailInput(_)),
                min_length: o.min_length,
                max_length: o.max_length,
                pattern: o.pattern.clone(),
            },
            Self::NumberInput(o) => Control::Number {
                value: as_number(current),
                min: o.min,
                max: o.max,
                step: o.step,
            },
            Self::Checkbox(_) => Control::Checkbox {
                checked: truthy(current),
            },
            Self::SelectStatic(o) => Control::Select {
                choices: build_choices(o, current),
            },
        };

        let base = self.base();
        InputElement {
            id: self.element_id(field_name, row_idx, edit_mode),
            name: self.element_name(edit_mode),
            class_name: base
                .class_name
                .clone()
                .unwrap_or_else(|| self.default_class().to_string()),
            placeholder: field_name.to_string(),
            required: base.required,
            readonly: base.readonly,
            disabled: base.disabled,
            control,
        }
    }

    fn element_id(&self, field_name: &str, row_idx: Option<usize>, edit_mode: bool) -> String {
        let suffix = match self {
            Self::SelectStatic(_) => "sel",
            _ => "inp",
        };
        let idx = row_idx.unwrap_or(0);
        match self {
            Self::Checkbox(_) if edit_mode => format!("checkbox-{field_name}-{suffix}-{idx}"),
            Self::Checkbox(_) => format!("checkbox-{field_name}-{suffix}"),
            _ if edit_mode => format!("edit-{field_name}-{suffix}-{idx}"),
            _ => format!("add-new-row-{field_name}-{suffix}"),
        }
    }

    fn element_name(&self, edit_mode: bool) -> String {
        let name = match (self, edit_mode) {
            (Self::Checkbox(_), _) => "checkbox-row-inp",
            (Self::SelectStatic(_), true) => "edit-row-sel",
            (Self::SelectStatic(_), false) => "add-new-row-sel",
            (_, true) => "edit-row-inp",
            (_, false) => "add-new-row-inp",
        };
        name.to_string()
    }

    fn default_class(&self) -> &'static str {
        match self {
            Self::Checkbox(_) => "form-check-input form-check-input-sm",
            Self::SelectStatic(_) => "form-select form-select-sm",
            _ => "form-control form-control-sm",
        }
    }
}

/// Full rebuild of the option list; the choice whose value matches the
/// current cell value is marked selected. With no match the first choice
/// takes the selection, like a plain select element would.
fn build_choices(options: &SelectOptions, current: &Value) -> Vec<SelectChoice> {
    let wanted = value_to_display(current);

    let mut choices: Vec<SelectChoice> = options
        .options
        .iter()
        .filter_map(|record| {
            let value = value_to_display(record.get(&options.value_key)?);
            let label = record
                .get(&options.label_key)
                .map(value_to_display)
                .unwrap_or_else(|| value.clone());
            Some(SelectChoice {
                selected: value == wanted,
                value,
                label,
            })
        })
        .collect();

    if !choices.iter().any(|c| c.selected) {
        if let Some(first) = choices.first_mut() {
            first.selected = true;
        }
    }

    choices
}
