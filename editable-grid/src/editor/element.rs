//! The transient widget model editors render into.
//!
//! An [`InputElement`] is what the host materializes as an actual input
//! (DOM node, TUI widget, ...). It carries the current value together with
//! the constraints copied over from the editor options, so `validate` can
//! run the usual constraint-validation rules without reaching back into
//! the editor that produced it.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::utils::value_to_display;

/// One choice inside a rendered select widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectChoice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Widget-kind-specific state: the current value plus its constraints.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "control", rename_all = "kebab-case")]
pub enum Control {
    Text {
        value: String,
        multiline: bool,
        email: bool,
        min_length: Option<u32>,
        max_length: Option<u32>,
        pattern: Option<String>,
    },
    Number {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Checkbox {
        checked: bool,
    },
    Select {
        choices: Vec<SelectChoice>,
    },
}

/// A rendered input element, bound to one cell for the duration of an edit.
/// The engine replaces it wholesale on every redraw; nothing here outlives
/// the edit session it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct InputElement {
    pub id: String,
    /// The `name` attribute the click/delegation layer keys on.
    pub name: String,
    pub class_name: String,
    pub placeholder: String,
    pub required: bool,
    pub readonly: bool,
    pub disabled: bool,
    pub control: Control,
}

impl InputElement {
    /// Current value, normalized per widget kind: checkbox reads as a
    /// boolean, numeric input as a number, everything else as a string.
    pub fn read_value(&self) -> Value {
        match &self.control {
            Control::Checkbox { checked } => Value::Bool(*checked),
            Control::Number { value, .. } => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Control::Text { value, .. } => Value::String(value.clone()),
            Control::Select { choices } => Value::String(
                choices
                    .iter()
                    .find(|c| c.selected)
                    .map(|c| c.value.clone())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Inverse of [`read_value`](Self::read_value): checkbox takes the
    /// truthiness of the value, numeric input parses a number (an
    /// unparsable value behaves like an empty numeric input), selects move
    /// the selection to the matching choice.
    pub fn write_value(&mut self, value: &Value) {
        match &mut self.control {
            Control::Checkbox { checked } => *checked = truthy(value),
            Control::Number { value: v, .. } => *v = as_number(value),
            Control::Text { value: v, .. } => *v = value_to_display(value),
            Control::Select { choices } => {
                let wanted = value_to_display(value);
                for choice in choices.iter_mut() {
                    choice.selected = choice.value == wanted;
                }
            }
        }
    }

    /// Constraint validation over the element's own state. Returns a
    /// human-readable message on the first failing constraint. Disabled and
    /// readonly elements are barred from validation and always pass.
    pub fn validate(&self) -> Result<(), String> {
        if self.disabled || self.readonly {
            return Ok(());
        }

        match &self.control {
            Control::Text {
                value,
                email,
                min_length,
                max_length,
                pattern,
                ..
            } => validate_text(
                value,
                self.required,
                *email,
                *min_length,
                *max_length,
                pattern.as_deref(),
            ),
            Control::Number {
                value, min, max, step, ..
            } => validate_number(*value, self.required, *min, *max, *step),
            Control::Checkbox { checked } => {
                if self.required && !*checked {
                    Err("Please check this box if you want to proceed.".to_string())
                } else {
                    Ok(())
                }
            }
            Control::Select { choices } => {
                let selected = choices.iter().find(|c| c.selected);
                if self.required && selected.is_none_or(|c| c.value.is_empty()) {
                    Err("Please select an item in the list.".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn validate_text(
    value: &str,
    required: bool,
    email: bool,
    min_length: Option<u32>,
    max_length: Option<u32>,
    pattern: Option<&str>,
) -> Result<(), String> {
    if value.is_empty() {
        return if required {
            Err("Please fill out this field.".to_string())
        } else {
            Ok(())
        };
    }

    let chars = value.chars().count() as u32;
    if let Some(min) = min_length {
        if chars < min {
            return Err(format!(
                "Please lengthen this text to {min} characters or more (it currently has {chars})."
            ));
        }
    }
    if let Some(max) = max_length {
        if chars > max {
            return Err(format!(
                "Please shorten this text to {max} characters or less (it currently has {chars})."
            ));
        }
    }

    if email && !looks_like_email(value) {
        return Err("Please enter a valid email address.".to_string());
    }

    if let Some(pattern) = pattern {
        // Anchored like the HTML `pattern` attribute; a pattern that does
        // not compile is skipped rather than blocking every submit.
        match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(re) if !re.is_match(value) => {
                return Err("Please match the requested format.".to_string());
            }
            Ok(_) => {}
            Err(err) => warn!(%pattern, %err, "ignoring uncompilable pattern constraint"),
        }
    }

    Ok(())
}

fn validate_number(
    value: f64,
    required: bool,
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
) -> Result<(), String> {
    // NaN is how an empty (or unparsable) numeric input reads.
    if value.is_nan() {
        return if required {
            Err("Please enter a number.".to_string())
        } else {
            Ok(())
        };
    }

    if let Some(min) = min {
        if value < min {
            return Err(format!("Value must be greater than or equal to {min}."));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(format!("Value must be less than or equal to {max}."));
        }
    }
    if let Some(step) = step {
        if step > 0.0 {
            let base = min.unwrap_or(0.0);
            let steps = ((value - base) / step).round();
            if (base + steps * step - value).abs() > 1e-9 {
                return Err("Please enter a valid value.".to_string());
            }
        }
    }

    Ok(())
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
}

pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Null => false,
        _ => true,
    }
}

pub(crate) fn as_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().unwrap_or(f64::NAN),
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        _ => f64::NAN,
    }
}
