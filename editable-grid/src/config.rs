//! Construction-time options and their normalization.
//!
//! Options are normalized exactly once, when the engine is built. The rest
//! of the crate only ever reads the fully-populated [`NormalizedOptions`]
//! record; defaults are never re-derived downstream.

use std::collections::HashMap;

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::editor::Editor;
use crate::error::ConfigError;
use crate::field::{DisplayType, FieldSchema};
use crate::grid::ActionKind;

/// Body encoding for backend requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyFormat {
    #[default]
    Json,
    FormData,
}

/// An endpoint as the host declares it: either a bare URL or a record with
/// per-endpoint overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
    Url(String),
    Detailed {
        src: String,
        #[serde(default)]
        method: Option<String>,
        #[serde(default)]
        format: Option<BodyFormat>,
        /// Dotted path into the response body.
        #[serde(default)]
        prop: Option<String>,
        /// Extra payload sent along with a POST data source.
        #[serde(default)]
        data: Option<Value>,
    },
}

impl SourceSpec {
    fn src(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::Detailed { src, .. } => src,
        }
    }

    fn method(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Detailed { method, .. } => method.as_deref(),
        }
    }

    fn format(&self) -> Option<BodyFormat> {
        match self {
            Self::Url(_) => None,
            Self::Detailed { format, .. } => *format,
        }
    }

    fn prop(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Detailed { prop, .. } => prop.as_deref(),
        }
    }
}

/// A fully-resolved request descriptor; the only shape the engine sees.
#[derive(Debug, Clone)]
pub struct RequestTarget {
    pub url: String,
    pub method: Method,
    pub format: BodyFormat,
    /// Dotted path into the response body. For the create endpoint this is
    /// where the new row's identifier is read from.
    pub prop: Option<String>,
}

/// The endpoint the host grid pulls its rows from. The engine never calls
/// it; it is normalized here so the host reads one shape.
#[derive(Debug, Clone)]
pub struct DataTarget {
    pub url: String,
    pub method: Method,
    pub format: BodyFormat,
    pub prop: Option<String>,
    pub data: Option<Value>,
}

/// The mutating endpoints the engine owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Update,
    Delete,
    Create,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Create => "create",
        }
    }
}

/// Actions an icon can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconAction {
    EditRow,
    DeleteRow,
    SubmitRow,
    CancelRow,
}

impl IconAction {
    pub fn name(self) -> &'static str {
        match self {
            Self::EditRow => "edit-row",
            Self::DeleteRow => "delete-row",
            Self::SubmitRow => "submit-row",
            Self::CancelRow => "cancel-row",
        }
    }
}

fn default_icon_src() -> String {
    "fa".to_string()
}

fn default_icon_map() -> HashMap<String, HashMap<IconAction, String>> {
    let fa = [
        (IconAction::EditRow, "fa-solid fa-pen-to-square"),
        (IconAction::DeleteRow, "fa-solid fa-trash"),
        (IconAction::SubmitRow, "fa-solid fa-check"),
        (IconAction::CancelRow, "fa-solid fa-xmark"),
    ]
    .into_iter()
    .map(|(action, class)| (action, class.to_string()))
    .collect();

    HashMap::from([("fa".to_string(), fa)])
}

/// Everything the host hands over when building an engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub editable: bool,
    pub data_source: Option<SourceSpec>,
    pub update_source: Option<SourceSpec>,
    pub delete_source: Option<SourceSpec>,
    pub create_source: Option<SourceSpec>,
    /// Field whose value identifies a row against the backend.
    pub row_identifier_field: String,
    pub icon_src: String,
    pub icon_map: HashMap<String, HashMap<IconAction, String>>,
    pub fields: Vec<FieldSchema>,
    pub buttons: Vec<ActionKind>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            editable: true,
            data_source: None,
            update_source: None,
            delete_source: None,
            create_source: None,
            row_identifier_field: "id".to_string(),
            icon_src: default_icon_src(),
            icon_map: default_icon_map(),
            fields: Vec::new(),
            buttons: Vec::new(),
        }
    }
}

impl Options {
    /// The single normalization pass. Everything defaultable is resolved
    /// here; configuration mistakes surface as [`ConfigError`] before the
    /// engine processes its first interaction.
    pub fn normalize(mut self) -> Result<NormalizedOptions, ConfigError> {
        if self.row_identifier_field.trim().is_empty() {
            return Err(ConfigError::MissingIdentifierField);
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.clone()) {
                return Err(ConfigError::DuplicateField(field.name.clone()));
            }
        }

        for field in &mut self.fields {
            check_field(field)?;
            apply_money_defaults(field);
        }

        let update = normalize_target(
            self.update_source.as_ref(),
            "update",
            Method::PUT,
            &[Method::PUT, Method::PATCH, Method::POST],
            None,
        )?;
        let delete = normalize_target(
            self.delete_source.as_ref(),
            "delete",
            Method::DELETE,
            &[Method::DELETE, Method::POST],
            None,
        )?;
        let create = normalize_target(
            self.create_source.as_ref(),
            "create",
            Method::POST,
            &[Method::POST],
            Some("content.result"),
        )?;
        let data_source = normalize_data_source(self.data_source.as_ref())?;

        let icons = self.icon_map.get(&self.icon_src).cloned().unwrap_or_default();

        Ok(NormalizedOptions {
            editable: self.editable,
            data_source,
            update,
            delete,
            create,
            row_identifier_field: self.row_identifier_field,
            icon_src: self.icon_src,
            icons,
            fields: self.fields,
            buttons: self.buttons,
        })
    }
}

fn check_field(field: &FieldSchema) -> Result<(), ConfigError> {
    match (&field.display_type, &field.editor) {
        (DisplayType::ListStatic, Some(Editor::SelectStatic(opts))) => {
            if opts.options.is_empty() {
                return Err(ConfigError::EmptySelectOptions {
                    field: field.name.clone(),
                });
            }
        }
        (DisplayType::ListStatic, _) => {
            return Err(ConfigError::EditorMismatch {
                field: field.name.clone(),
                display: field.display_type.name().to_string(),
            });
        }
        (_, Some(Editor::SelectStatic(opts))) if opts.options.is_empty() => {
            return Err(ConfigError::EmptySelectOptions {
                field: field.name.clone(),
            });
        }
        _ => {}
    }
    Ok(())
}

/// Money columns get the conventional step unless the host set one.
fn apply_money_defaults(field: &mut FieldSchema) {
    let step = match field.display_type {
        DisplayType::Money => 0.01,
        DisplayType::Money3 => 0.001,
        _ => return,
    };
    if let Some(Editor::NumberInput(opts)) = &mut field.editor {
        if opts.step.is_none() {
            opts.step = Some(step);
        }
    }
}

fn parse_method(
    spec: &SourceSpec,
    target: &'static str,
    default: Method,
    allowed: &[Method],
) -> Result<Method, ConfigError> {
    let Some(raw) = spec.method() else {
        return Ok(default);
    };
    let method = Method::from_bytes(raw.to_uppercase().as_bytes()).map_err(|_| {
        ConfigError::UnsupportedMethod {
            method: raw.to_string(),
            target,
        }
    })?;
    if !allowed.contains(&method) {
        return Err(ConfigError::UnsupportedMethod {
            method: raw.to_string(),
            target,
        });
    }
    Ok(method)
}

fn normalize_target(
    spec: Option<&SourceSpec>,
    target: &'static str,
    default_method: Method,
    allowed: &[Method],
    default_prop: Option<&str>,
) -> Result<Option<RequestTarget>, ConfigError> {
    let Some(spec) = spec else {
        return Ok(None);
    };
    if spec.src().trim().is_empty() {
        return Err(ConfigError::EmptyEndpoint(target));
    }

    Ok(Some(RequestTarget {
        url: spec.src().to_string(),
        method: parse_method(spec, target, default_method, allowed)?,
        format: spec.format().unwrap_or_default(),
        prop: spec
            .prop()
            .filter(|p| !p.trim().is_empty())
            .or(default_prop)
            .map(str::to_string),
    }))
}

fn normalize_data_source(spec: Option<&SourceSpec>) -> Result<Option<DataTarget>, ConfigError> {
    let Some(spec) = spec else {
        return Ok(None);
    };
    if spec.src().trim().is_empty() {
        return Err(ConfigError::EmptyEndpoint("data"));
    }

    let data = match spec {
        SourceSpec::Detailed { data, .. } => data.clone(),
        SourceSpec::Url(_) => None,
    };

    Ok(Some(DataTarget {
        url: spec.src().to_string(),
        method: parse_method(spec, "data", Method::GET, &[Method::GET, Method::POST])?,
        format: spec.format().unwrap_or_default(),
        prop: spec.prop().map(str::to_string),
        data,
    }))
}

/// The fully-populated configuration record produced by
/// [`Options::normalize`].
#[derive(Debug, Clone)]
pub struct NormalizedOptions {
    pub editable: bool,
    pub data_source: Option<DataTarget>,
    pub update: Option<RequestTarget>,
    pub delete: Option<RequestTarget>,
    pub create: Option<RequestTarget>,
    pub row_identifier_field: String,
    pub icon_src: String,
    pub icons: HashMap<IconAction, String>,
    pub fields: Vec<FieldSchema>,
    pub buttons: Vec<ActionKind>,
}

impl NormalizedOptions {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_editable_field(&self) -> bool {
        self.fields.iter().any(FieldSchema::is_editable)
    }

    /// Endpoint for a mutating operation; absence is a configuration
    /// error at the point of use.
    pub fn target(&self, op: Operation) -> Result<&RequestTarget, ConfigError> {
        let target = match op {
            Operation::Update => self.update.as_ref(),
            Operation::Delete => self.delete.as_ref(),
            Operation::Create => self.create.as_ref(),
        };
        target.ok_or(ConfigError::MissingEndpoint(op.name()))
    }

    /// Icon class registered for an action under the configured source.
    pub fn icon(&self, action: IconAction) -> Result<&str, ConfigError> {
        self.icons
            .get(&action)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingIcon {
                action: action.name().to_string(),
                icon_src: self.icon_src.clone(),
            })
    }
}
