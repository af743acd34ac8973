use thiserror::Error;

/// Mistakes in how the host wired up the engine. These are returned as hard
/// errors from the API instead of being converted to events: no safe default
/// exists for a misconfigured instance.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the `editable` option is disabled for this table")]
    NotEditable,

    #[error("not a single field carries an `editor`")]
    NoEditableField,

    #[error("no `{0}` endpoint is configured")]
    MissingEndpoint(&'static str),

    #[error("the `{0}` endpoint has an empty `src`")]
    EmptyEndpoint(&'static str),

    #[error("unsupported method `{method}` for the `{target}` endpoint")]
    UnsupportedMethod { method: String, target: &'static str },

    #[error("`row_identifier_field` must not be empty")]
    MissingIdentifierField,

    #[error("duplicate field name `{0}`")]
    DuplicateField(String),

    #[error("field `{field}`: a static select editor needs a non-empty option list")]
    EmptySelectOptions { field: String },

    #[error("field `{field}`: display type `{display}` requires a static select editor")]
    EditorMismatch { field: String, display: String },

    #[error("no `{action}` icon is registered for icon source `{icon_src}`")]
    MissingIcon { action: String, icon_src: String },

    #[error("unknown row token {0}")]
    UnknownRow(u64),
}

/// Failures raised while talking to the backend. Converted to events at the
/// engine boundary; they never propagate to the host as errors.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{url}: {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        url: String,
    },

    #[error("malformed response body: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("{message}")]
    Unknown { message: String },
}
