use serde::{Deserialize, Serialize};

use crate::editor::Editor;

/// How a column's values are rendered while the row is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayType {
    #[default]
    String,
    Number,
    Html,
    Date,
    Money,
    Money3,
    ListStatic,
}

impl DisplayType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Html => "html",
            Self::Date => "date",
            Self::Money => "money",
            Self::Money3 => "money3",
            Self::ListStatic => "list-static",
        }
    }
}

/// Declarative description of one grid column: where its value lives in the
/// row data, how it displays, and whether (and how) it can be edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,

    #[serde(default, rename = "type")]
    pub display_type: DisplayType,

    /// Absent means the field is read-only.
    #[serde(default)]
    pub editor: Option<Editor>,

    /// Whether this field's value is sent on update/create.
    #[serde(default = "default_true")]
    pub submittable: bool,

    #[serde(default = "default_true")]
    pub orderable: bool,

    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, display_type: DisplayType) -> Self {
        Self {
            name: name.into(),
            display_type,
            editor: None,
            submittable: true,
            orderable: true,
            visible: true,
        }
    }

    pub fn with_editor(mut self, editor: Editor) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn not_submittable(mut self) -> Self {
        self.submittable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_editable(&self) -> bool {
        self.editor.is_some()
    }
}
