// Interactive form specification - the typed shape of the `interactive`
// metadata object. Pure data; the store and the presentation layer both
// depend on this contract.

use serde::{Deserialize, Serialize};

/// Declarative description of a generator-backed input form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub fields: Vec<Field>,
    pub button_text: String,
    /// Name of a registered prompt generator. Unresolved names are an error
    /// at generation time, not here.
    pub on_submit: String,
    /// Consumed only by diagram-producing generators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_diagram: Option<bool>,
}

/// One input field of an interactive form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique within the owning `fields` array.
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Textarea only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Select only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    /// File only: MIME/extension filter, e.g. `image/*` or `.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

impl Field {
    /// Checkbox fields are the only kind that may legitimately be empty.
    pub fn is_required(&self) -> bool {
        self.field_type != FieldType::Checkbox
    }

    /// Display rows for a textarea.
    pub fn effective_rows(&self) -> u32 {
        self.rows.unwrap_or(3)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Input,
    Textarea,
    Select,
    Checkbox,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}
