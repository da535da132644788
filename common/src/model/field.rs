use serde::{Deserialize, Serialize};

/// One input of the petition form and the template marker it fills.
///
/// Field lists are read once at startup from the family configuration and are
/// never mutated afterwards. The same list drives both the rendered HTML form
/// and the replacement builder on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Form input name, unique within a family.
    pub name: String,
    /// Text shown next to the input.
    pub label: String,
    /// Literal marker in the template, e.g. `(DATE1)`.
    pub placeholder: String,
    pub datatype: FieldDatatype,
    #[serde(default)]
    pub required: bool,
    /// Value pre-filled in the rendered form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// How a submitted value is formatted before it lands in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldDatatype {
    Text,
    Number,
    Date,
    #[serde(rename = "textarea")]
    TextArea,
}
