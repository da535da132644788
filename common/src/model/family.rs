//! Template families: a named group of document templates sharing one field
//! list and one recipe for the computed placeholders.

use crate::model::field::FieldDefinition;
use serde::{Deserialize, Serialize};

/// Root of the family configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Family whose form is rendered at `GET /`.
    pub default_family: String,
    /// Template generated by a plain `POST /` submission.
    pub legacy: LegacyTemplate,
    pub families: Vec<FamilyProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyTemplate {
    pub family: String,
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyProfile {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub fields: Vec<FieldDefinition>,
    pub recipe: ComputedRecipe,
    /// Document types generated from this family, in download order.
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
}

/// Maps a `docType` key from the URL to a template file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub doc_type: String,
    pub file: String,
}

/// Per-family wording and switches for the computed placeholders.
///
/// Sentences use `{name}` slots which are filled from the replacement map:
/// `{date}`, `{amount}`, `{village}`, `{taluk}`, `{ares}` and `{syno}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedRecipe {
    pub cause_of_action: CauseOfActionRecipe,
    #[serde(default = "default_ares2_wording")]
    pub ares2_wording: String,
    /// Render `(CURRENT_DATE)` as `5th day of March, 2024`.
    #[serde(default)]
    pub current_date_day_of: bool,
    /// Regroup `(TOTAL_AMOUNT)` with Indian digit grouping.
    #[serde(default)]
    pub group_total_amount: bool,
    #[serde(default = "default_uppercase")]
    pub uppercase: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseOfActionRecipe {
    pub opening: String,
    #[serde(default)]
    pub compensation: Vec<CompensationClause>,
    pub closing: String,
}

/// Sentence appended when `placeholder` holds a non-zero amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationClause {
    pub placeholder: String,
    pub sentence: String,
}

fn default_ares2_wording() -> String {
    "and {ares} in Sy.No. {syno}".to_string()
}

fn default_uppercase() -> Vec<String> {
    vec!["(DISTRICT)".to_string()]
}
