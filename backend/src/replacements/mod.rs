//! # Replacement Builder
//!
//! Turns a submitted form into the placeholder → text map consumed by the
//! document engine.
//!
//! ## Workflow
//!
//! 1.  **Validation**: `validate` checks that every required field of the
//!     family was submitted with a non-blank value. Nothing else is checked;
//!     optional fields may be absent.
//!
//! 2.  **Per-field formatting**: `build_replacements` walks the family's field
//!     list in order and stores one entry per field under its placeholder,
//!     formatted by datatype (see `format`). Values that cannot be formatted
//!     are stored as submitted.
//!
//! 3.  **Computed placeholders**: once every field is in the map, the family's
//!     recipe derives the composite entries (see `computed`). Those may read
//!     the final values of other placeholders.

pub mod computed;
pub mod format;

use chrono::NaiveDate;
use common::model::family::FamilyProfile;
use common::model::field::{FieldDatatype, FieldDefinition};
use log::warn;
use std::collections::HashMap;
use thiserror::Error;

/// Raw form submission: input name → submitted text.
pub type RawForm = HashMap<String, String>;

/// Placeholder → substitution text for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap(HashMap<String, String>);

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, placeholder: impl Into<String>, value: impl Into<String>) {
        self.0.insert(placeholder.into(), value.into());
    }

    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.0.get(placeholder).map(String::as_str)
    }

    /// Value of `placeholder`, or `default` when it has no entry.
    pub fn value_or<'a>(&'a self, placeholder: &str, default: &'a str) -> &'a str {
        self.get(placeholder).unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReplacementMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Required fields that were missing or blank, in field-list order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required form fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

/// Checks that every `required` field is present and not blank.
pub fn validate(fields: &[FieldDefinition], form: &RawForm) -> Result<(), ValidationError> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|field| field.required)
        .filter(|field| !form.get(&field.name).is_some_and(|v| !v.trim().is_empty()))
        .map(|field| field.name.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        warn!("Missing required fields: {:?}", missing);
        Err(ValidationError { missing })
    }
}

/// Builds the full replacement map for `family` from a validated form.
///
/// `today` feeds the `(CURRENT_DATE)` placeholder.
pub fn build_replacements(
    family: &FamilyProfile,
    form: &RawForm,
    today: NaiveDate,
) -> ReplacementMap {
    let mut map = ReplacementMap::new();
    for field in &family.fields {
        let raw = form.get(&field.name).map(String::as_str).unwrap_or("");
        map.insert(field.placeholder.as_str(), format_field(field, raw));
    }
    computed::apply(&mut map, &family.recipe, form, today);
    map
}

fn format_field(field: &FieldDefinition, raw: &str) -> String {
    let formatted = match field.datatype {
        FieldDatatype::Text | FieldDatatype::TextArea => Ok(raw.to_string()),
        FieldDatatype::Date => format::convert_date_format(raw),
        FieldDatatype::Number => format::format_number_indian(raw),
    };
    formatted.unwrap_or_else(|passthrough| {
        if !raw.is_empty() {
            warn!(
                "Could not format {} value {:?} for {}, using it as entered",
                datatype_name(field.datatype),
                raw,
                field.name
            );
        }
        passthrough.into_raw()
    })
}

fn datatype_name(datatype: FieldDatatype) -> &'static str {
    match datatype {
        FieldDatatype::Text => "text",
        FieldDatatype::Number => "number",
        FieldDatatype::Date => "date",
        FieldDatatype::TextArea => "textarea",
    }
}
