//! # Template Catalog
//!
//! All template families known to the service, loaded once at startup.
//!
//! ## Workflow
//!
//! 1.  **Load**: the family configuration is read from the JSON embedded in
//!     the binary (`config/families.json`) or from a file named in the
//!     application configuration.
//!
//! 2.  **Check**: `from_config` rejects configurations that could produce
//!     ambiguous documents. Field names and placeholders must be unique within
//!     a family, no placeholder may contain another one, doc types must be
//!     unique across families, and the default and legacy families must exist.
//!
//! 3.  **Resolve**: handlers look up a family by name or a `docType` key to
//!     its `(family, template file)` pair.

use crate::replacements::computed::COMPUTED_PLACEHOLDERS;
use common::model::family::{CatalogConfig, FamilyProfile, TemplateEntry};
use log::info;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use thiserror::Error;

const EMBEDDED_FAMILIES: &str = include_str!("../../config/families.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read family configuration {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid family configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("family {0:?} is defined twice")]
    DuplicateFamily(String),
    #[error("family {family:?} defines field {name:?} twice")]
    DuplicateField { family: String, name: String },
    #[error("family {family:?} uses placeholder {placeholder:?} for two fields")]
    DuplicatePlaceholder { family: String, placeholder: String },
    #[error("family {family:?}: placeholder {outer:?} contains placeholder {inner:?}")]
    OverlappingPlaceholders {
        family: String,
        outer: String,
        inner: String,
    },
    #[error("doc type {0:?} is configured twice")]
    DuplicateDocType(String),
    #[error("unknown family {0:?} referenced by the catalog")]
    UnknownFamily(String),
}

/// A resolved document type.
#[derive(Debug, Clone, Copy)]
pub struct DocumentTemplate<'a> {
    pub family: &'a FamilyProfile,
    pub entry: &'a TemplateEntry,
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    families: Vec<FamilyProfile>,
    default_index: usize,
    legacy_index: usize,
    legacy_file: String,
}

impl TemplateCatalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_FAMILIES)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!("Loading template families from {}", path.display());
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_config(serde_json::from_str(json)?)
    }

    pub fn from_config(config: CatalogConfig) -> Result<Self, CatalogError> {
        let mut names = HashSet::new();
        let mut doc_types = HashSet::new();
        for family in &config.families {
            if !names.insert(family.name.as_str()) {
                return Err(CatalogError::DuplicateFamily(family.name.clone()));
            }
            check_family(family)?;
            for entry in &family.templates {
                if !doc_types.insert(entry.doc_type.as_str()) {
                    return Err(CatalogError::DuplicateDocType(entry.doc_type.clone()));
                }
            }
        }

        let index_of = |name: &str| {
            config
                .families
                .iter()
                .position(|family| family.name == name)
                .ok_or_else(|| CatalogError::UnknownFamily(name.to_string()))
        };
        let default_index = index_of(&config.default_family)?;
        let legacy_index = index_of(&config.legacy.family)?;

        info!(
            "Loaded {} template families with {} document types",
            config.families.len(),
            doc_types.len()
        );
        Ok(Self {
            default_index,
            legacy_index,
            legacy_file: config.legacy.file,
            families: config.families,
        })
    }

    /// Replaces the template file used by the legacy `POST /` flow.
    pub fn with_legacy_file(mut self, file: impl Into<String>) -> Self {
        self.legacy_file = file.into();
        self
    }

    pub fn families(&self) -> &[FamilyProfile] {
        &self.families
    }

    pub fn family(&self, name: &str) -> Option<&FamilyProfile> {
        self.families.iter().find(|family| family.name == name)
    }

    pub fn default_family(&self) -> &FamilyProfile {
        &self.families[self.default_index]
    }

    /// Family and template file for a plain form submission.
    pub fn legacy(&self) -> (&FamilyProfile, &str) {
        (&self.families[self.legacy_index], &self.legacy_file)
    }

    pub fn resolve(&self, doc_type: &str) -> Option<DocumentTemplate<'_>> {
        self.document_templates()
            .find(|template| template.entry.doc_type == doc_type)
    }

    /// Every configured document type in configuration order.
    pub fn document_templates(&self) -> impl Iterator<Item = DocumentTemplate<'_>> {
        self.families.iter().flat_map(|family| {
            family
                .templates
                .iter()
                .map(move |entry| DocumentTemplate { family, entry })
        })
    }

    /// Template file names the service may open, the legacy template included.
    pub fn template_files(&self) -> BTreeSet<&str> {
        self.document_templates()
            .map(|template| template.entry.file.as_str())
            .chain(std::iter::once(self.legacy_file.as_str()))
            .collect()
    }
}

fn check_family(family: &FamilyProfile) -> Result<(), CatalogError> {
    let mut names = HashSet::new();
    let mut placeholders = HashSet::new();
    for field in &family.fields {
        if !names.insert(field.name.as_str()) {
            return Err(CatalogError::DuplicateField {
                family: family.name.clone(),
                name: field.name.clone(),
            });
        }
        if !placeholders.insert(field.placeholder.as_str()) {
            return Err(CatalogError::DuplicatePlaceholder {
                family: family.name.clone(),
                placeholder: field.placeholder.clone(),
            });
        }
    }

    // Fields may share a placeholder with a computed entry, which then
    // overwrites it, so the full set is deduplicated before comparing.
    let all: BTreeSet<&str> = placeholders
        .into_iter()
        .chain(COMPUTED_PLACEHOLDERS)
        .chain(
            family
                .recipe
                .cause_of_action
                .compensation
                .iter()
                .map(|clause| clause.placeholder.as_str()),
        )
        .chain(family.recipe.uppercase.iter().map(String::as_str))
        .collect();

    for outer in &all {
        if let Some(inner) = all.iter().find(|inner| inner != &outer && outer.contains(**inner)) {
            return Err(CatalogError::OverlappingPlaceholders {
                family: family.name.clone(),
                outer: outer.to_string(),
                inner: inner.to_string(),
            });
        }
    }
    Ok(())
}
