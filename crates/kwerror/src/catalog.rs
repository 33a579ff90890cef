// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading sets of families from TOML.
//!
//! ```toml
//! [families.CoordError]
//! default_msg = "x={x} y={y}"
//! format_msg = true
//!
//! [families.StrictCoordError]
//! parent = "CoordError"
//! new_update = false
//! ```
//!
//! Families without a `parent` extend the base family. Unset options are
//! inherited from the parent.

use crate::error::ConfigError;
use crate::family::{BASE_FAMILY, Family};
use crate::options::FamilyDecl;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// On-disk shape of a catalog document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CatalogDocument {
    /// Family declarations keyed by family name.
    #[serde(default)]
    pub families: BTreeMap<String, FamilyDecl>,
}

/// A resolved, name-indexed set of families.
#[derive(Debug, Clone, Default)]
pub struct FamilyCatalog {
    families: BTreeMap<String, Family>,
}

impl FamilyCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and resolve a catalog file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and resolve a catalog document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let doc: CatalogDocument = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;
        Self::from_document(doc)
    }

    /// Resolve every declaration, parents first.
    pub fn from_document(doc: CatalogDocument) -> Result<Self, ConfigError> {
        if doc.families.contains_key(BASE_FAMILY) {
            return Err(ConfigError::DuplicateFamily {
                family: BASE_FAMILY.into(),
            });
        }
        let mut catalog = Self::new();
        let mut visiting = Vec::new();
        for name in doc.families.keys() {
            resolve(name, &doc.families, &mut catalog.families, &mut visiting)?;
        }
        debug!(
            target: "kwerror.family",
            families = catalog.len(),
            "catalog resolved"
        );
        Ok(catalog)
    }

    /// Add an already-built family.
    pub fn insert(&mut self, family: Family) -> Result<(), ConfigError> {
        if family.name() == BASE_FAMILY || self.families.contains_key(family.name()) {
            return Err(ConfigError::DuplicateFamily {
                family: family.name().into(),
            });
        }
        self.families.insert(family.name().to_owned(), family);
        Ok(())
    }

    /// Look up a family by name; the base family is always present.
    pub fn get(&self, name: &str) -> Option<&Family> {
        if name == BASE_FAMILY {
            return Some(Family::base());
        }
        self.families.get(name)
    }

    /// Declared families in name order (the base family is not listed).
    pub fn iter(&self) -> impl Iterator<Item = &Family> {
        self.families.values()
    }

    /// Number of declared families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether no family has been declared.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// JSON schema of the catalog document.
    pub fn schema() -> schemars::Schema {
        schemars::schema_for!(CatalogDocument)
    }
}

fn resolve(
    name: &str,
    decls: &BTreeMap<String, FamilyDecl>,
    resolved: &mut BTreeMap<String, Family>,
    visiting: &mut Vec<String>,
) -> Result<Family, ConfigError> {
    if let Some(family) = resolved.get(name) {
        return Ok(family.clone());
    }
    if visiting.iter().any(|v| v == name) {
        return Err(ConfigError::InheritanceCycle {
            family: name.into(),
        });
    }
    let Some(decl) = decls.get(name) else {
        return Err(ConfigError::UnknownParent {
            family: visiting.last().cloned().unwrap_or_default(),
            parent: name.into(),
        });
    };

    visiting.push(name.to_owned());
    let parent = match decl.parent.as_deref() {
        None | Some(BASE_FAMILY) => Family::base().clone(),
        Some(parent) => resolve(parent, decls, resolved, visiting)?,
    };
    visiting.pop();

    let family = Family::builder(name)
        .extends(&parent)
        .declared(decl.clone())
        .build()?;
    resolved.insert(name.to_owned(), family.clone());
    Ok(family)
}
