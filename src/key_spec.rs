//! Upsert configuration.
//!
//! A [`KeySpec`] names the key column used to locate rows, the record field
//! compared against it, the case policy, how new columns are placed, and what to
//! do with records that carry no comparison value. It can be built in code, from
//! CLI flags, or loaded from a YAML file:
//!
//! ```yaml
//! key_column: id
//! comparison_field: id
//! case_sensitive: false
//! growth:
//!   mode: adjacent
//!   anchor: name
//! on_missing_key: skip
//! ```

use std::{borrow::Cow, iter, path::Path};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::yaml_provider;

/// Placement of columns introduced by incoming records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColumnGrowth {
    /// New columns go at the end of the header.
    #[default]
    Append,
    /// New columns are inserted directly after `anchor`, in discovery order.
    Adjacent { anchor: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum MissingKeyPolicy {
    /// Stop the batch at the first record without a comparison value.
    #[default]
    Abort,
    /// Leave the record out and keep going.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpec {
    pub key_column: String,
    pub comparison_field: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub growth: ColumnGrowth,
    #[serde(default)]
    pub on_missing_key: MissingKeyPolicy,
}

impl KeySpec {
    /// Key column and comparison field share one name, everything else defaults.
    pub fn new(key_column: impl Into<String>) -> Self {
        let key_column = key_column.into();
        KeySpec {
            comparison_field: key_column.clone(),
            key_column,
            case_sensitive: false,
            growth: ColumnGrowth::Append,
            on_missing_key: MissingKeyPolicy::Abort,
        }
    }

    pub fn with_comparison_field(mut self, field: impl Into<String>) -> Self {
        self.comparison_field = field.into();
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_growth(mut self, growth: ColumnGrowth) -> Self {
        self.growth = growth;
        self
    }

    pub fn adjacent_to(self, anchor: impl Into<String>) -> Self {
        self.with_growth(ColumnGrowth::Adjacent {
            anchor: anchor.into(),
        })
    }

    pub fn on_missing_key(mut self, policy: MissingKeyPolicy) -> Self {
        self.on_missing_key = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_column.trim().is_empty() {
            return Err(anyhow!("Key column name cannot be empty"));
        }
        if self.comparison_field.trim().is_empty() {
            return Err(anyhow!("Comparison field name cannot be empty"));
        }
        if matches!(&self.growth, ColumnGrowth::Adjacent { anchor } if anchor.trim().is_empty()) {
            return Err(anyhow!("Adjacent column growth requires an anchor column"));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let spec: KeySpec = yaml_provider::load_from_path(path)
            .with_context(|| format!("Parsing key spec YAML {path:?}"))?;
        spec.validate()
            .with_context(|| format!("Validating key spec {path:?}"))?;
        Ok(spec)
    }
}

/// Folds `value` for comparison; original casing is never stored folded.
pub fn normalize(value: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive || value.chars().all(|c| c.to_lowercase().eq(iter::once(c))) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.to_lowercase())
    }
}
