// src/layout/types.rs

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column order the raw school export arrives in.
pub const SOURCE_COLUMNS: [&str; 11] = [
    "name",
    "ppd",
    "level",
    "category",
    "code",
    "address",
    "postcode",
    "city",
    "state",
    "longitude",
    "latitude",
];

/// Canonical column order expected by the upload.
pub const TARGET_COLUMNS: [&str; 11] = [
    "code",
    "name",
    "level",
    "category",
    "state",
    "ppd",
    "address",
    "postcode",
    "city",
    "longitude",
    "latitude",
];

/// An ordered list of column names; index `i` names the field at position `i`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
#[serde(transparent)]
pub struct ColumnLayout {
    columns: Vec<String>,
}

impl ColumnLayout {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn source() -> Self {
        Self::new(SOURCE_COLUMNS)
    }

    pub fn target() -> Self {
        Self::new(TARGET_COLUMNS)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// First index of `name`, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`position`](Self::position) but a missing name is an error.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| anyhow!("column '{}' not found in layout {:?}", name, self.columns))
    }

    /// For every column of `self`, its index within `target`.
    ///
    /// `result[p]` is where the field at source position `p` lands.
    pub fn destinations_in(&self, target: &ColumnLayout) -> Result<Vec<usize>> {
        self.columns
            .iter()
            .map(|name| target.index_of(name))
            .collect()
    }

    /// Names that appear more than once, in first-seen order.
    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for name in &self.columns {
            if !seen.insert(name.as_str()) && !dups.contains(&name.as_str()) {
                dups.push(name.as_str());
            }
        }
        dups
    }
}
