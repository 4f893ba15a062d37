//! Declarative join-tree configuration
//! -----------------------------------
//! Join trees are usually assembled in code, but may also be described in
//! JSON and built once at startup:
//!
//! ```json
//! { "kind": "tabular", "table": "T1st", "keys": ["ID"],
//!   "joins": { "List": { "kind": "tabular", "table": "T2nd" } } }
//! ```
//!
//! Omitted fields take the same defaults as the builders.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{JoinError, JoinResult};
use crate::join::{Columnar, Join, Tabular};

/// Environment variable naming a join spec file when no path is given.
pub const JOIN_SPEC_ENV: &str = "JOINERY_JOIN_SPEC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JoinSpec {
    Tabular(TabularSpec),
    Columnar(ColumnarSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularSpec {
    pub table: String,
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub joint_key: Option<String>,
    #[serde(default)]
    pub separator: Option<String>,
    #[serde(default)]
    pub require_all_tabular_fields: Option<bool>,
    #[serde(default)]
    pub use_alpha_num_match: Option<bool>,
    #[serde(default)]
    pub joins: IndexMap<String, JoinSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnarSpec {
    pub fields: Vec<String>,
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub joint_key: Option<String>,
    #[serde(default)]
    pub use_alpha_num_match: Option<bool>,
    #[serde(default)]
    pub joins: IndexMap<String, JoinSpec>,
}

impl JoinSpec {
    pub fn from_json(text: &str) -> JoinResult<Self> { Ok(serde_json::from_str(text)?) }

    pub fn build(&self) -> JoinResult<Box<dyn Join>> {
        match self {
            JoinSpec::Tabular(t) => Ok(Box::new(t.build()?)),
            JoinSpec::Columnar(c) => Ok(Box::new(c.build()?)),
        }
    }
}

impl TabularSpec {
    pub fn build(&self) -> JoinResult<Tabular> { self.build_under(None) }

    /// Nested tabular specs inherit the separator and field strictness of the
    /// table they join; setting a different value is a config error.
    fn build_under(&self, parent: Option<&Tabular>) -> JoinResult<Tabular> {
        let mut join = Tabular::new(self.table.as_str());
        if let Some(keys) = &self.keys { join = join.with_keys(keys.iter().cloned()); }
        if let Some(k) = &self.joint_key { join = join.with_joint_key(k.as_str()); }
        match parent {
            None => {
                if let Some(s) = &self.separator { join = join.with_separator(s.as_str()); }
                if let Some(r) = self.require_all_tabular_fields { join = join.require_all_tabular_fields(r); }
            }
            Some(p) => {
                if let Some(s) = self.separator.as_deref().filter(|s| *s != p.separator()) {
                    return Err(JoinError::config(format!(
                        "table '{}' sets separator '{}' but is joined under table '{}' which splits with '{}'",
                        self.table, s, p.table(), p.separator()
                    )));
                }
                if let Some(r) = self.require_all_tabular_fields.filter(|r| *r != p.requires_all_tabular_fields()) {
                    return Err(JoinError::config(format!(
                        "table '{}' sets require_all_tabular_fields={} but is joined under table '{}' which uses {}",
                        self.table, r, p.table(), p.requires_all_tabular_fields()
                    )));
                }
                join = join.with_separator(p.separator()).require_all_tabular_fields(p.requires_all_tabular_fields());
            }
        }
        if let Some(a) = self.use_alpha_num_match { join = join.with_alpha_num_match(a)?; }
        for (id, child) in &self.joins {
            let JoinSpec::Tabular(child) = child else {
                return Err(JoinError::config(format!(
                    "join '{}' under tabular table '{}' must be tabular", id, self.table
                )));
            };
            let child = child.build_under(Some(&join))?;
            join.add_join(id.as_str(), child)?;
        }
        debug!(target: "joinery::config", "built tabular join '{}' with {} children", self.table, self.joins.len());
        Ok(join)
    }
}

impl ColumnarSpec {
    pub fn build(&self) -> JoinResult<Columnar> {
        let mut join = Columnar::new(self.fields.iter().cloned());
        if let Some(keys) = &self.keys { join = join.with_keys(keys.iter().cloned()); }
        if let Some(k) = &self.joint_key { join = join.with_joint_key(k.as_str()); }
        if let Some(a) = self.use_alpha_num_match { join = join.with_alpha_num_match(a)?; }
        for (id, child) in &self.joins {
            join.add_join(id.as_str(), child.build()?)?;
        }
        debug!(target: "joinery::config", "built columnar join {:?} with {} children", self.fields, self.joins.len());
        Ok(join)
    }
}

/// Read and build a join tree from a JSON file.
pub fn load_join_spec(path: &Path) -> JoinResult<Box<dyn Join>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| JoinError::Io { message: format!("{}: {}", path.display(), e) })?;
    JoinSpec::from_json(&text)?.build()
}
