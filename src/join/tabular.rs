//! Tabular joins
//! -------------
//! Arranges rows whose field names are tagged with their table, e.g. the
//! `T1st_T_ID`, `T2nd_T_ID` aliases of a SQL join. Each row is split once per
//! table and every node of the tree picks its own table's section, keyed by
//! the node's primary key fields. Tables without keys are identified by
//! position, de-duplicating rows whose values repeat.
//!
//! Rows are split by the root node only, so the separator and the
//! `require_all_tabular_fields` flag hold for the whole tree. Setting either
//! on a node applies it to the node's children, and a child whose options
//! differ from its parent's is rejected when joined.

use tracing::{debug, trace};

use super::{Join, Joins, DEFAULT_JOINT_KEY};
use crate::error::{JoinError, JoinResult};
use crate::records::{JointData, Record, Records};
use crate::row::{any_set, compose_id, Row, SplitRow};

pub const DEFAULT_SEPARATOR: &str = "_T_";
pub const DEFAULT_KEY: &str = "ID";

#[derive(Debug, Clone)]
pub struct Tabular {
    table: String,
    keys: Vec<String>,
    joint_key: String,
    separator: String,
    require_all_tabular_fields: bool,
    joins: Joins<Tabular>,
}

impl Tabular {
    /// A node for `table` keyed by `ID`, with default joint key and separator.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            keys: vec![DEFAULT_KEY.to_string()],
            joint_key: DEFAULT_JOINT_KEY.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            require_all_tabular_fields: true,
            joins: Joins::new(true),
        }
    }

    /// Primary key fields, in identifier order. An empty list switches the
    /// node to positional identifiers.
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_joint_key(mut self, joint_key: impl Into<String>) -> Self { self.joint_key = joint_key.into(); self }

    /// Separator between table and field in tagged field names, for this node
    /// and all its children.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        let require = self.require_all_tabular_fields;
        self.set_split_options(&separator, require);
        self
    }

    /// When false, fields that do not carry a table tag are dropped instead of
    /// failing the arrangement. Applies to all children.
    pub fn require_all_tabular_fields(mut self, require: bool) -> Self {
        let separator = self.separator.clone();
        self.set_split_options(&separator, require);
        self
    }

    fn set_split_options(&mut self, separator: &str, require: bool) {
        self.separator = separator.to_string();
        self.require_all_tabular_fields = require;
        for child in self.joins.children_mut() {
            child.set_split_options(separator, require);
        }
    }

    pub fn with_alpha_num_match(mut self, on: bool) -> JoinResult<Self> {
        self.joins.set_use_alpha_num_match(on)?;
        Ok(self)
    }

    pub fn with_join(mut self, join_id: impl Into<String>, child: Tabular) -> JoinResult<Self> {
        self.add_join(join_id, child)?;
        Ok(self)
    }

    /// Register `child`. Its split options must match this node's, since
    /// only the root splits rows.
    pub fn add_join(&mut self, join_id: impl Into<String>, child: Tabular) -> JoinResult<()> {
        if child.separator != self.separator || child.require_all_tabular_fields != self.require_all_tabular_fields {
            return Err(JoinError::config(format!(
                "table '{}' splits with separator '{}' (require all: {}) but parent table '{}' splits with '{}' (require all: {})",
                child.table, child.separator, child.require_all_tabular_fields,
                self.table, self.separator, self.require_all_tabular_fields
            )));
        }
        self.joins.add_join(join_id, child)
    }

    pub fn table(&self) -> &str { &self.table }
    pub fn keys(&self) -> &[String] { &self.keys }
    pub fn separator(&self) -> &str { &self.separator }
    pub fn requires_all_tabular_fields(&self) -> bool { self.require_all_tabular_fields }
    pub fn joins(&self) -> &Joins<Tabular> { &self.joins }

    /// Partition a flat row by table. Every field name must contain the
    /// separator exactly once: `<table><separator><field>`.
    pub fn split_result(&self, row: &Row) -> JoinResult<SplitRow> {
        if self.separator.is_empty() {
            return Err(JoinError::config(format!("table '{}' has an empty separator", self.table)));
        }
        let mut split = SplitRow::new();
        for (name, value) in row {
            let parts: Vec<&str> = name.split(self.separator.as_str()).collect();
            if parts.len() != 2 {
                if self.require_all_tabular_fields {
                    return Err(JoinError::unsplittable(name.as_str(), self.separator.as_str()));
                }
                trace!(target: "joinery::join", "dropping untagged field '{}'", name);
                continue;
            }
            split.entry(parts[0].to_string()).or_default().insert(parts[1].to_string(), value.clone());
        }
        Ok(split)
    }

    /// Arrange already split rows into `data`, which may hold records from
    /// earlier rows. Children receive one split row at a time so records they
    /// accumulate across rows for the same parent stay together.
    ///
    /// On error `data` keeps whatever was arranged before the failing row,
    /// including that row's parent record; callers should discard it.
    pub fn arrange_split_results(&self, split_rows: &[SplitRow], data: &mut Records) -> JoinResult<()> {
        for split in split_rows {
            let Some(section) = split.get(&self.table) else {
                trace!(target: "joinery::join", "table '{}' absent from row", self.table);
                continue;
            };
            // Outer join placeholder: no field of this table is set.
            if !any_set(section) {
                trace!(target: "joinery::join", "table '{}' has no data in row", self.table);
                continue;
            }

            let id = self.record_id(section, data)?;
            if !data.contains(&id) {
                let fields = self.stored_fields(section);
                let record = if self.joins.is_empty() { Record::new(fields) } else { Record::with_joint(fields, &self.joint_key) };
                data.insert(id.clone(), record);
            }
            if self.joins.is_empty() {
                continue;
            }

            let Some(record) = data.get_mut(&id) else { continue };
            let joint = record.joint.get_or_insert_with(|| JointData::new(&self.joint_key));
            for (join_id, child) in self.joins.iter() {
                child.arrange_split_results(std::slice::from_ref(split), joint.bucket(join_id))?;
            }
        }
        Ok(())
    }

    fn record_id(&self, section: &Row, data: &Records) -> JoinResult<String> {
        if self.keys.is_empty() {
            return Ok(match data.find_by_fields(section) {
                Some(id) => id.to_string(),
                None => data.next_positional_id(),
            });
        }
        if let Some(missing) = self.keys.iter().find(|k| !section.contains_key(k.as_str())) {
            return Err(JoinError::missing_key(missing.as_str(), self.table.as_str()));
        }
        Ok(compose_id(section, &self.keys))
    }

    fn stored_fields(&self, section: &Row) -> Row {
        section
            .iter()
            .filter(|(k, _)| !self.keys.iter().any(|key| key == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Join for Tabular {
    fn arrange_flat_data(&self, rows: &[Row]) -> JoinResult<Records> {
        let split_rows = rows.iter().map(|r| self.split_result(r)).collect::<JoinResult<Vec<_>>>()?;
        let mut data = Records::new();
        self.arrange_split_results(&split_rows, &mut data)?;
        debug!(target: "joinery::join", "tabular '{}': arranged {} rows into {} records", self.table, rows.len(), data.len());
        Ok(data)
    }

    fn get_join_id(&self, join: &str) -> JoinResult<String> { self.joins.get_join_id(join) }
    fn join_ids(&self) -> Vec<&str> { self.joins.ids() }
    fn joint_key(&self) -> &str { &self.joint_key }
    fn use_alpha_num_match(&self) -> bool { self.joins.use_alpha_num_match() }
}

#[cfg(test)]
#[path = "tabular_tests.rs"]
mod tabular_tests;
