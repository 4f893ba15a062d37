//! Columnar joins
//! --------------
//! Arranges rows as they come, without table tags: a node keeps its declared
//! value columns and identifies records by its key columns. Children may be
//! of any join kind and see the whole row.

use tracing::{debug, trace};

use super::{Join, Joins, DEFAULT_JOINT_KEY};
use crate::error::JoinResult;
use crate::records::{JointData, Record, Records};
use crate::row::{any_set, compose_id, Row};

pub const DEFAULT_KEY: &str = "ID";

#[derive(Debug)]
pub struct Columnar {
    fields: Vec<String>,
    keys: Vec<String>,
    joint_key: String,
    joins: Joins<Box<dyn Join>>,
}

impl Columnar {
    /// A node keeping `fields`, keyed by `ID`.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            keys: vec![DEFAULT_KEY.to_string()],
            joint_key: DEFAULT_JOINT_KEY.to_string(),
            joins: Joins::new(true),
        }
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_joint_key(mut self, joint_key: impl Into<String>) -> Self { self.joint_key = joint_key.into(); self }

    pub fn with_alpha_num_match(mut self, on: bool) -> JoinResult<Self> {
        self.joins.set_use_alpha_num_match(on)?;
        Ok(self)
    }

    pub fn with_join(mut self, join_id: impl Into<String>, child: impl Join + 'static) -> JoinResult<Self> {
        self.add_join(join_id, Box::new(child))?;
        Ok(self)
    }

    pub fn add_join(&mut self, join_id: impl Into<String>, child: Box<dyn Join>) -> JoinResult<()> {
        self.joins.add_join(join_id, child)
    }

    pub fn fields(&self) -> &[String] { &self.fields }
    pub fn keys(&self) -> &[String] { &self.keys }
    pub fn joins(&self) -> &Joins<Box<dyn Join>> { &self.joins }

    fn project(&self, row: &Row) -> Row {
        row.iter()
            .filter(|(k, _)| self.fields.iter().any(|f| f == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Join for Columnar {
    fn arrange_flat_data(&self, rows: &[Row]) -> JoinResult<Records> {
        let mut data = Records::new();
        for row in rows {
            let id = compose_id(row, &self.keys);
            if id.is_empty() {
                trace!(target: "joinery::join", "skipping row without identifier {:?}", self.keys);
                continue;
            }
            if !data.contains(&id) {
                let projected = self.project(row);
                // Outer join placeholder: nothing for this level.
                if !any_set(&projected) {
                    trace!(target: "joinery::join", "skipping row '{}' with no values", id);
                    continue;
                }
                data.insert(id.clone(), Record::new(projected));
            }
            if self.joins.is_empty() {
                continue;
            }

            let Some(record) = data.get_mut(&id) else { continue };
            for (join_id, child) in self.joins.iter() {
                let child_data = child.arrange_flat_data(std::slice::from_ref(row))?;
                if child_data.is_empty() {
                    continue;
                }
                // Child ids seen on an earlier row keep their first data.
                record
                    .joint
                    .get_or_insert_with(|| JointData::new(&self.joint_key))
                    .bucket(join_id)
                    .merge_union(child_data);
            }
        }
        debug!(target: "joinery::join", "columnar {:?}: arranged {} rows into {} records", self.keys, rows.len(), data.len());
        Ok(data)
    }

    fn get_join_id(&self, join: &str) -> JoinResult<String> { self.joins.get_join_id(join) }
    fn join_ids(&self) -> Vec<&str> { self.joins.ids() }
    fn joint_key(&self) -> &str { &self.joint_key }
    fn use_alpha_num_match(&self) -> bool { self.joins.use_alpha_num_match() }
}

#[cfg(test)]
#[path = "columnar_tests.rs"]
mod columnar_tests;
