//! Join trees
//! ----------
//! A join node describes how one level of a hierarchical record set is
//! recovered from flat rows; its children describe the levels below it. Both
//! node kinds share the child registry (`Joins`) and its name resolution:
//! exact ids always resolve, and when alpha-numeric matching is enabled a
//! caller may also use any spelling that normalizes to the same key
//! (`exactMatch` finds `Exact_Match`).

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{JoinError, JoinResult};
use crate::records::Records;
use crate::row::Row;

pub mod columnar;
pub mod tabular;

pub use columnar::Columnar;
pub use tabular::Tabular;

pub const DEFAULT_JOINT_KEY: &str = "Joint_Data";

/// Behaviour shared by every join node. Arrangement never mutates the tree, so
/// one tree may serve concurrent callers.
pub trait Join: Send + Sync + std::fmt::Debug {
    /// Arrange flat rows into records keyed by this node's identifiers.
    fn arrange_flat_data(&self, rows: &[Row]) -> JoinResult<Records>;

    /// Resolve a caller-supplied name to the canonical child join id.
    fn get_join_id(&self, join: &str) -> JoinResult<String>;

    /// Canonical ids of the registered children, in registration order.
    fn join_ids(&self) -> Vec<&str>;

    /// Field name under which a record's child data is stored.
    fn joint_key(&self) -> &str;

    fn use_alpha_num_match(&self) -> bool;
}

impl<T: Join + ?Sized> Join for Box<T> {
    fn arrange_flat_data(&self, rows: &[Row]) -> JoinResult<Records> { (**self).arrange_flat_data(rows) }
    fn get_join_id(&self, join: &str) -> JoinResult<String> { (**self).get_join_id(join) }
    fn join_ids(&self) -> Vec<&str> { (**self).join_ids() }
    fn joint_key(&self) -> &str { (**self).joint_key() }
    fn use_alpha_num_match(&self) -> bool { (**self).use_alpha_num_match() }
}

/// Loose join key: ASCII lower-cased with every character outside
/// `[A-Za-z0-9]` removed.
pub fn normalize_join_id(join_id: &str) -> String {
    join_id.chars().filter(|c| c.is_ascii_alphanumeric()).map(|c| c.to_ascii_lowercase()).collect()
}

/// Child registry of a join node, keyed by canonical join id.
#[derive(Debug, Clone)]
pub struct Joins<J> {
    use_alpha_num_match: bool,
    children: IndexMap<String, J>,
    /// normalized key -> canonical id; only maintained with alpha-num matching
    loose: IndexMap<String, String>,
}

impl<J> Joins<J> {
    pub fn new(use_alpha_num_match: bool) -> Self {
        Self { use_alpha_num_match, children: IndexMap::new(), loose: IndexMap::new() }
    }

    pub fn use_alpha_num_match(&self) -> bool { self.use_alpha_num_match }

    /// Switch alpha-numeric matching, rebuilding the loose index over the
    /// children already registered. Fails, leaving the registry unchanged, if
    /// enabling it would make two existing ids ambiguous.
    pub fn set_use_alpha_num_match(&mut self, on: bool) -> JoinResult<()> {
        let mut loose: IndexMap<String, String> = IndexMap::new();
        if on {
            for id in self.children.keys() {
                let key = normalize_join_id(id);
                if let Some(existing) = loose.get(&key) {
                    return Err(JoinError::ambiguous(id.clone(), existing.clone()));
                }
                loose.insert(key, id.clone());
            }
        }
        self.loose = loose;
        self.use_alpha_num_match = on;
        Ok(())
    }

    /// Register `child` under the exact `join_id`. Fails without registering
    /// when the id (or, with alpha-num matching, its loose key) is taken.
    pub fn add_join(&mut self, join_id: impl Into<String>, child: J) -> JoinResult<()> {
        let join_id = join_id.into();
        if self.children.contains_key(&join_id) {
            warn!(target: "joinery::join", "rejecting duplicate join '{}'", join_id);
            return Err(JoinError::ambiguous(join_id.clone(), join_id));
        }
        if self.use_alpha_num_match {
            let key = normalize_join_id(&join_id);
            if let Some(existing) = self.loose.get(&key) {
                warn!(target: "joinery::join", "rejecting join '{}': loose key '{}' already used by '{}'", join_id, key, existing);
                return Err(JoinError::ambiguous(join_id, existing.clone()));
            }
            self.loose.insert(key, join_id.clone());
        }
        debug!(target: "joinery::join", "registered join '{}'", join_id);
        self.children.insert(join_id, child);
        Ok(())
    }

    pub fn get_join_id(&self, join: &str) -> JoinResult<String> {
        if self.children.contains_key(join) {
            return Ok(join.to_string());
        }
        if self.use_alpha_num_match {
            if let Some(id) = self.loose.get(&normalize_join_id(join)) {
                return Ok(id.clone());
            }
        }
        Err(JoinError::not_found(join))
    }

    /// Child registered under the id `join` resolves to.
    pub fn get_join(&self, join: &str) -> JoinResult<&J> {
        let id = self.get_join_id(join)?;
        self.children.get(&id).ok_or_else(|| JoinError::not_found(join))
    }

    pub fn get_joins(&self) -> &IndexMap<String, J> { &self.children }

    pub fn ids(&self) -> Vec<&str> { self.children.keys().map(|k| k.as_str()).collect() }

    pub fn is_empty(&self) -> bool { self.children.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &J)> { self.children.iter().map(|(k, v)| (k.as_str(), v)) }

    pub(crate) fn children_mut(&mut self) -> impl Iterator<Item = &mut J> { self.children.values_mut() }
}

#[cfg(test)]
#[path = "join_tests.rs"]
mod join_tests;
