//! Arranged hierarchical records
//! -----------------------------
//! Output of a join tree: record id -> record. A record holds its own fields
//! and, when its join node has children, the joint data keyed by canonical
//! join id. Serializes to the nested mapping consumed by rendering layers:
//! `{ id: { field: value, ..., <joint key>: { join id: { ... } } } }`.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::JoinResult;
use crate::join::Join;
use crate::row::Row;

static EMPTY_RECORDS: Lazy<Records> = Lazy::new(Records::new);

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Records(IndexMap<String, Record>);

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fields: Row,
    pub joint: Option<JointData>,
}

/// Child records of one record, grouped by the child's canonical join id.
#[derive(Debug, Clone, PartialEq)]
pub struct JointData {
    pub key: String,
    pub joins: IndexMap<String, Records>,
}

impl Records {
    pub fn new() -> Self { Self(IndexMap::new()) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn get(&self, id: &str) -> Option<&Record> { self.0.get(id) }
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Record> { self.0.get_mut(id) }
    pub fn contains(&self, id: &str) -> bool { self.0.contains_key(id) }
    pub fn ids(&self) -> impl Iterator<Item = &str> { self.0.keys().map(|k| k.as_str()) }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> { self.0.iter().map(|(k, v)| (k.as_str(), v)) }

    /// Insert or replace the record stored under `id`.
    pub fn insert(&mut self, id: impl Into<String>, record: Record) { self.0.insert(id.into(), record); }

    /// Union merge: ids already present keep their existing record.
    pub fn merge_union(&mut self, other: Records) {
        for (id, rec) in other.0 {
            self.0.entry(id).or_insert(rec);
        }
    }

    /// Next positional id: one past the highest numeric id, or 0. When the
    /// highest id is `u64::MAX` the lowest unused numeric id is taken instead.
    pub fn next_positional_id(&self) -> String {
        let next = self
            .0
            .keys()
            .filter_map(|k| k.parse::<u64>().ok())
            .max()
            .map_or(Some(0), |m| m.checked_add(1));
        match next {
            Some(n) => n.to_string(),
            None => (0u64..)
                .map(|n| n.to_string())
                .find(|id| !self.0.contains_key(id))
                .unwrap_or_default(),
        }
    }

    /// Id of the first record whose fields equal `fields`, ignoring joint data.
    pub fn find_by_fields(&self, fields: &Row) -> Option<&str> {
        self.0.iter().find(|(_, rec)| rec.fields == *fields).map(|(id, _)| id.as_str())
    }

    pub fn to_value(&self) -> JoinResult<serde_json::Value> { Ok(serde_json::to_value(self)?) }
}

impl IntoIterator for Records {
    type Item = (String, Record);
    type IntoIter = indexmap::map::IntoIter<String, Record>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl Record {
    pub fn new(fields: Row) -> Self { Self { fields, joint: None } }

    pub fn with_joint(fields: Row, key: impl Into<String>) -> Self {
        Self { fields, joint: Some(JointData::new(key)) }
    }

    /// Child records for `join`, resolved loosely through `node` (the join
    /// node that produced this record). A declared join without data yields
    /// an empty set.
    pub fn joined<'a>(&'a self, node: &dyn Join, join: &str) -> JoinResult<&'a Records> {
        let id = node.get_join_id(join)?;
        Ok(self.joint.as_ref().and_then(|j| j.joins.get(&id)).unwrap_or(&*EMPTY_RECORDS))
    }
}

impl JointData {
    pub fn new(key: impl Into<String>) -> Self { Self { key: key.into(), joins: IndexMap::new() } }

    /// Bucket for `join_id`, created empty when missing.
    pub fn bucket(&mut self, join_id: &str) -> &mut Records {
        self.joins.entry(join_id.to_string()).or_default()
    }

    pub fn is_empty(&self) -> bool { self.joins.is_empty() }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.joint.is_some());
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        if let Some(joint) = &self.joint {
            map.serialize_entry(&joint.key, &joint.joins)?;
        }
        map.end()
    }
}
