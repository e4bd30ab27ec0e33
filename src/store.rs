use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::data::document::CanonicalDocument;
use crate::errors::Result;

/// Append-only destination for shaped documents.
pub trait DocumentSink {
    fn insert_one(&mut self, document: &CanonicalDocument) -> Result<()>;

    fn insert_many(&mut self, documents: &[CanonicalDocument]) -> Result<()> {
        for document in documents {
            self.insert_one(document)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: usize,
}

/// Schema-less in-memory document store. Documents are kept as JSON values, so
/// queries address fields by dotted path (`created.user`, `address.city`).
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<Value>,
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |value, part| value.get(part))
}

fn group_key(value: &Value) -> String {
    match value {
        Value::String(string) => string.clone(),
        other => other.to_string(),
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn drop_all(&mut self) {
        self.documents.clear();
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn count_where(&self, path: &str, expected: &str) -> usize {
        self.documents.iter()
            .filter(|doc| lookup(doc, path).is_some_and(|value| value.as_str() == Some(expected)))
            .count()
    }

    pub fn find_one(&self) -> Option<&Value> {
        self.documents.first()
    }

    /// Documents having `path`, grouped by its value. Largest groups first, ties by id.
    pub fn group_count(&self, path: &str) -> Vec<GroupCount> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for value in self.documents.iter().filter_map(|doc| lookup(doc, path)) {
            *counts.entry(group_key(value)).or_insert(0) += 1;
        }
        let mut groups: Vec<GroupCount> = counts.into_iter()
            .map(|(id, count)| GroupCount { id, count })
            .collect();
        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
        groups
    }
}

impl DocumentSink for MemoryStore {
    fn insert_one(&mut self, document: &CanonicalDocument) -> Result<()> {
        self.documents.push(serde_json::to_value(document)?);
        Ok(())
    }
}
