//! Parsed analytics.txt documents

use indexmap::map::{IndexMap, Iter};
use serde::{Deserialize, Serialize};

/// Mapping of field name to its value list.
///
/// Fields keep the order in which they were first seen. Equality does not
/// depend on that order: two documents are equal when they hold the same
/// fields with the same value lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: IndexMap<String, Vec<String>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of a field, if present
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in document order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, Vec<String>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON representation handed to the schema evaluator
    pub fn to_value(&self) -> serde_json::Value {
        let object = self
            .fields
            .iter()
            .map(|(name, values)| {
                let values = values.iter().cloned().map(serde_json::Value::String).collect();
                (name.clone(), serde_json::Value::Array(values))
            })
            .collect();
        serde_json::Value::Object(object)
    }

    /// Insert a field, returning the previous values if it already existed
    pub(crate) fn insert(&mut self, name: String, values: Vec<String>) -> Option<Vec<String>> {
        self.fields.insert(name, values)
    }
}

impl<N, V> FromIterator<(N, V)> for Document
where
    N: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(name, values)| (name.into(), values.into_iter().map(Into::into).collect()))
            .collect();
        Self { fields }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
