//! Equality filters for find operations

use bson::{spec::BinarySubtype, Binary, Bson, Document as BsonDocument};

/// A filter value, tagged with its kind at the call site
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    String(String),
}

impl FilterValue {
    /// Converts the value into its native BSON representation
    pub fn to_bson(&self) -> Bson {
        match self {
            FilterValue::Int(i) => Bson::Int64(*i),
            FilterValue::Double(d) => Bson::Double(*d),
            FilterValue::Bool(b) => Bson::Boolean(*b),
            FilterValue::Bytes(bytes) => Bson::Binary(Binary {
                subtype: BinarySubtype::Generic,
                bytes: bytes.clone(),
            }),
            FilterValue::String(s) => Bson::String(s.clone()),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v.into())
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Double(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<Vec<u8>> for FilterValue {
    fn from(v: Vec<u8>) -> Self {
        FilterValue::Bytes(v)
    }
}

impl From<&[u8]> for FilterValue {
    fn from(v: &[u8]) -> Self {
        FilterValue::Bytes(v.to_vec())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::String(v.to_string())
    }
}

/// Key/value equality filter, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, FilterValue)>,
}

impl Filter {
    /// Create an empty filter (matches every document)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition
    pub fn equals(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Add an equality condition in place. A repeated key replaces the earlier value.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        match self.conditions.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.conditions.push((key, value)),
        }
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True if the filter has no conditions
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterate over the conditions
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Translate into the driver's filter document
    pub fn to_document(&self) -> BsonDocument {
        let mut doc = BsonDocument::new();
        for (key, value) in &self.conditions {
            doc.insert(key.clone(), value.to_bson());
        }
        doc
    }
}

impl<K, V> FromIterator<(K, V)> for Filter
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (k, v) in iter {
            filter.push(k, v);
        }
        filter
    }
}
