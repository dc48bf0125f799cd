use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row as returned by the remote query API: field name to untyped value.
///
/// SuiteQL lowercases column labels in its JSON payload, so all lookups go
/// through [`RawRecord::get`], which falls back to a case-insensitive scan
/// when the exact key is absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(field) {
            return Some(value);
        }
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(field))
            .map(|(_, v)| v)
    }

    /// Reads a field as an unsigned integer. SuiteQL serializes most column
    /// values as strings, so numeric strings are accepted too.
    pub fn get_u64(&self, field: &str) -> Option<u64> {
        match self.get(field)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.get(field)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True when the field is absent, JSON null, or an empty string.
    pub fn is_missing(&self, field: &str) -> bool {
        match self.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl FromIterator<(String, Value)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
