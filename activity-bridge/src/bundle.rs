use std::collections::HashMap;

/// A value stored in a [`Bundle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleValue {
    Bool(bool),
    Int(i32),
    String(String),
    StringList(Vec<String>),
}

impl From<bool> for BundleValue {
    fn from(value: bool) -> Self {
        BundleValue::Bool(value)
    }
}

impl From<i32> for BundleValue {
    fn from(value: i32) -> Self {
        BundleValue::Int(value)
    }
}

impl From<&str> for BundleValue {
    fn from(value: &str) -> Self {
        BundleValue::String(value.to_owned())
    }
}

impl From<String> for BundleValue {
    fn from(value: String) -> Self {
        BundleValue::String(value)
    }
}

impl From<Vec<String>> for BundleValue {
    fn from(value: Vec<String>) -> Self {
        BundleValue::StringList(value)
    }
}

impl From<&[&str]> for BundleValue {
    fn from(value: &[&str]) -> Self {
        BundleValue::StringList(value.iter().map(|s| (*s).to_owned()).collect())
    }
}

/// A typed key/value map, mirroring the subset of `android.os.Bundle` this
/// crate reads and writes
///
/// A key may be present with no value (a Java `null`), which is different
/// from the key being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    entries: HashMap<String, Option<BundleValue>>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<BundleValue>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    pub fn insert_null(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), None);
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<BundleValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&BundleValue> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(BundleValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key) {
            Some(BundleValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(BundleValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_string_list(&self, key: &str) -> Option<&[String]> {
        match self.get(key) {
            Some(BundleValue::StringList(value)) => Some(value),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&BundleValue>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
