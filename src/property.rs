//! `property` contains the [`PropertyValue`] type that every block property map is made of.

use std::{collections::BTreeMap, fmt};

/// Named block properties, sorted by key.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single block property value.
///
/// Booleans are always exposed naturally here, the inverted `true -> 0` convention
/// only lives inside the state id math in [`codec`](crate::codec).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl PropertyValue {
    /// Reads a catalog value, integers become [`PropertyValue::Int`], everything else stays a string
    pub fn parse(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(i) => PropertyValue::Int(i),
            Err(_) => PropertyValue::Str(value.to_owned()),
        }
    }

    /// Truthiness of the value, `"true"`/`"false"` strings and non-zero integers included
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::Int(i) => Some(*i != 0),
            PropertyValue::Str(s) if s == "true" => Some(true),
            PropertyValue::Str(s) if s == "false" => Some(false),
            PropertyValue::Str(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            PropertyValue::Str(s) => s.parse().ok(),
            PropertyValue::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s) => write!(f, "{s}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // json-ish so error messages read like the property maps they came from
        match self {
            PropertyValue::Str(s) => write!(f, "{s:?}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<&serde_json::Value> for PropertyValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => PropertyValue::Bool(*b),
            serde_json::Value::Number(n) => PropertyValue::Int(n.as_i64().unwrap_or_default()),
            serde_json::Value::String(s) => PropertyValue::Str(s.clone()),
            other => PropertyValue::Str(other.to_string()),
        }
    }
}

/// Builds a [`Properties`] map from key/value pairs.
///
/// ## Example
/// ```no_run
/// let props = properties([("lit", "true"), ("candles", "2")]);
/// ```
pub fn properties<K, V, I>(pairs: I) -> Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Joins the properties into the `key=value,key=value` form used by the legacy catalog
pub fn to_state_string(properties: &Properties) -> String {
    properties
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<String>>()
        .join(",")
}

/// Parses a `key=value,key=value` state string, integer values become [`PropertyValue::Int`]
pub fn parse_state_string(state: &str) -> Properties {
    state
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| match s.split_once('=') {
            Some((k, v)) => (k.to_owned(), PropertyValue::parse(v)),
            None => (s.to_owned(), PropertyValue::Str(String::new())),
        })
        .collect()
}

/// Checks `properties` against a filter like `facing=north|south,half=top`.
///
/// Keys in `properties` that the filter doesn't mention are ignored,
/// every mentioned key has to equal one of its `|` separated alternatives.
pub fn matches_filter(properties: &Properties, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }

    let filter: BTreeMap<&str, &str> = filter
        .split(',')
        .filter_map(|entry| entry.split_once('='))
        .collect();

    properties.iter().all(|(key, value)| match filter.get(key.as_str()) {
        None => true,
        Some(allowed) => {
            let value = value.to_string();
            allowed.split('|').any(|alt| alt == value)
        }
    })
}

/// Like [`matches_filter`] but with a list of filters, any one of them matching is enough.
/// An empty list matches nothing.
pub fn matches_any_filter(properties: &Properties, filters: &[&str]) -> bool {
    filters.iter().any(|filter| matches_filter(properties, filter))
}
