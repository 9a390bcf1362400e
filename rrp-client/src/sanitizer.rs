//! Normalization of values received from the WebApi endpoint
//!
//! JSON has no date type and the server serializer wraps typed collections
//! as `{"$type": ..., "$values": [...]}`. [`sanitize`] turns both quirks into
//! native values: wrapped collections are replaced by their values and
//! ISO-8601 date-time strings with a timezone marker become
//! [`chrono::DateTime`] values.
//!
//! Sanitized data is held in [`WebValue`], a JSON value with an extra
//! `DateTime` variant. Serializing a `WebValue` writes dates back as RFC 3339
//! strings, so typed payloads can still be deserialized with serde.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use tracing::trace;

/// Member name of the wrapped-collection convention
pub const VALUES_KEY: &str = "$values";

/// Date-time strings as delivered by the server: seconds precision, up to
/// three fractional digits and a mandatory `Z` or `±hh:mm` suffix.
static DATE_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]{1,3})?(Z|[+-][0-9]{2}:[0-9]{2})$")
        .expect("date-time pattern is a valid regex")
});

/// A decoded JSON value that may additionally hold a parsed date-time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WebValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Array(Vec<WebValue>),
    Object(BTreeMap<String, WebValue>),
}

impl WebValue {
    /// An empty object
    pub fn object() -> Self {
        WebValue::Object(BTreeMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WebValue::Null)
    }

    /// JavaScript-style falsiness: null, false, zero and the empty string.
    pub fn is_falsy(&self) -> bool {
        match self {
            WebValue::Null => true,
            WebValue::Bool(b) => !b,
            WebValue::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
            WebValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WebValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WebValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            WebValue::DateTime(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<WebValue>> {
        match self {
            WebValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, WebValue>> {
        match self {
            WebValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, WebValue>> {
        match self {
            WebValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Member of an object, `None` for other values
    pub fn get(&self, key: &str) -> Option<&WebValue> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Remove and return a member of an object
    pub fn take(&mut self, key: &str) -> Option<WebValue> {
        self.as_object_mut().and_then(|o| o.remove(key))
    }

    /// Set a member, turning the value into an object first if it is not one
    pub fn insert(&mut self, key: impl Into<String>, value: WebValue) {
        if !matches!(self, WebValue::Object(_)) {
            *self = WebValue::object();
        }
        if let WebValue::Object(o) = self {
            o.insert(key.into(), value);
        }
    }

    /// Convert back into plain JSON; dates become RFC 3339 strings.
    pub fn into_json(self) -> Value {
        match self {
            WebValue::Null => Value::Null,
            WebValue::Bool(b) => Value::Bool(b),
            WebValue::Number(n) => Value::Number(n),
            WebValue::String(s) => Value::String(s),
            WebValue::DateTime(d) => Value::String(format_date_time(&d)),
            WebValue::Array(a) => Value::Array(a.into_iter().map(WebValue::into_json).collect()),
            WebValue::Object(o) => {
                Value::Object(o.into_iter().map(|(k, v)| (k, v.into_json())).collect())
            }
        }
    }
}

fn format_date_time(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl From<Value> for WebValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => WebValue::Null,
            Value::Bool(b) => WebValue::Bool(b),
            Value::Number(n) => WebValue::Number(n),
            Value::String(s) => WebValue::String(s),
            Value::Array(a) => WebValue::Array(a.into_iter().map(WebValue::from).collect()),
            Value::Object(o) => {
                WebValue::Object(o.into_iter().map(|(k, v)| (k, WebValue::from(v))).collect())
            }
        }
    }
}

impl From<WebValue> for Value {
    fn from(value: WebValue) -> Self {
        value.into_json()
    }
}

impl From<&str> for WebValue {
    fn from(value: &str) -> Self {
        WebValue::String(value.to_string())
    }
}

impl From<String> for WebValue {
    fn from(value: String) -> Self {
        WebValue::String(value)
    }
}

impl From<bool> for WebValue {
    fn from(value: bool) -> Self {
        WebValue::Bool(value)
    }
}

impl From<DateTime<FixedOffset>> for WebValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        WebValue::DateTime(value)
    }
}

impl Serialize for WebValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WebValue::Null => serializer.serialize_unit(),
            WebValue::Bool(b) => serializer.serialize_bool(*b),
            WebValue::Number(n) => n.serialize(serializer),
            WebValue::String(s) => serializer.serialize_str(s),
            WebValue::DateTime(d) => serializer.serialize_str(&format_date_time(d)),
            WebValue::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for item in a {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            WebValue::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (k, v) in o {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for WebValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(WebValue::from)
    }
}

/// Normalize a value received from the WebApi endpoint.
///
/// Wrapped collections are unwrapped before date detection and recursion, so
/// a wrapped array of date strings yields an array of dates. Applying
/// `sanitize` to its own output changes nothing.
pub fn sanitize(value: WebValue) -> WebValue {
    if value.is_falsy() {
        return value;
    }

    let mut value = unwrap_values(value);

    let date = match &value {
        WebValue::String(s) => parse_date_time(s),
        _ => None,
    };
    if let Some(date) = date {
        value = WebValue::DateTime(date);
    }

    match &mut value {
        WebValue::Array(items) => {
            for item in items.iter_mut() {
                *item = sanitize(std::mem::take(item));
            }
        }
        WebValue::Object(members) => {
            for member in members.values_mut() {
                *member = sanitize(std::mem::take(member));
            }
        }
        _ => {}
    }

    value
}

/// Sanitize a plain JSON value
pub fn sanitize_json(value: Value) -> WebValue {
    sanitize(WebValue::from(value))
}

/// Replace `{"$values": inner}` by `inner`, repeatedly for nested wrappers.
fn unwrap_values(mut value: WebValue) -> WebValue {
    loop {
        let wrapped = value
            .get(VALUES_KEY)
            .map_or(false, |inner| !inner.is_falsy());
        if !wrapped {
            return value;
        }
        match value.take(VALUES_KEY) {
            Some(inner) => value = inner,
            None => return value,
        }
    }
}

/// Parse a server date-time string, `None` if it does not match the pattern
/// or names an impossible instant.
pub fn parse_date_time(value: &str) -> Option<DateTime<FixedOffset>> {
    if !DATE_TIME_PATTERN.is_match(value) {
        return None;
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => {
            trace!(value, "converted date-time string");
            Some(date)
        }
        Err(err) => {
            trace!(value, error = %err, "date-time string matched pattern but did not parse");
            None
        }
    }
}
