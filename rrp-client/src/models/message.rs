//! Response messages and their severity levels

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Severity of a response message.
///
/// Mirrors the .NET diagnostics levels the server uses; on the wire the level
/// travels as its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EventLevel {
    LogAlways,
    Critical,
    Error,
    Warning,
    #[default]
    Informational,
    Verbose,
}

impl EventLevel {
    /// Numeric wire value
    pub fn as_u8(self) -> u8 {
        match self {
            EventLevel::LogAlways => 0,
            EventLevel::Critical => 1,
            EventLevel::Error => 2,
            EventLevel::Warning => 3,
            EventLevel::Informational => 4,
            EventLevel::Verbose => 5,
        }
    }

    /// Level for a numeric wire value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EventLevel::LogAlways),
            1 => Some(EventLevel::Critical),
            2 => Some(EventLevel::Error),
            3 => Some(EventLevel::Warning),
            4 => Some(EventLevel::Informational),
            5 => Some(EventLevel::Verbose),
            _ => None,
        }
    }

    /// Level for its name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "logalways" => Some(EventLevel::LogAlways),
            "critical" => Some(EventLevel::Critical),
            "error" => Some(EventLevel::Error),
            "warning" => Some(EventLevel::Warning),
            "informational" => Some(EventLevel::Informational),
            "verbose" => Some(EventLevel::Verbose),
            _ => None,
        }
    }

    /// Whether the level is Error or more severe (LogAlways excluded)
    pub fn is_error(self) -> bool {
        matches!(self, EventLevel::Critical | EventLevel::Error)
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventLevel::LogAlways => "LogAlways",
            EventLevel::Critical => "Critical",
            EventLevel::Error => "Error",
            EventLevel::Warning => "Warning",
            EventLevel::Informational => "Informational",
            EventLevel::Verbose => "Verbose",
        };
        f.write_str(name)
    }
}

impl Serialize for EventLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

struct EventLevelVisitor;

impl<'de> Visitor<'de> for EventLevelVisitor {
    type Value = EventLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an event level number between 0 and 5 or its name")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<EventLevel, E> {
        u8::try_from(value)
            .ok()
            .and_then(EventLevel::from_u8)
            .ok_or_else(|| E::custom(format!("unknown event level {}", value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<EventLevel, E> {
        u64::try_from(value)
            .map_err(|_| E::custom(format!("unknown event level {}", value)))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<EventLevel, E> {
        EventLevel::from_name(value)
            .ok_or_else(|| E::custom(format!("unknown event level {:?}", value)))
    }
}

impl<'de> Deserialize<'de> for EventLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EventLevelVisitor)
    }
}

/// A message attached to a response by the server (or synthesized locally).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseMessage {
    /// Stable key used to filter or acknowledge the message
    pub source_id: String,

    /// Validation message the user may suppress
    pub is_omittable_validation: bool,

    /// Full message text
    pub complete_text: String,

    /// Text suitable for display to users
    pub user_friendly_caption: String,

    /// Detail messages grouped under this one
    pub nested_messages: Vec<ResponseMessage>,

    /// Severity, Informational unless stated otherwise
    pub event_level: EventLevel,

    /// Category tags
    pub categories: Vec<String>,
}

impl ResponseMessage {
    /// Create an informational message. The complete text defaults to the
    /// caption when not given.
    pub fn new(
        source_id: impl Into<String>,
        user_friendly_caption: impl Into<String>,
        complete_text: Option<String>,
    ) -> Self {
        let user_friendly_caption = user_friendly_caption.into();
        let complete_text = complete_text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| user_friendly_caption.clone());

        Self {
            source_id: source_id.into(),
            complete_text,
            user_friendly_caption,
            ..Self::default()
        }
    }

    /// Set the severity
    pub fn with_level(mut self, level: EventLevel) -> Self {
        self.event_level = level;
        self
    }

    /// Mark as an omittable validation message
    pub fn omittable(mut self) -> Self {
        self.is_omittable_validation = true;
        self
    }

    /// Add a category tag
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Add a nested detail message
    pub fn with_nested(mut self, message: ResponseMessage) -> Self {
        self.nested_messages.push(message);
        self
    }

    /// Depth-first iterator over this message and all nested messages
    pub fn walk(&self) -> MessageWalk<'_> {
        MessageWalk { stack: vec![self] }
    }
}

/// Depth-first, pre-order traversal of a message tree
pub struct MessageWalk<'a> {
    stack: Vec<&'a ResponseMessage>,
}

impl<'a> Iterator for MessageWalk<'a> {
    type Item = &'a ResponseMessage;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.nested_messages.iter().rev());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_text_defaults_to_caption() {
        let message = ResponseMessage::new("Orders.Save", "Saved", None);
        assert_eq!(message.complete_text, "Saved");
        assert_eq!(message.event_level, EventLevel::Informational);

        let message = ResponseMessage::new("Orders.Save", "Saved", Some("Saved order 7".into()));
        assert_eq!(message.complete_text, "Saved order 7");
    }

    #[test]
    fn test_message_wire_shape() {
        let message = ResponseMessage::new("Orders.Quantity", "Too many", None)
            .with_level(EventLevel::Warning)
            .omittable()
            .with_category("validation");

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sourceId"], "Orders.Quantity");
        assert_eq!(value["isOmittableValidation"], true);
        assert_eq!(value["userFriendlyCaption"], "Too many");
        assert_eq!(value["completeText"], "Too many");
        assert_eq!(value["eventLevel"], 3);
        assert_eq!(value["categories"], json!(["validation"]));
        assert_eq!(value["nestedMessages"], json!([]));
    }

    #[test]
    fn test_event_level_accepts_numbers_and_names() {
        let level: EventLevel = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(level, EventLevel::Error);

        let level: EventLevel = serde_json::from_value(json!("warning")).unwrap();
        assert_eq!(level, EventLevel::Warning);

        assert!(serde_json::from_value::<EventLevel>(json!(9)).is_err());
        assert!(serde_json::from_value::<EventLevel>(json!(-1)).is_err());
    }

    #[test]
    fn test_sparse_message_uses_defaults() {
        let message: ResponseMessage =
            serde_json::from_value(json!({ "sourceId": "x", "userFriendlyCaption": "hi" })).unwrap();
        assert_eq!(message.event_level, EventLevel::Informational);
        assert!(message.nested_messages.is_empty());
        assert!(!message.is_omittable_validation);
    }

    #[test]
    fn test_walk_is_depth_first() {
        let tree = ResponseMessage::new("a", "a", None)
            .with_nested(ResponseMessage::new("b", "b", None).with_nested(ResponseMessage::new("c", "c", None)))
            .with_nested(ResponseMessage::new("d", "d", None));

        let order: Vec<&str> = tree.walk().map(|m| m.source_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }
}
