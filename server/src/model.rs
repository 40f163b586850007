//! Domain types for the todo service.
//!
//! # Design
//! `Priority` is a closed enum, but request bodies carry it as a raw string
//! (`TodoPayload`). Validation happens in `TodoPayload::validate` so an
//! unknown level surfaces as a 400 with a readable message rather than a
//! generic body-rejection from the JSON extractor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Urgency tag carried by every stored item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priority string outside {Low, Medium, High}.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid priority level: {0}")]
pub struct InvalidPriority(pub String);

impl FromStr for Priority {
    type Err = InvalidPriority;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            other => Err(InvalidPriority(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

impl TodoItem {
    /// Case-insensitive substring match against title or description.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    pub fn content_key(&self) -> (&str, Option<&str>, Priority) {
        (&self.title, self.description.as_deref(), self.priority)
    }

    pub fn same_content(&self, candidate: &NewTodo) -> bool {
        self.content_key() == candidate.content_key()
    }
}

/// Validated fields of an item that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

impl NewTodo {
    pub fn into_item(self, id: String) -> TodoItem {
        TodoItem {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
        }
    }

    pub fn content_key(&self) -> (&str, Option<&str>, Priority) {
        (&self.title, self.description.as_deref(), self.priority)
    }
}

/// Request body accepted by create, update, import and duplicate-check.
///
/// Any `id` sent by the client is accepted and dropped; ids are assigned by
/// the store.
#[derive(Clone, Debug, Deserialize)]
pub struct TodoPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: String,
}

impl TodoPayload {
    pub fn validate(self) -> Result<NewTodo, InvalidPriority> {
        let priority = self.priority.parse()?;
        Ok(NewTodo {
            title: self.title,
            description: self.description,
            priority,
        })
    }
}

/// Item counts per priority level. Every level is always present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityStats {
    #[serde(rename = "Low")]
    pub low: u64,
    #[serde(rename = "Medium")]
    pub medium: u64,
    #[serde(rename = "High")]
    pub high: u64,
}

impl PriorityStats {
    pub fn record(&mut self, priority: Priority, count: u64) {
        match priority {
            Priority::Low => self.low += count,
            Priority::Medium => self.medium += count,
            Priority::High => self.high += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.low + self.medium + self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn item(title: &str, description: Option<&str>, priority: Priority) -> TodoItem {
        TodoItem {
            id: "id-1".to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            priority,
        }
    }

    #[rstest]
    #[case("Low", Priority::Low)]
    #[case("Medium", Priority::Medium)]
    #[case("High", Priority::High)]
    fn priority_parses_known_levels(#[case] raw: &str, #[case] expected: Priority) {
        assert_eq!(raw.parse::<Priority>().unwrap(), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    #[case("Urgent")]
    #[case("low")]
    #[case("HIGH")]
    #[case("")]
    #[case(" Low")]
    fn priority_rejects_unknown_levels(#[case] raw: &str) {
        let err = raw.parse::<Priority>().unwrap_err();
        assert_eq!(err, InvalidPriority(raw.to_string()));
    }

    #[test]
    fn todo_item_serializes_with_null_description() {
        let json = serde_json::to_value(item("Buy milk", None, Priority::Low)).unwrap();
        assert_eq!(json["id"], "id-1");
        assert_eq!(json["title"], "Buy milk");
        assert!(json["description"].is_null());
        assert_eq!(json["priority"], "Low");
    }

    #[test]
    fn payload_id_and_description_are_optional() {
        let payload: TodoPayload =
            serde_json::from_str(r#"{"title":"Buy milk","priority":"Low"}"#).unwrap();
        assert!(payload.id.is_none());
        let todo = payload.validate().unwrap();
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description, None);
        assert_eq!(todo.priority, Priority::Low);
    }

    #[test]
    fn payload_rejects_missing_title() {
        let result: Result<TodoPayload, _> = serde_json::from_str(r#"{"priority":"Low"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn payload_with_unknown_priority_fails_validation() {
        let payload: TodoPayload =
            serde_json::from_str(r#"{"id":"x","title":"t","priority":"Urgent"}"#).unwrap();
        assert_eq!(payload.validate().unwrap_err().0, "Urgent");
    }

    #[rstest]
    #[case("milk", true)]
    #[case("MILK", true)]
    #[case("fresh", true)]
    #[case("FRESH FROM", true)]
    #[case("bread", false)]
    #[case("", true)]
    fn matches_title_or_description_ignoring_case(#[case] query: &str, #[case] expected: bool) {
        let todo = item("Buy Milk", Some("Fresh from the store"), Priority::Low);
        assert_eq!(todo.matches(query), expected);
    }

    #[test]
    fn matches_ignores_missing_description() {
        let todo = item("Walk dog", None, Priority::High);
        assert!(!todo.matches("store"));
    }

    #[test]
    fn same_content_distinguishes_empty_and_missing_description() {
        let todo = item("t", None, Priority::Low);
        let blank = NewTodo {
            title: "t".to_string(),
            description: Some(String::new()),
            priority: Priority::Low,
        };
        assert!(!todo.same_content(&blank));
        let bare = NewTodo {
            description: None,
            ..blank
        };
        assert!(todo.same_content(&bare));
    }

    #[test]
    fn stats_serialize_every_level_in_order() {
        let mut stats = PriorityStats::default();
        stats.record(Priority::High, 2);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"Low":0,"Medium":0,"High":2}"#);
        assert_eq!(stats.total(), 2);
    }
}
