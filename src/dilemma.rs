//! Dilemmas: the cases the engine scores.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form, string-keyed dilemma context.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Unique identifier for a dilemma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DilemmaId(Uuid);

impl DilemmaId {
    /// Creates a new random dilemma ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DilemmaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DilemmaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of dilemma. Duty dilemmas get the duty boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Obligation-driven case.
    Duty,
    /// Judgement-driven case.
    #[default]
    Wisdom,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duty => write!(f, "duty"),
            Self::Wisdom => write!(f, "wisdom"),
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duty" => Ok(Self::Duty),
            "wisdom" => Ok(Self::Wisdom),
            other => Err(format!("unknown task type '{other}' (expected duty or wisdom)")),
        }
    }
}

/// A queued case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dilemma {
    /// Identity, used for cancellation and reporting.
    pub id: DilemmaId,
    /// The question being scored.
    pub query: String,
    /// Arbitrary context.
    #[serde(default)]
    pub context: Context,
    /// Kind of dilemma.
    #[serde(default)]
    pub task_type: TaskType,
    /// When the dilemma was created.
    pub submitted_at: DateTime<Utc>,
}

impl Dilemma {
    /// Creates a dilemma with a fresh ID.
    #[must_use]
    pub fn new(query: impl Into<String>, context: Context, task_type: TaskType) -> Self {
        Self {
            id: DilemmaId::new(),
            query: query.into(),
            context,
            task_type,
            submitted_at: Utc::now(),
        }
    }

    /// Context as canonical JSON (keys sorted).
    #[must_use]
    pub fn canonical_context(&self) -> String {
        canonical_context(&self.context)
    }
}

/// Serializes a context with sorted keys.
#[must_use]
pub fn canonical_context(context: &Context) -> String {
    // serde_json::Map is key-ordered without the `preserve_order` feature.
    serde_json::Value::Object(context.clone()).to_string()
}

/// Coarse screen: true when the query is shorter than `threshold` characters.
#[must_use]
pub fn is_ethical_query(query: &str, threshold: usize) -> bool {
    query.chars().count() < threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dilemma_ids_are_unique() {
        assert_ne!(DilemmaId::new(), DilemmaId::new());
    }

    #[test]
    fn task_type_parses() {
        assert_eq!("duty".parse::<TaskType>().unwrap(), TaskType::Duty);
        assert_eq!(" Wisdom ".parse::<TaskType>().unwrap(), TaskType::Wisdom);
        assert!("care".parse::<TaskType>().is_err());
        assert_eq!(TaskType::default(), TaskType::Wisdom);
    }

    #[test]
    fn task_type_serde_is_snake_case() {
        assert_eq!(serde_json::to_string(&TaskType::Duty).unwrap(), r#""duty""#);
    }

    #[test]
    fn canonical_context_sorts_keys() {
        let serde_json::Value::Object(context) = json!({"b": 1, "a": {"z": true, "y": null}}) else {
            unreachable!("literal is an object")
        };
        assert_eq!(canonical_context(&context), r#"{"a":{"y":null,"z":true},"b":1}"#);

        let dilemma = Dilemma::new("q", context, TaskType::Duty);
        assert_eq!(dilemma.canonical_context(), r#"{"a":{"y":null,"z":true},"b":1}"#);
    }

    #[test]
    fn complexity_screen() {
        assert!(is_ethical_query("short", 15_000));
        assert!(!is_ethical_query(&"x".repeat(15_000), 15_000));
    }
}
