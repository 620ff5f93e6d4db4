use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority label that gets the urgent highlight.
pub const URGENT: &str = "Urgent";

/// Opaque email identifier. The store hands out integers today, but
/// anything it sends is echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmailId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailId::Int(n) => write!(f, "{n}"),
            EmailId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EmailId {
    fn from(n: i64) -> Self {
        EmailId::Int(n)
    }
}

impl From<&str> for EmailId {
    fn from(s: &str) -> Self {
        EmailId::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub sent_date: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub alternate_emails: Vec<String>,
    #[serde(default)]
    pub customer_requests: Vec<String>,
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub ai_response: Option<String>,
}

impl Email {
    pub fn is_urgent(&self) -> bool {
        self.priority == URGENT
    }

    /// Draft text used to seed the editor; a missing draft seeds an empty one.
    pub fn draft(&self) -> &str {
        self.ai_response.as_deref().unwrap_or("")
    }
}

/// Body of `POST /emails/{id}/response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseUpdate {
    pub ai_response: String,
}

/// Joins an extracted field for display, `"None"` when empty.
pub fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_or_none_handles_empty_and_ordered_lists() {
        assert_eq!(join_or_none(&[]), "None");
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(join_or_none(&items), "a, b, c");
    }

    #[test]
    fn decodes_store_payload_with_null_draft_and_missing_lists() {
        let raw = r#"{"id": 7, "subject": "Help", "sender": "x@y.com", "priority": "Urgent",
                      "sentiment": "Negative", "ai_response": null}"#;
        let email: Email = serde_json::from_str(raw).unwrap();
        assert_eq!(email.id, EmailId::Int(7));
        assert!(email.is_urgent());
        assert_eq!(email.draft(), "");
        assert!(email.phone_numbers.is_empty());
        assert!(email.customer_requests.is_empty());
    }

    #[test]
    fn string_ids_are_kept_verbatim() {
        let email: Email = serde_json::from_str(r#"{"id": "abc-1"}"#).unwrap();
        assert_eq!(email.id.to_string(), "abc-1");
        assert_eq!(serde_json::to_value(&email.id).unwrap(), "abc-1");
    }

    #[test]
    fn only_the_exact_label_is_urgent() {
        let mut email: Email = serde_json::from_str(r#"{"id": 1, "priority": "urgent"}"#).unwrap();
        assert!(!email.is_urgent());
        email.priority = "Not urgent".into();
        assert!(!email.is_urgent());
        email.priority = URGENT.into();
        assert!(email.is_urgent());
    }
}
