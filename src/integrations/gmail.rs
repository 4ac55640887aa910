use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use super::{Integrations, ids};
use crate::error::ApiError;
use crate::extract::split_sender;

pub const SEARCH: &str = "gmail_search";
pub const SEND: &str = "GMAIL_SEND_EMAIL";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(from = "RawEmail")]
pub struct Email {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub content: String,
}

// Search results name the same fields differently depending on the account
// backend, and may send `null` for any of them.
#[derive(Deserialize, Default)]
struct RawEmail {
    #[serde(default, deserialize_with = "null_as_empty")]
    id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    sender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    from: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    body: String,
}

impl From<RawEmail> for Email {
    fn from(raw: RawEmail) -> Self {
        let pick = |a: String, b: String| if a.is_empty() { b } else { a };
        Self {
            id: raw.id,
            sender: pick(raw.sender, raw.from),
            subject: raw.subject,
            content: pick(raw.content, raw.body),
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Email {
    pub fn sender_address(&self) -> String {
        split_sender(&self.sender).1
    }
}

/// Drops repeated ids, keeping the first occurrence.
pub fn dedupe_by_id(emails: Vec<Email>) -> Vec<Email> {
    let mut seen = std::collections::HashSet::new();
    emails
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect()
}

pub struct Gmail<'a> {
    hub: &'a Integrations,
}

impl<'a> Gmail<'a> {
    pub fn new(hub: &'a Integrations) -> Self {
        Self { hub }
    }

    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Email>, ApiError> {
        let resp = self
            .hub
            .execute(ids::GMAIL, SEARCH, json!({ "query": query, "max_results": max_results }))
            .await?;
        let items = match resp.field("emails") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ApiError::UnexpectedResponse(format!(
                    "gmail search returned non-list emails: {other}"
                )));
            }
            None => return Ok(Vec::new()),
        };
        Ok(items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| match Email::deserialize(item) {
                Ok(email) => Some(email),
                Err(e) => {
                    warn!(query, index = idx, error = %e, "skipping unreadable email");
                    None
                }
            })
            .collect())
    }

    /// `Ok(false)` when the API accepted the call but reported no delivery.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<bool, ApiError> {
        let resp = self
            .hub
            .execute(
                ids::GMAIL,
                SEND,
                json!({ "to": to.trim(), "subject": subject, "body": body }),
            )
            .await?;
        Ok(resp.succeeded())
    }
}
