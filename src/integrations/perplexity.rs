use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Value, json};

use super::{Integrations, ids};
use crate::error::ApiError;

pub const SEARCH: &str = "PerplexityAISearch";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ResearchFinding {
    pub query: String,
    pub answer: String,
    pub sources: Vec<Value>,
    pub timestamp: DateTime<Local>,
}

pub struct Perplexity<'a> {
    hub: &'a Integrations,
}

impl<'a> Perplexity<'a> {
    pub fn new(hub: &'a Integrations) -> Self {
        Self { hub }
    }

    pub async fn search(&self, query: &str) -> Result<ResearchFinding, ApiError> {
        let resp = self
            .hub
            .execute(ids::PERPLEXITY, SEARCH, json!({ "query": query }))
            .await?;
        let answer = resp
            .field("answer")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let sources = resp
            .field("sources")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(ResearchFinding {
            query: query.to_string(),
            answer,
            sources,
            timestamp: Local::now(),
        })
    }
}
