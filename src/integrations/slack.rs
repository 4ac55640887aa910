use serde_json::json;

use super::{Integrations, ids};
use crate::error::ApiError;

pub const SEND_MESSAGE: &str = "SLACK_SEND_MESSAGE";

pub struct Slack<'a> {
    hub: &'a Integrations,
}

impl<'a> Slack<'a> {
    pub fn new(hub: &'a Integrations) -> Self {
        Self { hub }
    }

    pub async fn post_message(&self, channel: &str, text: &str) -> Result<bool, ApiError> {
        let resp = self
            .hub
            .execute(ids::SLACK, SEND_MESSAGE, json!({ "channel": channel, "text": text }))
            .await?;
        Ok(resp.succeeded())
    }
}
