//! Typed wrappers over the generic integration execute endpoint.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::api::IncredibleApi;
use crate::error::ApiError;
use crate::types::{ConnectOutcome, ConnectRequest, ExecuteRequest, ExecuteResponse};

pub mod asana;
pub mod calendar;
pub mod catalog;
pub mod docs;
pub mod gmail;
pub mod perplexity;
pub mod sheets;
pub mod slack;

pub use asana::{Asana, AsanaTask};
pub use calendar::{Calendar, CalendarEvent};
pub use docs::{DocumentRef, Docs};
pub use gmail::{Email, Gmail};
pub use perplexity::{Perplexity, ResearchFinding};
pub use sheets::Sheets;
pub use slack::Slack;

pub mod ids {
    pub const GMAIL: &str = "gmail";
    pub const GOOGLE_SHEETS: &str = "google_sheets";
    pub const GOOGLE_CALENDAR: &str = "google_calendar";
    pub const GOOGLE_DOCS: &str = "google_docs";
    pub const ASANA: &str = "asana";
    pub const PERPLEXITY: &str = "perplexity";
    pub const SLACK: &str = "slack";
}

/// Entry point for integration calls made on behalf of one user.
#[derive(Clone)]
pub struct Integrations {
    api: Arc<dyn IncredibleApi>,
    user_id: String,
}

impl Integrations {
    pub fn new(api: Arc<dyn IncredibleApi>, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
        }
    }

    pub fn api(&self) -> &Arc<dyn IncredibleApi> {
        &self.api
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn execute(
        &self,
        integration_id: &str,
        feature_name: &str,
        inputs: Value,
    ) -> Result<ExecuteResponse, ApiError> {
        debug!(integration = integration_id, feature = feature_name, "execute");
        let request = ExecuteRequest {
            user_id: self.user_id.clone(),
            feature_name: feature_name.to_string(),
            inputs,
        };
        self.api.execute(integration_id, &request).await
    }

    /// Links an API-key integration such as Perplexity.
    pub async fn connect_api_key(
        &self,
        integration_id: &str,
        api_key: &str,
    ) -> Result<ConnectOutcome, ApiError> {
        let request = ConnectRequest {
            user_id: self.user_id.clone(),
            api_key: Some(api_key.to_string()),
            callback_url: None,
        };
        self.api.connect(integration_id, &request).await
    }

    /// Starts an OAuth flow; the outcome normally carries the redirect URL.
    pub async fn connect_oauth(
        &self,
        integration_id: &str,
        callback_url: Option<&str>,
    ) -> Result<ConnectOutcome, ApiError> {
        let request = ConnectRequest {
            user_id: self.user_id.clone(),
            api_key: None,
            callback_url: callback_url.map(str::to_string),
        };
        self.api.connect(integration_id, &request).await
    }

    pub fn gmail(&self) -> Gmail<'_> {
        Gmail::new(self)
    }

    pub fn sheets(&self) -> Sheets<'_> {
        Sheets::new(self)
    }

    pub fn calendar(&self) -> Calendar<'_> {
        Calendar::new(self)
    }

    pub fn asana(&self) -> Asana<'_> {
        Asana::new(self)
    }

    pub fn docs(&self) -> Docs<'_> {
        Docs::new(self)
    }

    pub fn perplexity(&self) -> Perplexity<'_> {
        Perplexity::new(self)
    }

    pub fn slack(&self) -> Slack<'_> {
        Slack::new(self)
    }
}
