//! Batch automations built on the integrations. Each workflow logs and skips
//! items that fail and reports counts at the end.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::api::IncredibleApi;
use crate::config::Config;
use crate::error::ConfigError;
use crate::integrations::{Integrations, ResearchFinding};

pub mod content;
pub mod email_automation;
pub mod finance;
pub mod leads;
pub mod meetings;
pub mod research;

pub struct WorkflowContext {
    pub integrations: Integrations,
    pub config: Config,
    /// Spacing between consecutive calls inside a batch loop.
    pub pause: Duration,
}

impl WorkflowContext {
    pub fn new(api: Arc<dyn IncredibleApi>, config: Config) -> Result<Self, ConfigError> {
        let user_id = config.user_id()?.to_string();
        let pause = config.rate_limit_pause;
        Ok(Self {
            integrations: Integrations::new(api, user_id),
            config,
            pause,
        })
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub async fn pause(&self) {
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
    }

    /// Runs each query through Perplexity, skipping the ones that fail.
    pub async fn research(&self, queries: &[String]) -> Vec<ResearchFinding> {
        let perplexity = self.integrations.perplexity();
        let mut findings = Vec::with_capacity(queries.len());
        for query in queries {
            match perplexity.search(query).await {
                Ok(finding) => {
                    findings.push(finding);
                    self.pause().await;
                }
                Err(e) => warn!(%query, error = %e, "research query failed, skipping"),
            }
        }
        info!(succeeded = findings.len(), total = queries.len(), "research complete");
        findings
    }

    /// Sends the same message to every recipient; returns how many were sent.
    pub async fn email_all(&self, recipients: &[String], subject: &str, body: &str) -> usize {
        let gmail = self.integrations.gmail();
        let mut sent = 0;
        for recipient in recipients {
            match gmail.send(recipient, subject, body).await {
                Ok(true) => sent += 1,
                Ok(false) => warn!(%recipient, "email was not delivered"),
                Err(e) => warn!(%recipient, error = %e, "failed to send email"),
            }
            self.pause().await;
        }
        sent
    }
}
