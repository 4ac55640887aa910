//! Acknowledges unread support and sales emails and logs each interaction.

use chrono::Local;
use serde_json::json;
use tracing::{info, warn};

use super::WorkflowContext;
use crate::error::ConfigError;
use crate::extract::UNKNOWN;
use crate::integrations::gmail::{Email, dedupe_by_id};
use crate::utils::contains_any;

pub const SUPPORT_QUERIES: [&str; 4] = [
    "is:unread (subject:support OR subject:help)",
    "is:unread (subject:demo OR subject:pricing OR subject:sales)",
    "is:unread to:support@company.com",
    "is:unread (inquiry OR question OR interested)",
];
pub const LOG_RANGE: &str = "EmailLog!A:E";
const SEARCH_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailCategory {
    Support,
    Sales,
    General,
}

pub fn categorize(email: &Email) -> EmailCategory {
    let content = email.content.to_lowercase();
    if contains_any(&content, &["support", "help", "issue", "problem"]) {
        EmailCategory::Support
    } else if contains_any(&content, &["demo", "trial", "pricing", "sales"]) {
        EmailCategory::Sales
    } else {
        EmailCategory::General
    }
}

pub fn auto_response(email: &Email) -> (String, String) {
    let name = email.sender.split('<').next().unwrap_or_default().trim();
    let name = if name.is_empty() { "there" } else { name };
    let subject = format!("Re: {}", email.subject);

    let body = match categorize(email) {
        EmailCategory::Support => format!(
            "Hi {name},

Thank you for contacting our support team. We've received your inquiry and will respond within 24 hours.

For urgent issues, please call our support hotline at (555) 123-4567.

Best regards,
Support Team

---
This is an automated response. Your message is important to us and will be reviewed by our team."
        ),
        EmailCategory::Sales => format!(
            "Hi {name},

Thank you for your interest in our product! We'd love to show you how we can help your business.

I'll connect you with our sales team who will reach out within 2 business hours to schedule a personalized demo.

In the meantime, feel free to explore our resources:
• Product Overview: https://company.com/product
• Case Studies: https://company.com/cases
• Pricing: https://company.com/pricing

Best regards,
Sales Team

---
This is an automated response. A member of our sales team will follow up personally."
        ),
        EmailCategory::General => format!(
            "Hi {name},

Thank you for your email. We've received your message and will review it carefully.

We typically respond to inquiries within 1-2 business days. If your matter is urgent, please call us at (555) 123-4567.

Best regards,
Team

---
This is an automated acknowledgment. We'll follow up with a personal response soon."
        ),
    };
    (subject, body)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutomationReport {
    pub processed: usize,
    pub responses_sent: usize,
}

pub struct EmailAutomation {
    ctx: WorkflowContext,
    sheet_id: String,
}

impl EmailAutomation {
    pub fn new(ctx: WorkflowContext) -> Result<Self, ConfigError> {
        let sheet_id = ctx.config.require("EMAIL_LOG_SHEET_ID")?.to_string();
        Ok(Self { ctx, sheet_id })
    }

    async fn log_interaction(&self, email: &Email, action: &str) {
        let sender = if email.sender.is_empty() { UNKNOWN } else { email.sender.as_str() };
        let subject = if email.subject.is_empty() { "No Subject" } else { email.subject.as_str() };
        let row = vec![
            json!(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            json!(sender),
            json!(subject),
            json!(action),
            json!(email.id),
        ];
        if let Err(e) = self
            .ctx
            .integrations
            .sheets()
            .append_rows(&self.sheet_id, LOG_RANGE, &[row])
            .await
        {
            warn!(email = %email.id, error = %e, "failed to log interaction");
        }
    }

    /// Emails returned by several queries are answered once.
    pub async fn process(&self) -> AutomationReport {
        let gmail = self.ctx.integrations.gmail();
        let mut emails = Vec::new();
        for query in SUPPORT_QUERIES {
            match gmail.search(query, SEARCH_LIMIT).await {
                Ok(found) => emails.extend(found),
                Err(e) => warn!(%query, error = %e, "email search failed"),
            }
        }

        let mut report = AutomationReport::default();
        for email in dedupe_by_id(emails) {
            info!(subject = %email.subject, "processing email");
            let address = email.sender_address();
            let action = if address.contains('@') {
                let (subject, body) = auto_response(&email);
                match gmail.send(&address, &subject, &body).await {
                    Ok(true) => {
                        report.responses_sent += 1;
                        "Auto-response sent".to_string()
                    }
                    Ok(false) => "Failed to send auto-response".to_string(),
                    Err(e) => {
                        warn!(%address, error = %e, "failed to send auto-response");
                        format!("Error: {e}")
                    }
                }
            } else {
                "Invalid sender email".to_string()
            };

            self.log_interaction(&email, &action).await;
            report.processed += 1;
            self.ctx.pause().await;
        }
        info!(processed = report.processed, sent = report.responses_sent, "email automation complete");
        report
    }
}
