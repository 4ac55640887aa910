//! Finds sales enquiries in Gmail, scores them, records them in a Sheets CRM
//! and follows up with the promising ones.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::WorkflowContext;
use crate::error::{ApiError, ConfigError};
use crate::extract::{UNKNOWN, company_from_email, email_domain, split_sender};
use crate::integrations::gmail::{Email, dedupe_by_id};
use crate::utils::{contains_any, truncate_chars};

pub const LEAD_QUERIES: [&str; 4] = [
    "subject:(inquiry OR quote OR pricing OR demo OR interested)",
    "subject:(partnership OR collaboration OR integration)",
    "\"looking for\" OR \"need help\" OR \"can you help\"",
    "\"get started\" OR \"learn more\" OR \"tell me about\"",
];
pub const LEADS_RANGE: &str = "Leads!A:J";
pub const HIGH_VALUE_SCORE: u32 = 80;
const SEARCH_LIMIT: u32 = 20;
const MESSAGE_LIMIT: usize = 500;

const AUTOMATED_SENDERS: &[&str] = &["noreply", "no-reply", "automated", "system", "notification"];
const LEAD_INDICATORS: &[&str] = &[
    "inquiry",
    "interested",
    "demo",
    "pricing",
    "quote",
    "help",
    "support",
    "question",
    "information",
    "partnership",
    "collaboration",
    "integration",
];
const KEYWORD_WEIGHTS: &[(&str, u32)] = &[
    ("enterprise", 30),
    ("budget", 25),
    ("purchase", 25),
    ("buy", 20),
    ("demo", 20),
    ("trial", 15),
    ("pricing", 15),
    ("quote", 20),
    ("urgent", 15),
    ("asap", 15),
    ("meeting", 10),
    ("call", 10),
    ("partnership", 25),
    ("collaboration", 20),
    ("integration", 15),
];
const FREE_MAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "hotmail.com"];

#[derive(Debug, Clone)]
pub struct LeadSettings {
    pub sheet_id: String,
    pub min_score: u32,
    pub company_name: String,
}

impl LeadSettings {
    pub fn from_config(ctx: &WorkflowContext) -> Result<Self, ConfigError> {
        let config = &ctx.config;
        Ok(Self {
            sheet_id: config.require("LEADS_SHEET_ID")?.to_string(),
            min_score: config.parse_or("MIN_LEAD_SCORE", 60)?,
            company_name: config.get_or("COMPANY_NAME", "Your Company"),
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub subject: String,
    pub message: String,
    pub source: String,
    pub date_captured: String,
    pub status: String,
    pub lead_score: u32,
    pub next_action: String,
}

pub fn is_potential_lead(email: &Email) -> bool {
    let sender = email.sender.to_lowercase();
    if contains_any(&sender, AUTOMATED_SENDERS) {
        return false;
    }
    let text = format!("{} {}", email.subject, email.content).to_lowercase();
    contains_any(&text, LEAD_INDICATORS)
}

pub fn extract_lead(email: &Email, captured_at: NaiveDateTime) -> Lead {
    let (name, address) = split_sender(&email.sender);
    let mut lead = Lead {
        id: email.id.clone(),
        name,
        company: company_from_email(&address),
        email: address,
        subject: email.subject.clone(),
        message: truncate_chars(&email.content, MESSAGE_LIMIT),
        source: "Email".to_string(),
        date_captured: captured_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        status: "New".to_string(),
        lead_score: 0,
        next_action: String::new(),
    };
    lead.lead_score = score_lead(&lead);
    lead.next_action = next_action(&lead).to_string();
    lead
}

/// Keyword weights plus bonuses for a known company, a business mail domain
/// and a longer message. Capped at 100.
pub fn score_lead(lead: &Lead) -> u32 {
    let text = format!("{} {}", lead.subject, lead.message).to_lowercase();
    let mut score: u32 = KEYWORD_WEIGHTS
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .map(|(_, points)| points)
        .sum();

    if lead.company != UNKNOWN {
        score += 15;
    }
    if let Some(domain) = email_domain(&lead.email) {
        if !domain.is_empty() && !contains_any(domain, FREE_MAIL_DOMAINS) {
            score += 10;
        }
    }
    let length = lead.message.chars().count();
    if length > 200 {
        score += 10;
    } else if length > 100 {
        score += 5;
    }
    score.min(100)
}

pub fn next_action(lead: &Lead) -> &'static str {
    let text = format!("{} {}", lead.subject, lead.message).to_lowercase();
    match lead.lead_score {
        s if s >= HIGH_VALUE_SCORE => "High Priority - Call within 2 hours",
        s if s >= 60 && text.contains("demo") => "Schedule demo call",
        s if s >= 60 && text.contains("pricing") => "Send pricing information",
        s if s >= 60 => "Send personalized follow-up email",
        s if s >= 40 => "Add to nurture campaign",
        _ => "Send general information",
    }
}

pub fn lead_row(lead: &Lead) -> Vec<Value> {
    vec![
        json!(lead.date_captured),
        json!(lead.name),
        json!(lead.email),
        json!(lead.company),
        json!(lead.subject),
        json!(lead.lead_score),
        json!(lead.status),
        json!(lead.next_action),
        json!(lead.source),
        json!(lead.id),
    ]
}

pub fn follow_up_email(lead: &Lead, company_name: &str) -> (String, String) {
    let subject = format!("Re: {}", lead.subject);
    let opening = match lead.lead_score {
        s if s >= HIGH_VALUE_SCORE => "Thank you for your interest",
        s if s >= 60 => "Thanks for reaching out",
        _ => "Thank you for contacting us",
    };
    let message = lead.message.to_lowercase();
    let offer = if message.contains("demo") {
        "I'd be happy to schedule a personalized demo to show you exactly how we can help."
    } else if message.contains("pricing") {
        "I'll send you detailed pricing information and can discuss options that fit your budget."
    } else if message.contains("integration") {
        "I'd love to discuss how our solution integrates with your existing systems."
    } else {
        "I'd be happy to discuss how we can help you achieve your goals."
    };

    let body = format!(
        "Hello {name},

{opening} and for reaching out to {company_name}.

I reviewed your message about \"{subject}\" and understand you're looking for a solution. {offer}

Based on your inquiry, I think you'd be particularly interested in:
• Our proven track record with companies like {company}
• Solutions that can be implemented quickly and efficiently
• Dedicated support throughout the process

Would you be available for a brief 15-minute call this week to discuss your specific needs? I have availability:
• Today after 2 PM
• Tomorrow morning 9-11 AM
• Friday afternoon 1-4 PM

Feel free to reply with your preferred time, or you can book directly on my calendar: [calendar-link]

Looking forward to connecting!

Best regards,
[Your Name]
[Your Title]
{company_name}
[Phone] | [Email]

---
This is a personal response to your inquiry. We appreciate your interest in {company_name}.",
        name = lead.name,
        subject = lead.subject,
        company = lead.company,
    );
    (subject, body)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadScanReport {
    pub candidates: usize,
    pub processed: usize,
    pub follow_ups_sent: usize,
    pub high_value: Vec<Lead>,
}

pub struct LeadManager {
    ctx: WorkflowContext,
    settings: LeadSettings,
}

impl LeadManager {
    pub fn new(ctx: WorkflowContext) -> Result<Self, ConfigError> {
        let settings = LeadSettings::from_config(&ctx)?;
        Ok(Self { ctx, settings })
    }

    pub fn settings(&self) -> &LeadSettings {
        &self.settings
    }

    /// Search failures are logged and yield no emails.
    pub async fn search(&self, query: &str, hours_back: u32) -> Vec<Email> {
        let query = format!("{query} newer_than:{hours_back}h");
        match self.ctx.integrations.gmail().search(&query, SEARCH_LIMIT).await {
            Ok(emails) => emails,
            Err(e) => {
                warn!(%query, error = %e, "lead search failed");
                Vec::new()
            }
        }
    }

    pub async fn save_lead(&self, lead: &Lead) -> Result<(), ApiError> {
        self.ctx
            .integrations
            .sheets()
            .append_rows(&self.settings.sheet_id, LEADS_RANGE, &[lead_row(lead)])
            .await
    }

    /// `Ok(false)` when the lead is below the follow-up threshold.
    pub async fn send_follow_up(&self, lead: &Lead) -> Result<bool, ApiError> {
        if lead.lead_score < self.settings.min_score {
            info!(lead = %lead.name, score = lead.lead_score, "below follow-up threshold");
            return Ok(false);
        }
        let (subject, body) = follow_up_email(lead, &self.settings.company_name);
        self.ctx.integrations.gmail().send(&lead.email, &subject, &body).await
    }

    pub async fn scan(&self, hours_back: u32) -> LeadScanReport {
        let mut candidates = Vec::new();
        for query in LEAD_QUERIES {
            let emails = self.search(query, hours_back).await;
            candidates.extend(emails.into_iter().filter(is_potential_lead));
        }
        let candidates = dedupe_by_id(candidates);
        info!(count = candidates.len(), "potential leads found");

        let mut report = LeadScanReport {
            candidates: candidates.len(),
            ..Default::default()
        };
        for email in &candidates {
            let lead = extract_lead(email, Local::now().naive_local());
            info!(lead = %lead.name, company = %lead.company, score = lead.lead_score, action = %lead.next_action, "processing lead");

            if let Err(e) = self.save_lead(&lead).await {
                warn!(lead = %lead.name, error = %e, "failed to save lead, skipping");
                continue;
            }
            report.processed += 1;

            if lead.lead_score >= self.settings.min_score {
                match self.send_follow_up(&lead).await {
                    Ok(true) => report.follow_ups_sent += 1,
                    Ok(false) => warn!(lead = %lead.name, "follow-up was not delivered"),
                    Err(e) => warn!(lead = %lead.name, error = %e, "failed to send follow-up"),
                }
                self.ctx.pause().await;
            }
            if lead.lead_score >= HIGH_VALUE_SCORE {
                report.high_value.push(lead);
            }
        }
        info!(processed = report.processed, high_value = report.high_value.len(), follow_ups = report.follow_ups_sent, "lead scan complete");
        report
    }
}
