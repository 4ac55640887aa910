use super::ids;
use crate::types::IntegrationSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    OAuth,
    ApiKey,
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub auth: AuthKind,
    pub features: &'static [&'static str],
}

/// Integrations this crate knows how to drive.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: ids::GMAIL,
        name: "Gmail",
        description: "Search and send email",
        auth: AuthKind::OAuth,
        features: &["gmail_search", "GMAIL_SEND_EMAIL"],
    },
    CatalogEntry {
        id: ids::GOOGLE_SHEETS,
        name: "Google Sheets",
        description: "Append rows and update ranges in spreadsheets",
        auth: AuthKind::OAuth,
        features: &["sheets_append_data", "sheets_update_range"],
    },
    CatalogEntry {
        id: ids::GOOGLE_CALENDAR,
        name: "Google Calendar",
        description: "Create calendar events",
        auth: AuthKind::OAuth,
        features: &["create_event"],
    },
    CatalogEntry {
        id: ids::GOOGLE_DOCS,
        name: "Google Docs",
        description: "Create documents",
        auth: AuthKind::OAuth,
        features: &["create_document"],
    },
    CatalogEntry {
        id: ids::ASANA,
        name: "Asana",
        description: "Create tasks in projects",
        auth: AuthKind::OAuth,
        features: &["create_task"],
    },
    CatalogEntry {
        id: ids::PERPLEXITY,
        name: "Perplexity",
        description: "Web research with cited sources",
        auth: AuthKind::ApiKey,
        features: &["PerplexityAISearch", "PERPLEXITY_SEARCH"],
    },
    CatalogEntry {
        id: ids::SLACK,
        name: "Slack",
        description: "Post messages to channels",
        auth: AuthKind::OAuth,
        features: &["SLACK_SEND_MESSAGE"],
    },
];

pub fn find(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.id == id)
}

impl CatalogEntry {
    /// All features, or only `features` when given.
    pub fn spec(&self, features: Option<&[&str]>) -> IntegrationSpec {
        let features = match features {
            Some(selected) => selected.iter().map(|f| f.to_string()).collect(),
            None => self.features.iter().map(|f| f.to_string()).collect(),
        };
        IntegrationSpec {
            id: self.id.to_string(),
            features,
        }
    }
}
