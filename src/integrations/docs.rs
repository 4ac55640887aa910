use serde::Serialize;
use serde_json::json;

use super::{Integrations, ids};
use crate::error::ApiError;

pub const CREATE_DOCUMENT: &str = "create_document";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DocumentRef {
    pub title: String,
    pub url: String,
    pub id: Option<String>,
}

pub struct Docs<'a> {
    hub: &'a Integrations,
}

impl<'a> Docs<'a> {
    pub fn new(hub: &'a Integrations) -> Self {
        Self { hub }
    }

    /// `None` when the API did not return a document URL.
    pub async fn create_document(
        &self,
        title: &str,
        content: &str,
        folder_id: &str,
    ) -> Result<Option<DocumentRef>, ApiError> {
        let resp = self
            .hub
            .execute(
                ids::GOOGLE_DOCS,
                CREATE_DOCUMENT,
                json!({ "title": title, "content": content, "folder_id": folder_id }),
            )
            .await?;
        Ok(resp.str_field("url").map(|url| DocumentRef {
            title: title.to_string(),
            url,
            id: resp.str_field("id"),
        }))
    }
}
