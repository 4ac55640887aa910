use serde_json::{Value, json};

use super::{Integrations, ids};
use crate::error::ApiError;

pub const APPEND: &str = "sheets_append_data";
pub const UPDATE: &str = "sheets_update_range";

pub type Row = Vec<Value>;

pub struct Sheets<'a> {
    hub: &'a Integrations,
}

impl<'a> Sheets<'a> {
    pub fn new(hub: &'a Integrations) -> Self {
        Self { hub }
    }

    pub async fn append_rows(&self, spreadsheet_id: &str, range: &str, rows: &[Row]) -> Result<(), ApiError> {
        self.write(APPEND, spreadsheet_id, range, rows).await
    }

    pub async fn update_range(&self, spreadsheet_id: &str, range: &str, rows: &[Row]) -> Result<(), ApiError> {
        self.write(UPDATE, spreadsheet_id, range, rows).await
    }

    async fn write(&self, feature: &str, spreadsheet_id: &str, range: &str, rows: &[Row]) -> Result<(), ApiError> {
        self.hub
            .execute(
                ids::GOOGLE_SHEETS,
                feature,
                json!({ "spreadsheet_id": spreadsheet_id, "range": range, "values": rows }),
            )
            .await?;
        Ok(())
    }
}
