use serde::Serialize;

use super::{Integrations, ids};
use crate::error::ApiError;

pub const CREATE_EVENT: &str = "create_event";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Attendee {
    pub email: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CalendarEvent {
    pub calendar_id: String,
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub location: String,
    pub attendees: Vec<Attendee>,
}

pub struct Calendar<'a> {
    hub: &'a Integrations,
}

impl<'a> Calendar<'a> {
    pub fn new(hub: &'a Integrations) -> Self {
        Self { hub }
    }

    /// Returns the new event id when the API reports one.
    pub async fn create_event(&self, event: &CalendarEvent) -> Result<Option<String>, ApiError> {
        let resp = self
            .hub
            .execute(ids::GOOGLE_CALENDAR, CREATE_EVENT, serde_json::to_value(event)?)
            .await?;
        Ok(resp.str_field("id"))
    }
}
