use serde::Serialize;

use super::{Integrations, ids};
use crate::error::ApiError;

pub const CREATE_TASK: &str = "create_task";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AsanaTask {
    pub name: String,
    pub notes: String,
    pub due_on: String,
    pub projects: Vec<String>,
}

pub struct Asana<'a> {
    hub: &'a Integrations,
}

impl<'a> Asana<'a> {
    pub fn new(hub: &'a Integrations) -> Self {
        Self { hub }
    }

    /// Returns the task gid when the API reports one.
    pub async fn create_task(&self, task: &AsanaTask) -> Result<Option<String>, ApiError> {
        let resp = self
            .hub
            .execute(ids::ASANA, CREATE_TASK, serde_json::to_value(task)?)
            .await?;
        Ok(resp.str_field("gid"))
    }
}
