use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{
    ChatCompletion, ChatRequest, ConnectOutcome, ConnectRequest, ExecuteRequest, ExecuteResponse,
    IntegrationInfo,
};

/// The hosted API surface the agent, integrations and workflows depend on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncredibleApi: Send + Sync {
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatCompletion, ApiError>;

    async fn execute(
        &self,
        integration_id: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, ApiError>;

    async fn connect(
        &self,
        integration_id: &str,
        request: &ConnectRequest,
    ) -> Result<ConnectOutcome, ApiError>;

    async fn list_integrations(&self) -> Result<Vec<IntegrationInfo>, ApiError>;
}
