use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::RETRY_AFTER;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Duration;
use tracing::debug;

use crate::api::IncredibleApi;
use crate::config::Config;
use crate::error::ApiError;
use crate::retry::RetryPolicy;
use crate::sse::{SseDecoder, StreamEvent};
use crate::types::{
    ChatCompletion, ChatRequest, ConnectOutcome, ConnectRequest, ExecuteRequest, ExecuteResponse,
    IntegrationInfo,
};
use crate::utils::clip;

const CHAT_COMPLETION_PATH: &str = "/v1/chat-completion";
const INTEGRATIONS_PATH: &str = "/v1/integrations";

/// Aggregate of a streamed completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSummary {
    pub content: String,
    pub thinking: String,
    pub chunks: usize,
    pub completed: bool,
}

impl StreamSummary {
    fn absorb(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Chunk { content, .. } if event.is_thinking() => {
                self.thinking.push_str(content);
                self.chunks += 1;
            }
            StreamEvent::Chunk { content, .. } => {
                self.content.push_str(content);
                self.chunks += 1;
            }
            StreamEvent::Done => self.completed = true,
        }
    }
}

#[derive(Clone)]
pub struct IncredibleClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl IncredibleClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::new(&config.base_url, &config.api_key, config.timeout)?
            .with_retry(RetryPolicy::with_attempts(config.max_retries.max(1))))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        self.retry
            .run(path, || {
                send_json(self.http.post(&url).bearer_auth(&self.api_key).json(body))
            })
            .await
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        self.retry
            .run(path, || send_json(self.http.get(&url).bearer_auth(&self.api_key)))
            .await
    }

    /// Streams a completion, handing every event to `on_event` as it arrives.
    /// Only the initial request is retried; a broken stream is an error.
    pub async fn chat_completion_stream<F>(
        &self,
        request: &ChatRequest,
        mut on_event: F,
    ) -> Result<StreamSummary, ApiError>
    where
        F: FnMut(&StreamEvent),
    {
        let mut request = request.clone();
        request.stream = true;
        let url = self.url(CHAT_COMPLETION_PATH);
        debug!(%url, model = %request.model, "POST (stream)");

        let resp = self
            .retry
            .run(CHAT_COMPLETION_PATH, || {
                send_checked(self.http.post(&url).bearer_auth(&self.api_key).json(&request))
            })
            .await?;

        let mut stream = resp.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut summary = StreamSummary::default();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            for event in decoder.push(&bytes) {
                summary.absorb(&event);
                on_event(&event);
            }
            if decoder.is_finished() {
                break;
            }
        }
        for event in decoder.finish() {
            summary.absorb(&event);
            on_event(&event);
        }
        debug!(chunks = summary.chunks, completed = summary.completed, "stream finished");
        Ok(summary)
    }
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    debug!(status = status.as_u16(), "response");
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(ApiError::RateLimited { retry_after });
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Http {
        status: status.as_u16(),
        body: clip(&body, 500),
    })
}

async fn send_checked(request: RequestBuilder) -> Result<Response, ApiError> {
    check_status(request.send().await?).await
}

async fn send_json(request: RequestBuilder) -> Result<Value, ApiError> {
    let resp = send_checked(request).await?;
    let text = resp.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl IncredibleApi for IncredibleClient {
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatCompletion, ApiError> {
        let mut request = request.clone();
        request.stream = false;
        let body = self.post_json(CHAT_COMPLETION_PATH, &request).await?;
        ChatCompletion::from_json(body)
    }

    async fn execute(
        &self,
        integration_id: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, ApiError> {
        let path = format!("{INTEGRATIONS_PATH}/{integration_id}/execute");
        let body = self.post_json(&path, request).await?;
        ExecuteResponse::from_json(body)
    }

    async fn connect(
        &self,
        integration_id: &str,
        request: &ConnectRequest,
    ) -> Result<ConnectOutcome, ApiError> {
        let path = format!("{INTEGRATIONS_PATH}/{integration_id}/connect");
        let body = self.post_json(&path, request).await?;
        Ok(ConnectOutcome::from_json(&body))
    }

    async fn list_integrations(&self) -> Result<Vec<IntegrationInfo>, ApiError> {
        let body = self.get_json(INTEGRATIONS_PATH).await?;
        IntegrationInfo::list_from_json(body)
    }
}
