use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::api::IncredibleApi;
use crate::error::ApiError;
use crate::types::{
    ChatCompletion, ChatMessage, ChatRequest, ConnectOutcome, ConnectRequest, ExecuteRequest,
    ExecuteResponse, FunctionCall, FunctionItem, IntegrationInfo,
};

#[derive(Clone)]
enum Scripted<T> {
    Ok(T),
    Status(u16),
}

impl<T: Clone> Scripted<T> {
    fn resolve(&self) -> Result<T, ApiError> {
        match self {
            Scripted::Ok(value) => Ok(value.clone()),
            Scripted::Status(status) => Err(ApiError::Http {
                status: *status,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

/// Scripted stand-in for the hosted API.
///
/// Chat responses are consumed in order. Execute responses are queued per
/// feature name and the last one is repeated once the queue runs dry; a
/// feature with nothing queued answers `{"result": {}}`.
#[derive(Clone, Default)]
pub struct MockApi {
    chat_responses: Arc<Mutex<VecDeque<Scripted<ChatCompletion>>>>,
    execute_responses: Arc<Mutex<HashMap<String, VecDeque<Scripted<Value>>>>>,
    connect_outcome: Arc<Mutex<Option<ConnectOutcome>>>,
    integrations: Arc<Mutex<Option<Scripted<Value>>>>,
    chat_history: Arc<Mutex<Vec<ChatRequest>>>,
    execute_history: Arc<Mutex<Vec<(String, ExecuteRequest)>>>,
    connect_history: Arc<Mutex<Vec<(String, ConnectRequest)>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_completion(&self, completion: ChatCompletion) {
        self.chat_responses.lock().unwrap().push_back(Scripted::Ok(completion));
    }

    pub fn add_text_response(&self, content: &str) {
        self.add_completion(ChatCompletion {
            items: vec![ChatMessage::assistant(content).into()],
            thinking: None,
        });
    }

    pub fn add_function_call_response(&self, call_id: &str, calls: &[(&str, Value)]) {
        let function_calls = calls
            .iter()
            .map(|(name, input)| FunctionCall {
                name: name.to_string(),
                input: input.clone(),
            })
            .collect();
        self.add_completion(ChatCompletion {
            items: vec![
                FunctionItem::FunctionCall {
                    function_call_id: call_id.to_string(),
                    function_calls,
                }
                .into(),
            ],
            thinking: None,
        });
    }

    pub fn add_chat_error(&self, status: u16) {
        self.chat_responses.lock().unwrap().push_back(Scripted::Status(status));
    }

    /// Queues a raw execute body, parsed the way the real client would.
    pub fn on_execute(&self, feature: &str, body: Value) {
        self.execute_responses
            .lock()
            .unwrap()
            .entry(feature.to_string())
            .or_default()
            .push_back(Scripted::Ok(body));
    }

    pub fn fail_execute(&self, feature: &str, status: u16) {
        self.execute_responses
            .lock()
            .unwrap()
            .entry(feature.to_string())
            .or_default()
            .push_back(Scripted::Status(status));
    }

    pub fn set_connect_outcome(&self, outcome: ConnectOutcome) {
        *self.connect_outcome.lock().unwrap() = Some(outcome);
    }

    pub fn set_integrations(&self, body: Value) {
        *self.integrations.lock().unwrap() = Some(Scripted::Ok(body));
    }

    pub fn fail_integrations(&self, status: u16) {
        *self.integrations.lock().unwrap() = Some(Scripted::Status(status));
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_history.lock().unwrap().clone()
    }

    pub fn executions(&self) -> Vec<(String, ExecuteRequest)> {
        self.execute_history.lock().unwrap().clone()
    }

    pub fn executions_for(&self, feature: &str) -> Vec<ExecuteRequest> {
        self.executions()
            .into_iter()
            .filter(|(_, r)| r.feature_name == feature)
            .map(|(_, r)| r)
            .collect()
    }

    pub fn connections(&self) -> Vec<(String, ConnectRequest)> {
        self.connect_history.lock().unwrap().clone()
    }

    fn next_execute(&self, feature: &str) -> Scripted<Value> {
        let mut responses = self.execute_responses.lock().unwrap();
        match responses.get_mut(feature) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Scripted::Ok(json!({"result": {}})),
        }
    }
}

#[async_trait]
impl IncredibleApi for MockApi {
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatCompletion, ApiError> {
        self.chat_history.lock().unwrap().push(request.clone());
        match self.chat_responses.lock().unwrap().pop_front() {
            Some(scripted) => scripted.resolve(),
            None => Ok(ChatCompletion {
                items: vec![ChatMessage::assistant("No more mock responses configured").into()],
                thinking: None,
            }),
        }
    }

    async fn execute(
        &self,
        integration_id: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, ApiError> {
        self.execute_history
            .lock()
            .unwrap()
            .push((integration_id.to_string(), request.clone()));
        let body = self.next_execute(&request.feature_name).resolve()?;
        ExecuteResponse::from_json(body)
    }

    async fn connect(
        &self,
        integration_id: &str,
        request: &ConnectRequest,
    ) -> Result<ConnectOutcome, ApiError> {
        self.connect_history
            .lock()
            .unwrap()
            .push((integration_id.to_string(), request.clone()));
        Ok(self
            .connect_outcome
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(ConnectOutcome::Linked))
    }

    async fn list_integrations(&self) -> Result<Vec<IntegrationInfo>, ApiError> {
        let scripted = self.integrations.lock().unwrap().clone();
        match scripted {
            Some(s) => IntegrationInfo::list_from_json(s.resolve()?),
            None => Ok(Vec::new()),
        }
    }
}
