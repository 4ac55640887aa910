use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::utils::clip;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: String, // "user" | "assistant" | "system"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}

/// A callable function advertised to the hosted model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON schema
}

/// One model-requested invocation inside a `function_call` item.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunctionItem {
    FunctionCall {
        #[serde(default)]
        function_call_id: String,
        function_calls: Vec<FunctionCall>,
    },
    FunctionCallResult {
        #[serde(default)]
        function_call_id: String,
        function_call_results: Vec<Value>,
    },
}

/// Anything that can appear in `messages` or in `result.response`.
///
/// Function items carry a `type` tag and are tried first; everything else
/// falls back to a plain role/content message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ConversationItem {
    Function(FunctionItem),
    Message(ChatMessage),
}

impl ConversationItem {
    pub fn as_message(&self) -> Option<&ChatMessage> {
        match self {
            ConversationItem::Message(m) => Some(m),
            ConversationItem::Function(_) => None,
        }
    }
}

impl From<ChatMessage> for ConversationItem {
    fn from(message: ChatMessage) -> Self {
        ConversationItem::Message(message)
    }
}

impl From<FunctionItem> for ConversationItem {
    fn from(item: FunctionItem) -> Self {
        ConversationItem::Function(item)
    }
}

/// Enables a connected integration (and a subset of its features) inside a
/// chat completion.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IntegrationSpec {
    pub id: String,
    pub features: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ConversationItem>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<IntegrationSpec>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ConversationItem>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
            system: None,
            functions: Vec::new(),
            integrations: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_functions(mut self, functions: Vec<FunctionDefinition>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_integrations(mut self, integrations: Vec<IntegrationSpec>) -> Self {
        self.integrations = integrations;
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Parsed non-streaming chat completion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatCompletion {
    pub items: Vec<ConversationItem>,
    pub thinking: Option<Value>,
}

impl ChatCompletion {
    /// Accepts `{result: {response: [...]}}`, `{response: [...]}` and
    /// `{result: "text"}`.
    pub fn from_json(body: Value) -> Result<Self, ApiError> {
        let inner = body.get("result").unwrap_or(&body);
        match inner {
            Value::String(text) => Ok(Self {
                items: vec![ChatMessage::assistant(text.clone()).into()],
                thinking: None,
            }),
            Value::Object(map) if map.contains_key("response") => {
                let items: Vec<ConversationItem> = serde_json::from_value(map["response"].clone())?;
                let thinking = map.get("thinking").filter(|v| !v.is_null()).cloned();
                Ok(Self { items, thinking })
            }
            _ => Err(ApiError::UnexpectedResponse(clip(&body.to_string(), 200))),
        }
    }

    pub fn assistant_message(&self) -> Option<&ChatMessage> {
        self.items
            .iter()
            .filter_map(ConversationItem::as_message)
            .find(|m| m.is_assistant() && m.content.is_some())
    }

    /// Text of the assistant reply, falling back to the first message that
    /// carries any content.
    pub fn text(&self) -> Option<&str> {
        self.assistant_message()
            .or_else(|| {
                self.items
                    .iter()
                    .filter_map(ConversationItem::as_message)
                    .find(|m| m.content.is_some())
            })
            .and_then(|m| m.content.as_deref())
    }

    pub fn function_call(&self) -> Option<(&str, &[FunctionCall])> {
        self.items.iter().find_map(|item| match item {
            ConversationItem::Function(FunctionItem::FunctionCall {
                function_call_id,
                function_calls,
            }) => Some((function_call_id.as_str(), function_calls.as_slice())),
            _ => None,
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExecuteRequest {
    pub user_id: String,
    pub feature_name: String,
    pub inputs: Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub success: Option<bool>,
}

impl ExecuteResponse {
    pub fn from_json(body: Value) -> Result<Self, ApiError> {
        match body {
            Value::Object(_) => Ok(serde_json::from_value(body)?),
            Value::Null => Ok(Self::default()),
            other => Ok(Self {
                result: other,
                success: None,
            }),
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.result.get(key).filter(|v| !v.is_null())
    }

    /// String field of `result`; numeric ids are stringified.
    pub fn str_field(&self, key: &str) -> Option<String> {
        match self.field(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A missing flag counts as success; only an explicit `false` fails.
    pub fn succeeded(&self) -> bool {
        let nested = self.result.get("success").and_then(Value::as_bool);
        self.success.unwrap_or(true) && nested.unwrap_or(true)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConnectRequest {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConnectOutcome {
    /// OAuth integrations: the user must finish the flow at this URL.
    Redirect(String),
    /// API-key integrations linked immediately.
    Linked,
    Rejected(String),
}

impl ConnectOutcome {
    pub fn from_json(body: &Value) -> Self {
        let inner = match body.get("result") {
            Some(r) if r.is_object() => r,
            _ => body,
        };
        if let Some(url) = inner.get("redirect_url").and_then(Value::as_str) {
            return ConnectOutcome::Redirect(url.to_string());
        }
        if inner.get("success").and_then(Value::as_bool) == Some(true) {
            return ConnectOutcome::Linked;
        }
        let message = ["error", "message", "detail"]
            .iter()
            .find_map(|k| inner.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| clip(&body.to_string(), 200));
        ConnectOutcome::Rejected(message)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IntegrationInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "feature_names")]
    pub features: Vec<String>,
}

impl IntegrationInfo {
    /// Accepts a bare array, `{integrations: [...]}`, `{result: [...]}` or an
    /// object keyed by integration id.
    pub fn list_from_json(body: Value) -> Result<Vec<Self>, ApiError> {
        let mut current = body;
        for key in ["result", "integrations"] {
            if let Some(inner) = current.get(key) {
                current = inner.clone();
            }
        }
        match current {
            Value::Array(_) => Ok(serde_json::from_value(current)?),
            Value::Object(map) => map
                .into_iter()
                .map(|(id, mut info)| {
                    if let Value::Object(fields) = &mut info {
                        fields.entry("id").or_insert(Value::String(id));
                    }
                    serde_json::from_value(info).map_err(ApiError::from)
                })
                .collect(),
            other => Err(ApiError::UnexpectedResponse(clip(&other.to_string(), 200))),
        }
    }
}

// Features come back either as plain names or as `{name, description}` objects.
fn feature_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Value> = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect())
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Conversation {
    pub id: String,
    pub items: Vec<ConversationItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: Option<String>,
    pub model: Option<String>,
}
