use std::sync::Arc;

use serde_json::Value;
use tokio::time::{Duration, timeout};
use tracing::{debug, warn};

use crate::api::IncredibleApi;
use crate::config::DEFAULT_MODEL;
use crate::error::ApiError;
use crate::function_registry::FunctionRegistry;
use crate::session::Conversation;
use crate::types::{ChatRequest, FunctionItem};
use crate::utils::clip;

/// Callbacks for surfacing agent progress.
pub trait AgentObserver: Send {
    fn on_message(&mut self, text: &str);
    fn on_function_call(&mut self, name: &str, input: &Value);
    fn on_function_result(&mut self, name: &str, result: &Value);
}

/// Prints progress to the terminal.
pub struct ConsoleObserver;

impl AgentObserver for ConsoleObserver {
    fn on_message(&mut self, text: &str) {
        println!("\n\u{001b}[36m{}\u{001b}[0m", text);
    }

    fn on_function_call(&mut self, name: &str, input: &Value) {
        println!("\n\u{001b}[35m▌🔧 {}\u{001b}[0m", name);
        let pretty = serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());
        println!("\u{001b}[90m{}\u{001b}[0m", pretty);
    }

    fn on_function_result(&mut self, _name: &str, result: &Value) {
        println!("\u{001b}[32m  ↳ {}\u{001b}[0m", clip(&result.to_string(), 400));
    }
}

#[derive(Clone, Debug)]
pub struct AgentOptions {
    pub model: String,
    pub system: Option<String>,
    pub max_steps: usize,
    pub step_timeout: Duration,
    /// Calling any of these ends the run once its result is recorded.
    pub terminal_functions: Vec<String>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system: None,
            max_steps: 10,
            step_timeout: Duration::from_secs(60),
            terminal_functions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Answer(String),
    FunctionsCalled(Vec<String>),
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum StopReason {
    Answered,
    TerminalFunction(String),
    EmptyResponse,
    #[default]
    StepLimit,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentRun {
    pub answer: Option<String>,
    pub steps: usize,
    pub function_calls: Vec<String>,
    pub stopped_by: StopReason,
}

pub struct FunctionAgent {
    api: Arc<dyn IncredibleApi>,
    registry: FunctionRegistry,
    opts: AgentOptions,
}

impl FunctionAgent {
    pub fn new(api: Arc<dyn IncredibleApi>, registry: FunctionRegistry, opts: AgentOptions) -> Self {
        Self { api, registry, opts }
    }

    pub fn max_steps(&self) -> usize {
        self.opts.max_steps
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn request_for(&self, conversation: &Conversation) -> ChatRequest {
        let mut request = ChatRequest::new(&self.opts.model, conversation.items.clone())
            .with_functions(self.registry.definitions().to_vec());
        if let Some(system) = &self.opts.system {
            request = request.with_system(system);
        }
        request
    }

    /// One model round trip. Every requested call is executed in order and
    /// recorded as a call item followed by a result item.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        observer: &mut dyn AgentObserver,
    ) -> anyhow::Result<TurnOutcome> {
        let request = self.request_for(conversation);
        let completion = match timeout(self.opts.step_timeout, self.api.chat_completion(&request)).await {
            Ok(result) => result?,
            Err(_) => return Err(ApiError::Timeout(self.opts.step_timeout).into()),
        };

        let assistant = completion
            .assistant_message()
            .filter(|m| m.content.as_deref().is_some_and(|c| !c.trim().is_empty()))
            .cloned();

        let Some((call_id, calls)) = completion.function_call() else {
            return Ok(match assistant {
                Some(message) => {
                    let text = message.content.clone().unwrap_or_default().trim().to_string();
                    conversation.add_item(message);
                    observer.on_message(&text);
                    TurnOutcome::Answer(text)
                }
                None => TurnOutcome::Empty,
            });
        };

        if let Some(message) = assistant {
            conversation.add_item(message);
        }
        conversation.add_item(FunctionItem::FunctionCall {
            function_call_id: call_id.to_string(),
            function_calls: calls.to_vec(),
        });

        let mut names = Vec::with_capacity(calls.len());
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            debug!(function = %call.name, input = %call.input, "executing function");
            observer.on_function_call(&call.name, &call.input);
            let result = self.registry.call(&call.name, &call.input);
            observer.on_function_result(&call.name, &result);
            names.push(call.name.clone());
            results.push(result);
        }

        conversation.add_item(FunctionItem::FunctionCallResult {
            function_call_id: call_id.to_string(),
            function_call_results: results,
        });
        Ok(TurnOutcome::FunctionsCalled(names))
    }

    pub async fn run(
        &self,
        prompt: &str,
        conversation: &mut Conversation,
        observer: &mut dyn AgentObserver,
    ) -> anyhow::Result<AgentRun> {
        conversation.add_user(prompt);

        let mut run = AgentRun::default();
        for _ in 0..self.opts.max_steps {
            run.steps += 1;
            match self.run_turn(conversation, observer).await? {
                TurnOutcome::Answer(text) => {
                    run.answer = Some(text);
                    run.stopped_by = StopReason::Answered;
                    return Ok(run);
                }
                TurnOutcome::FunctionsCalled(names) => {
                    let terminal = names
                        .iter()
                        .find(|n| self.opts.terminal_functions.contains(n))
                        .cloned();
                    run.function_calls.extend(names);
                    if let Some(name) = terminal {
                        run.stopped_by = StopReason::TerminalFunction(name);
                        return Ok(run);
                    }
                }
                TurnOutcome::Empty => {
                    run.stopped_by = StopReason::EmptyResponse;
                    return Ok(run);
                }
            }
        }

        warn!(max_steps = self.opts.max_steps, "step limit reached without a final answer");
        run.stopped_by = StopReason::StepLimit;
        Ok(run)
    }
}
