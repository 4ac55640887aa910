pub mod agent;
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod function_registry;
pub mod functions;
pub mod integrations;
pub mod retry;
pub mod session;
pub mod sse;
pub mod types;
pub mod utils;
pub mod workflows;

#[cfg(test)]
mod mocks;
#[cfg(test)]
mod tests;
