pub mod mock_api;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::workflows::WorkflowContext;
use mock_api::MockApi;

/// Workflow context over `mock` with no pause between calls. `settings` are
/// added on top of an API key and user id.
pub fn test_context(mock: &MockApi, settings: &[(&str, &str)]) -> WorkflowContext {
    let mut values: HashMap<String, String> = settings
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    values.entry("INCREDIBLE_API_KEY".to_string()).or_insert_with(|| "test-key".to_string());
    values.entry("USER_ID".to_string()).or_insert_with(|| "user-1".to_string());
    let config = Config::from_lookup(|key| values.get(key).cloned()).unwrap();
    WorkflowContext::new(Arc::new(mock.clone()), config)
        .unwrap()
        .with_pause(Duration::ZERO)
}
