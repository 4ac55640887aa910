use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::warn;

use crate::config::Config;
use crate::functions;
use crate::functions::dungeon::{self, Game, RandomDice, SharedGame};
use crate::functions::stocks::{FileMarketData, MarketData};
use crate::functions::writer::{self, Workspace};
use crate::types::FunctionDefinition;

pub type FunctionHandler = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Definitions advertised to the model, in registration order, plus the
/// handlers that run them locally.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    definitions: Vec<FunctionDefinition>,
    handlers: HashMap<String, FunctionHandler>,
}

pub const PRESETS: &[&str] = &[
    "calculator",
    "assistant",
    "toolkit",
    "extraction",
    "scheduling",
    "stocks",
    "dungeon",
    "writer",
];

pub const MARKET_DATA_DIR: &str = "MARKET_DATA_DIR";
pub const DUNGEON_SAVE_FILE: &str = "DUNGEON_SAVE_FILE";
pub const ARTIFACTS_DIR: &str = "ARTIFACTS_DIR";

/// Where the file-backed function sets keep their data.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetPaths {
    pub market_data: PathBuf,
    pub save_file: PathBuf,
    pub artifacts: PathBuf,
}

impl Default for PresetPaths {
    fn default() -> Self {
        Self {
            market_data: PathBuf::from("market_data"),
            save_file: PathBuf::from(dungeon::DEFAULT_SAVE_FILE),
            artifacts: PathBuf::from(writer::DEFAULT_ARTIFACTS_DIR),
        }
    }
}

impl PresetPaths {
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| config.get(key).map_or(default, PathBuf::from);
        Self {
            market_data: path(MARKET_DATA_DIR, defaults.market_data),
            save_file: path(DUNGEON_SAVE_FILE, defaults.save_file),
            artifacts: path(ARTIFACTS_DIR, defaults.artifacts),
        }
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a name twice replaces the earlier definition and handler.
    pub fn register<F>(&mut self, definition: FunctionDefinition, handler: F)
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.definitions.retain(|d| d.name != definition.name);
        self.handlers.insert(definition.name.clone(), Arc::new(handler));
        self.definitions.push(definition);
    }

    pub fn definitions(&self) -> &[FunctionDefinition] {
        &self.definitions
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Runs `name`. Failures come back as `{"error": ...}` so they can be
    /// returned to the model like any other result.
    pub fn call(&self, name: &str, input: &Value) -> Value {
        let Some(handler) = self.handlers.get(name) else {
            warn!(function = name, "model requested an unknown function");
            return json!({ "error": format!("Unknown function: {name}") });
        };
        match handler(input) {
            Ok(value) => value,
            Err(msg) => {
                warn!(function = name, error = %msg, "function failed");
                json!({ "error": format!("Function execution failed: {msg}") })
            }
        }
    }

    pub fn calculator() -> Self {
        let mut registry = Self::new();
        functions::calculator::register(&mut registry);
        registry
    }

    pub fn assistant() -> Self {
        let mut registry = Self::new();
        functions::clock::register(&mut registry);
        functions::weather::register(&mut registry);
        functions::calculator::register(&mut registry);
        registry
    }

    /// Four-operation calculator, zoned clock and weather lookup.
    pub fn toolkit() -> Self {
        let mut registry = Self::new();
        functions::calculator::register_operations(&mut registry);
        functions::weather::register(&mut registry);
        functions::clock::register(&mut registry);
        registry
    }

    pub fn extraction() -> Self {
        let mut registry = Self::new();
        functions::extraction::register(&mut registry);
        registry
    }

    pub fn scheduling() -> Self {
        let mut registry = Self::new();
        functions::scheduling::register(&mut registry);
        registry
    }

    pub fn stocks(market: Arc<dyn MarketData>) -> Self {
        let mut registry = Self::new();
        functions::stocks::register(&mut registry, market);
        registry
    }

    pub fn dungeon(game: SharedGame) -> Self {
        let mut registry = Self::new();
        functions::dungeon::register(&mut registry, game);
        registry
    }

    pub fn writer(workspace: Workspace) -> Self {
        let mut registry = Self::new();
        functions::writer::register(&mut registry, workspace);
        registry
    }

    pub fn preset(name: &str) -> Option<Self> {
        Self::preset_with(name, &PresetPaths::default())
    }

    /// A fresh dungeon game is started here; callers that need to keep the
    /// game handle build it with [`FunctionRegistry::dungeon`].
    pub fn preset_with(name: &str, paths: &PresetPaths) -> Option<Self> {
        match name {
            "calculator" => Some(Self::calculator()),
            "assistant" => Some(Self::assistant()),
            "toolkit" => Some(Self::toolkit()),
            "extraction" => Some(Self::extraction()),
            "scheduling" => Some(Self::scheduling()),
            "stocks" => Some(Self::stocks(Arc::new(FileMarketData::new(paths.market_data.clone())))),
            "dungeon" => Some(Self::dungeon(
                Game::new(Box::new(RandomDice), paths.save_file.clone()).shared(),
            )),
            "writer" => Some(Self::writer(Workspace::new(paths.artifacts.clone()))),
            _ => None,
        }
    }
}
