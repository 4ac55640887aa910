//! Settings loaded from the environment, optionally seeded from a `.env` file.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.incredible.one";
pub const DEFAULT_MODEL: &str = "small-1";

pub const API_KEY: &str = "INCREDIBLE_API_KEY";
pub const BASE_URL: &str = "INCREDIBLE_BASE_URL";
pub const MODEL: &str = "INCREDIBLE_MODEL";
pub const USER_ID: &str = "USER_ID";
pub const TIMEOUT_SECS: &str = "INCREDIBLE_TIMEOUT_SECS";
pub const MAX_RETRIES: &str = "INCREDIBLE_MAX_RETRIES";
pub const RATE_LIMIT_PAUSE_MS: &str = "RATE_LIMIT_PAUSE_MS";

// Everything the crate reads. Workflow sections look their keys up later.
const KNOWN_KEYS: &[&str] = &[
    API_KEY,
    BASE_URL,
    MODEL,
    USER_ID,
    TIMEOUT_SECS,
    MAX_RETRIES,
    RATE_LIMIT_PAUSE_MS,
    "LEADS_SHEET_ID",
    "MIN_LEAD_SCORE",
    "COMPANY_NAME",
    "ASANA_PROJECT_ID",
    "CALENDAR_ID",
    "MEETING_TIMEZONE",
    "EMAIL_LOG_SHEET_ID",
    "RESEARCH_SHEET_ID",
    "REPORT_RECIPIENTS",
    "CONTENT_FOLDER_ID",
    "CONTENT_TEAM_EMAILS",
    "CONTENT_TYPES",
    "TARGET_AUDIENCE",
    "DASHBOARD_SHEET_ID",
    "COMPANY_SYMBOLS",
    "MARKET_SECTORS",
    "MARKET_DATA_DIR",
    "DUNGEON_SAVE_FILE",
    "ARTIFACTS_DIR",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub user_id: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Spacing between calls in workflow batch loops.
    pub rate_limit_pause: Duration,
    values: HashMap<String, String>,
}

impl Config {
    /// Reads the process environment. Values from `./.env` fill in keys the
    /// environment does not define.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dotenv = load_dotenv(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values: HashMap<String, String> = KNOWN_KEYS
            .iter()
            .filter_map(|key| {
                lookup(key)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v))
            })
            .collect();

        let mut config = Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            user_id: None,
            timeout: Duration::from_secs(60),
            max_retries: 3,
            rate_limit_pause: Duration::from_millis(1000),
            values,
        };
        config.api_key = config.require(API_KEY)?.to_string();
        config.base_url = config.get_or(BASE_URL, DEFAULT_BASE_URL);
        config.model = config.get_or(MODEL, DEFAULT_MODEL);
        config.user_id = config.get(USER_ID).map(str::to_string);
        config.timeout = Duration::from_secs(config.parse_or(TIMEOUT_SECS, 60)?);
        config.max_retries = config.parse_or(MAX_RETRIES, 3)?;
        config.rate_limit_pause = Duration::from_millis(config.parse_or(RATE_LIMIT_PAUSE_MS, 1000)?);
        Ok(config)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Comma separated list; blank entries are dropped.
    pub fn list(&self, key: &str, default: &str) -> Vec<String> {
        self.get(key)
            .unwrap_or(default)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    pub fn user_id(&self) -> Result<&str, ConfigError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| ConfigError::Missing(USER_ID.to_string()))
    }
}

/// Missing files yield an empty map.
pub fn read_dotenv(path: &Path) -> io::Result<HashMap<String, String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(parse_dotenv(&text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(e) => Err(e),
    }
}

/// Like `read_dotenv`, but an unreadable file is logged and treated as empty.
pub fn load_dotenv(path: &Path) -> HashMap<String, String> {
    match read_dotenv(path) {
        Ok(values) => values,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read .env file, ignoring it");
            HashMap::new()
        }
    }
}

pub fn parse_dotenv(text: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        out.insert(key.to_string(), unquote(value.trim()));
    }
    out
}

fn unquote(value: &str) -> String {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    // Unquoted values may carry a trailing comment.
    match value.find(" #") {
        Some(idx) => value[..idx].trim_end().to_string(),
        None => value.to_string(),
    }
}
