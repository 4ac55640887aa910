use chrono::{DateTime, FixedOffset, Local, Utc};
use serde_json::{Value, json};

use super::{definition, text_arg};
use crate::function_registry::FunctionRegistry;

/// Zones the model may ask for, with their offset from UTC in hours.
pub const ZONES: &[(&str, i32)] = &[("UTC", 0), ("EST", -5), ("PST", -8), ("JST", 9), ("GMT", 0)];

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        definition(
            "get_current_time",
            "Get the current time, in local time or in one of UTC, EST, PST, JST or GMT",
            json!({
                "type": "object",
                "properties": {
                    "timezone": {
                        "type": "string",
                        "enum": ZONES.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
                        "description": "Timezone to report; local time when omitted"
                    }
                },
                "required": []
            }),
        ),
        get_current_time,
    );
}

pub fn get_current_time(input: &Value) -> Result<Value, String> {
    match text_arg(input, "timezone") {
        None => Ok(json!({
            "time": Local::now().format(FORMAT).to_string(),
            "timezone": "Local"
        })),
        Some(zone) => Ok(match time_in_zone(&zone, Utc::now()) {
            Some(time) => json!({ "time": time, "timezone": zone.to_uppercase() }),
            None => json!({ "error": unsupported_zone(&zone) }),
        }),
    }
}

/// Formats `now` in a named zone; `None` for zones outside [`ZONES`].
pub fn time_in_zone(zone: &str, now: DateTime<Utc>) -> Option<String> {
    let hours = ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(zone.trim()))
        .map(|(_, hours)| *hours)?;
    let offset = FixedOffset::east_opt(hours * 3600)?;
    Some(now.with_timezone(&offset).format(FORMAT).to_string())
}

fn unsupported_zone(zone: &str) -> String {
    let names: Vec<_> = ZONES.iter().map(|(name, _)| *name).collect();
    format!("Timezone '{zone}' not supported. Available: {}", names.join(", "))
}
