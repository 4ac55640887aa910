use serde_json::{Value, json};

use super::{definition, string_arg};
use crate::function_registry::FunctionRegistry;

struct Reading {
    city: &'static str,
    temp: &'static str,
    condition: &'static str,
    humidity: &'static str,
}

// Canned data; there is no live weather source behind these functions.
const READINGS: &[Reading] = &[
    Reading { city: "new york", temp: "72°F", condition: "Sunny", humidity: "45%" },
    Reading { city: "london", temp: "15°C", condition: "Cloudy", humidity: "80%" },
    Reading { city: "tokyo", temp: "25°C", condition: "Partly Cloudy", humidity: "60%" },
    Reading { city: "paris", temp: "18°C", condition: "Rainy", humidity: "85%" },
];

// Keyed by display name and matched exactly.
const SUMMARIES: &[(&str, &str)] = &[
    ("New York", "Sunny, 72°F"),
    ("London", "Cloudy, 60°F"),
    ("Tokyo", "Rainy, 68°F"),
    ("Paris", "Partly cloudy, 65°F"),
];

fn city_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "city": { "type": "string", "description": "Name of the city" }
        },
        "required": ["city"]
    })
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        definition(
            "get_weather_info",
            "Get temperature, condition and humidity for a city",
            city_schema(),
        ),
        get_weather_info,
    );
    registry.register(
        definition(
            "get_current_weather",
            "Get a short weather description for a city",
            city_schema(),
        ),
        get_current_weather,
    );
}

/// City lookup ignores case.
pub fn get_weather_info(input: &Value) -> Result<Value, String> {
    let city = string_arg(input, "city")?;
    let key = city.to_lowercase();
    Ok(match READINGS.iter().find(|r| r.city == key) {
        Some(r) => json!({
            "temp": r.temp,
            "condition": r.condition,
            "humidity": r.humidity
        }),
        None => json!({ "error": format!("Weather data not available for {city}") }),
    })
}

pub fn get_current_weather(input: &Value) -> Result<Value, String> {
    let city = string_arg(input, "city")?;
    Ok(match SUMMARIES.iter().find(|(name, _)| *name == city) {
        Some((_, summary)) => json!(summary),
        None => json!(format!("Weather data not available for {city}")),
    })
}
