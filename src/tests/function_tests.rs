use crate::function_registry::*;
use crate::functions::{calculator, clock, extraction, scheduling, weather};
use crate::types::FunctionDefinition;
use chrono::{TimeZone, Utc};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_register_expected_functions() {
        assert_eq!(
            FunctionRegistry::calculator().names(),
            vec!["calculate_sum", "add_numbers", "calculate_circle_area"]
        );
        let assistant = FunctionRegistry::assistant();
        assert!(assistant.contains("get_current_time"));
        assert!(assistant.contains("get_weather_info"));
        assert!(assistant.contains("calculate_sum"));
        assert_eq!(FunctionRegistry::scheduling().len(), 5);
        assert_eq!(FunctionRegistry::extraction().len(), 3);
        assert_eq!(
            FunctionRegistry::toolkit().names(),
            vec!["calculate_operation", "get_weather_info", "get_current_weather", "get_current_time"]
        );
        for name in PRESETS {
            assert!(FunctionRegistry::preset(name).is_some(), "missing preset {name}");
        }
        assert_eq!(FunctionRegistry::preset("stocks").unwrap().len(), 3);
        assert_eq!(FunctionRegistry::preset("dungeon").unwrap().len(), 7);
        assert!(FunctionRegistry::preset("writer").unwrap().contains("get_current_time"));
        assert!(FunctionRegistry::preset("nope").is_none());
    }

    #[test]
    fn test_registering_twice_replaces() {
        let mut registry = FunctionRegistry::new();
        let definition = FunctionDefinition {
            name: "echo".to_string(),
            description: "first".to_string(),
            parameters: json!({"type": "object"}),
        };
        registry.register(definition.clone(), |_| Ok(json!(1)));
        registry.register(
            FunctionDefinition {
                description: "second".to_string(),
                ..definition
            },
            |_| Ok(json!(2)),
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.definitions()[0].description, "second");
        assert_eq!(registry.call("echo", &json!({})), json!(2));
    }

    #[test]
    fn test_call_error_objects() {
        let registry = FunctionRegistry::calculator();
        assert_eq!(
            registry.call("nope", &json!({})),
            json!({"error": "Unknown function: nope"})
        );
        assert_eq!(
            registry.call("calculate_sum", &json!({"a": 1})),
            json!({"error": "Function execution failed: missing argument 'b'"})
        );
    }

    #[test]
    fn test_calculator_functions() {
        assert_eq!(calculator::calculate_sum(&json!({"a": 2, "b": "3.5"})).unwrap(), json!(5.5));

        let area = calculator::calculate_circle_area(&json!({"radius": 2})).unwrap();
        assert_eq!(area["area"], json!(12.57));
        assert_eq!(area["formula"], "π × radius²");

        let negative = calculator::calculate_circle_area(&json!({"radius": -1})).unwrap();
        assert_eq!(negative, json!({"error": "Radius must be positive"}));
    }

    #[test]
    fn test_calculate_operation() {
        let quotient = calculator::calculate_operation(&json!({"operation": "Divide", "a": 9, "b": "3"})).unwrap();
        assert_eq!(quotient, json!({"operation": "divide", "a": 9.0, "b": 3.0, "result": 3.0}));

        let product = calculator::calculate_operation(&json!({"operation": "multiply", "a": 2.5, "b": 4})).unwrap();
        assert_eq!(product["result"], json!(10.0));
        let difference = calculator::calculate_operation(&json!({"operation": "subtract", "a": 1, "b": 4})).unwrap();
        assert_eq!(difference["result"], json!(-3.0));

        assert_eq!(
            calculator::calculate_operation(&json!({"operation": "divide", "a": 1, "b": 0})).unwrap(),
            json!({"error": "Division by zero"})
        );
        assert_eq!(
            calculator::calculate_operation(&json!({"operation": "modulo", "a": 1, "b": 2})).unwrap(),
            json!({"error": "Unknown operation: modulo"})
        );
        assert!(calculator::calculate_operation(&json!({"operation": "add", "a": 1})).is_err());
    }

    #[test]
    fn test_time_in_named_zones() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        assert_eq!(clock::time_in_zone("JST", now).as_deref(), Some("2024-01-02 05:00:00"));
        assert_eq!(clock::time_in_zone("est", now).as_deref(), Some("2024-01-01 15:00:00"));
        assert_eq!(clock::time_in_zone("GMT", now).as_deref(), Some("2024-01-01 20:00:00"));
        assert!(clock::time_in_zone("CET", now).is_none());

        let pacific = clock::get_current_time(&json!({"timezone": "pst"})).unwrap();
        assert_eq!(pacific["timezone"], "PST");
        assert_eq!(pacific["time"].as_str().unwrap().len(), 19);

        let local = clock::get_current_time(&json!({})).unwrap();
        assert_eq!(local["timezone"], "Local");

        assert_eq!(
            clock::get_current_time(&json!({"timezone": "Mars"})).unwrap(),
            json!({"error": "Timezone 'Mars' not supported. Available: UTC, EST, PST, JST, GMT"})
        );
    }

    #[test]
    fn test_weather_lookups() {
        let info = weather::get_weather_info(&json!({"city": "new YORK"})).unwrap();
        assert_eq!(info, json!({"temp": "72°F", "condition": "Sunny", "humidity": "45%"}));
        let london = weather::get_weather_info(&json!({"city": "London"})).unwrap();
        assert_eq!(london["temp"], "15°C");

        let unknown = weather::get_weather_info(&json!({"city": "Atlantis"})).unwrap();
        assert_eq!(unknown, json!({"error": "Weather data not available for Atlantis"}));

        let current = |city: &str| weather::get_current_weather(&json!({ "city": city })).unwrap();
        assert_eq!(current(" New York "), json!("Sunny, 72°F"));
        assert_eq!(current("London"), json!("Cloudy, 60°F"));
        assert_eq!(current("Tokyo"), json!("Rainy, 68°F"));
        assert_eq!(current("Paris"), json!("Partly cloudy, 65°F"));
        assert_eq!(current("london"), json!("Weather data not available for london"));
    }

    #[test]
    fn test_extraction_normalises_values() {
        let person = extraction::extract_person_info(&json!({
            "name": "Sarah Johnson",
            "age": "28 years old",
            "city": "San Francisco",
            "occupation": "Engineer",
            "email": "sarah@example.com"
        }))
        .unwrap();
        assert_eq!(person["age"], json!(28));
        assert_eq!(person["contact"], json!({"email": "sarah@example.com"}));

        let business = extraction::extract_business_info(&json!({
            "company": "TechCorp",
            "industry": "Software",
            "employees": "about 500",
            "location": "Austin"
        }))
        .unwrap();
        assert_eq!(business["employee_count"], json!(500));
        assert!(business.get("financial").is_none());

        let product = extraction::extract_product_info(&json!({
            "name": "Laptop Pro",
            "category": "Electronics",
            "price": "$1,299.99",
            "description": "Fast",
            "rating": "4.5 stars"
        }))
        .unwrap();
        assert_eq!(product["product_name"], "Laptop Pro");
        assert_eq!(product["price"], json!(1299.99));
        assert_eq!(product["metadata"]["rating"], json!(4.5));
    }

    #[test]
    fn test_scheduling_functions() {
        let busy = scheduling::check_calendar_availability(&json!({
            "date": "2024-01-15", "time": "14:00", "duration_hours": 1
        }))
        .unwrap();
        assert_eq!(busy["available"], false);

        let free = scheduling::check_calendar_availability(&json!({
            "date": "2024-01-17", "time": "11:00", "duration_hours": 2
        }))
        .unwrap();
        assert_eq!(free["slot"], "2024-01-17 11:00 for 2 hours");

        let invite = scheduling::send_meeting_invitation(&json!({
            "event_id": "event_1",
            "title": "Kickoff",
            "attendees": "a@x.com, b@x.com",
            "date": "2024-01-17",
            "time": "11:00"
        }))
        .unwrap();
        assert_eq!(invite["emails_sent"], 2);
        assert_eq!(invite["meeting_details"]["link"], scheduling::DEFAULT_MEETING_LINK);

        let tasks = scheduling::create_follow_up_tasks(&json!({
            "meeting_title": "Kickoff",
            "attendees": ["a@x.com", "b@x.com", "c@x.com"],
            "due_date": "2024-01-16"
        }))
        .unwrap();
        assert_eq!(tasks["tasks_created"], 3);
        assert_eq!(tasks["tasks"][2]["assigned_to"], "c@x.com");
    }
}
