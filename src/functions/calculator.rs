use serde_json::{Value, json};

use super::{definition, number_arg, string_arg};
use crate::function_registry::FunctionRegistry;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        definition(
            "calculate_sum",
            "Add two numbers together and return the sum",
            two_operand_schema(),
        ),
        calculate_sum,
    );
    registry.register(
        definition("add_numbers", "Add two numbers", two_operand_schema()),
        calculate_sum,
    );
    registry.register(
        definition(
            "calculate_circle_area",
            "Calculate the area of a circle from its radius",
            json!({
                "type": "object",
                "properties": {
                    "radius": { "type": "number", "description": "Radius of the circle" }
                },
                "required": ["radius"]
            }),
        ),
        calculate_circle_area,
    );
}

/// The four-operation calculator offered alongside the clock and weather.
pub fn register_operations(registry: &mut FunctionRegistry) {
    registry.register(
        definition(
            "calculate_operation",
            "Perform basic math operations: add, subtract, multiply, divide",
            json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["add", "subtract", "multiply", "divide"],
                        "description": "The math operation to perform"
                    },
                    "a": { "type": "number", "description": "First number" },
                    "b": { "type": "number", "description": "Second number" }
                },
                "required": ["operation", "a", "b"]
            }),
        ),
        calculate_operation,
    );
}

fn two_operand_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": { "type": "number", "description": "First number" },
            "b": { "type": "number", "description": "Second number" }
        },
        "required": ["a", "b"]
    })
}

pub fn calculate_sum(input: &Value) -> Result<Value, String> {
    let a = number_arg(input, "a")?;
    let b = number_arg(input, "b")?;
    Ok(json!(a + b))
}

/// Non-positive radii produce an error object rather than a failure.
pub fn calculate_circle_area(input: &Value) -> Result<Value, String> {
    let radius = number_arg(input, "radius")?;
    if radius <= 0.0 {
        return Ok(json!({ "error": "Radius must be positive" }));
    }
    let area = (std::f64::consts::PI * radius * radius * 100.0).round() / 100.0;
    Ok(json!({
        "radius": radius,
        "area": area,
        "formula": "π × radius²"
    }))
}

pub fn calculate_operation(input: &Value) -> Result<Value, String> {
    let operation = string_arg(input, "operation")?.to_lowercase();
    let a = number_arg(input, "a")?;
    let b = number_arg(input, "b")?;
    let result = match operation.as_str() {
        "add" => a + b,
        "subtract" => a - b,
        "multiply" => a * b,
        "divide" if b == 0.0 => return Ok(json!({ "error": "Division by zero" })),
        "divide" => a / b,
        other => return Ok(json!({ "error": format!("Unknown operation: {other}") })),
    };
    Ok(json!({ "operation": operation, "a": a, "b": b, "result": result }))
}
