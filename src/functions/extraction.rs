//! Normalises loosely typed values the model pulls out of free text.

use serde_json::{Map, Value, json};

use super::{definition, string_arg, text_arg};
use crate::extract::{first_number, parse_price, parse_rating};
use crate::function_registry::FunctionRegistry;

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        definition(
            "extract_person_info",
            "Structure information about a person mentioned in the text",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Full name" },
                    "age": { "type": "integer", "description": "Age in years" },
                    "city": { "type": "string", "description": "City of residence" },
                    "occupation": { "type": "string", "description": "Job or role" },
                    "email": { "type": "string", "description": "Email address" },
                    "phone": { "type": "string", "description": "Phone number" }
                },
                "required": ["name", "city", "occupation"]
            }),
        ),
        extract_person_info,
    );
    registry.register(
        definition(
            "extract_business_info",
            "Structure information about a company mentioned in the text",
            json!({
                "type": "object",
                "properties": {
                    "company": { "type": "string", "description": "Company name" },
                    "industry": { "type": "string", "description": "Industry or sector" },
                    "employees": { "type": "string", "description": "Employee count, possibly approximate" },
                    "location": { "type": "string", "description": "Headquarters location" },
                    "revenue": { "type": "string", "description": "Annual revenue" },
                    "founded": { "type": "integer", "description": "Year founded" }
                },
                "required": ["company", "industry", "location"]
            }),
        ),
        extract_business_info,
    );
    registry.register(
        definition(
            "extract_product_info",
            "Structure information about a product mentioned in the text",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Product name" },
                    "category": { "type": "string", "description": "Product category" },
                    "price": { "type": "string", "description": "Price, with or without currency symbol" },
                    "description": { "type": "string", "description": "Short description" },
                    "rating": { "type": "string", "description": "Rating such as '4.5 stars'" },
                    "availability": { "type": "string", "description": "Stock status" }
                },
                "required": ["name", "category", "description"]
            }),
        ),
        extract_product_info,
    );
}

fn optional_section(target: &mut Map<String, Value>, key: &str, section: Map<String, Value>) {
    if !section.is_empty() {
        target.insert(key.to_string(), Value::Object(section));
    }
}

pub fn extract_person_info(input: &Value) -> Result<Value, String> {
    let age = text_arg(input, "age").and_then(|a| first_number(&a));

    let mut contact = Map::new();
    for key in ["email", "phone"] {
        if let Some(v) = text_arg(input, key) {
            contact.insert(key.to_string(), json!(v));
        }
    }

    let mut person = Map::new();
    person.insert("name".into(), json!(string_arg(input, "name")?));
    person.insert("age".into(), json!(age));
    person.insert("city".into(), json!(string_arg(input, "city")?));
    person.insert("occupation".into(), json!(string_arg(input, "occupation")?));
    optional_section(&mut person, "contact", contact);
    Ok(Value::Object(person))
}

pub fn extract_business_info(input: &Value) -> Result<Value, String> {
    let employee_count = text_arg(input, "employees").and_then(|e| first_number(&e));

    let mut financial = Map::new();
    if let Some(revenue) = text_arg(input, "revenue") {
        financial.insert("revenue".into(), json!(revenue));
    }
    if let Some(founded) = text_arg(input, "founded").and_then(|f| first_number(&f)) {
        financial.insert("founded_year".into(), json!(founded));
    }

    let mut business = Map::new();
    business.insert("company".into(), json!(string_arg(input, "company")?));
    business.insert("industry".into(), json!(string_arg(input, "industry")?));
    business.insert("employee_count".into(), json!(employee_count));
    business.insert("location".into(), json!(string_arg(input, "location")?));
    optional_section(&mut business, "financial", financial);
    Ok(Value::Object(business))
}

pub fn extract_product_info(input: &Value) -> Result<Value, String> {
    let price = text_arg(input, "price").and_then(|p| parse_price(&p));

    let mut metadata = Map::new();
    if let Some(rating) = text_arg(input, "rating").and_then(|r| parse_rating(&r)) {
        metadata.insert("rating".into(), json!(rating));
    }
    if let Some(availability) = text_arg(input, "availability") {
        metadata.insert("availability".into(), json!(availability));
    }

    let mut product = Map::new();
    product.insert("product_name".into(), json!(string_arg(input, "name")?));
    product.insert("category".into(), json!(string_arg(input, "category")?));
    product.insert("price".into(), json!(price));
    product.insert("description".into(), json!(string_arg(input, "description")?));
    optional_section(&mut product, "metadata", metadata);
    Ok(Value::Object(product))
}
