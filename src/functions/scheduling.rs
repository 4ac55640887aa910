//! Simulated calendar, invitation and task functions for multi-step
//! scheduling conversations.

use chrono::Local;
use serde_json::{Value, json};
use tracing::info;

use super::{definition, list_arg, number_arg, string_arg, text_arg};
use crate::function_registry::FunctionRegistry;
use crate::utils::format_number;

pub const DEFAULT_MEETING_LINK: &str = "https://meet.incredible.one/12345";

// (date, start time, hours)
const BUSY_SLOTS: &[(&str, &str, u32)] = &[
    ("2024-01-15", "14:00", 2),
    ("2024-01-15", "10:00", 1),
    ("2024-01-16", "09:00", 3),
];

fn stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        definition(
            "check_calendar_availability",
            "Check whether a calendar slot is free",
            json!({
                "type": "object",
                "properties": {
                    "date": { "type": "string", "description": "Date as YYYY-MM-DD" },
                    "time": { "type": "string", "description": "Start time as HH:MM" },
                    "duration_hours": { "type": "number", "description": "Length in hours" }
                },
                "required": ["date", "time", "duration_hours"]
            }),
        ),
        check_calendar_availability,
    );
    registry.register(
        definition(
            "create_calendar_event",
            "Create a calendar event once the slot is confirmed free",
            json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "date": { "type": "string", "description": "Date as YYYY-MM-DD" },
                    "time": { "type": "string", "description": "Start time as HH:MM" },
                    "duration_hours": { "type": "number" },
                    "attendees": { "type": "string", "description": "Comma separated email addresses" }
                },
                "required": ["title", "date", "time", "duration_hours", "attendees"]
            }),
        ),
        create_calendar_event,
    );
    registry.register(
        definition(
            "send_meeting_invitation",
            "Email invitations for a created event",
            json!({
                "type": "object",
                "properties": {
                    "event_id": { "type": "string" },
                    "title": { "type": "string" },
                    "date": { "type": "string" },
                    "time": { "type": "string" },
                    "attendees": { "type": "string", "description": "Comma separated email addresses" },
                    "meeting_link": { "type": "string", "description": "Optional video link" }
                },
                "required": ["event_id", "title", "date", "time", "attendees"]
            }),
        ),
        send_meeting_invitation,
    );
    registry.register(
        definition(
            "create_follow_up_tasks",
            "Create a preparation task for every attendee",
            json!({
                "type": "object",
                "properties": {
                    "meeting_title": { "type": "string" },
                    "attendees": { "type": "string", "description": "Comma separated email addresses" },
                    "due_date": { "type": "string", "description": "Date as YYYY-MM-DD" }
                },
                "required": ["meeting_title", "attendees", "due_date"]
            }),
        ),
        create_follow_up_tasks,
    );
    registry.register(
        definition(
            "log_workflow_completion",
            "Record that a scheduling workflow finished",
            json!({
                "type": "object",
                "properties": {
                    "workflow_id": { "type": "string" },
                    "steps_completed": { "type": "integer" },
                    "total_time": { "type": "number", "description": "Elapsed seconds" }
                },
                "required": ["workflow_id", "steps_completed", "total_time"]
            }),
        ),
        log_workflow_completion,
    );
}

pub fn check_calendar_availability(input: &Value) -> Result<Value, String> {
    let date = string_arg(input, "date")?;
    let time = string_arg(input, "time")?;
    let duration = number_arg(input, "duration_hours")?;

    let booked = BUSY_SLOTS.iter().any(|(d, t, _)| *d == date && *t == time);
    if booked {
        info!(%date, %time, "calendar slot already booked");
        return Ok(json!({ "available": false, "reason": "Time slot already booked" }));
    }
    Ok(json!({
        "available": true,
        "slot": format!("{date} {time} for {} hours", format_number(duration))
    }))
}

pub fn create_calendar_event(input: &Value) -> Result<Value, String> {
    let title = string_arg(input, "title")?;
    let event_id = format!("event_{}", stamp());
    info!(%event_id, %title, "calendar event created");
    Ok(json!({
        "event_id": event_id,
        "title": title,
        "date": string_arg(input, "date")?,
        "time": string_arg(input, "time")?,
        "duration_hours": number_arg(input, "duration_hours")?,
        "attendees": list_arg(input, "attendees"),
        "status": "created"
    }))
}

pub fn send_meeting_invitation(input: &Value) -> Result<Value, String> {
    let title = string_arg(input, "title")?;
    let attendees = list_arg(input, "attendees");
    let link = text_arg(input, "meeting_link").unwrap_or_else(|| DEFAULT_MEETING_LINK.to_string());
    info!(count = attendees.len(), %title, "meeting invitations sent");
    Ok(json!({
        "event_id": string_arg(input, "event_id")?,
        "emails_sent": attendees.len(),
        "recipients": attendees,
        "subject": format!("Meeting Invitation: {title}"),
        "meeting_details": {
            "date": string_arg(input, "date")?,
            "time": string_arg(input, "time")?,
            "link": link
        }
    }))
}

pub fn create_follow_up_tasks(input: &Value) -> Result<Value, String> {
    let meeting_title = string_arg(input, "meeting_title")?;
    let due_date = string_arg(input, "due_date")?;
    let stamp = stamp();
    let tasks: Vec<Value> = list_arg(input, "attendees")
        .into_iter()
        .enumerate()
        .map(|(i, attendee)| {
            json!({
                "task_id": format!("task_{stamp}_{i}"),
                "title": format!("Prepare for: {meeting_title}"),
                "assigned_to": attendee,
                "due_date": due_date,
                "status": "pending"
            })
        })
        .collect();
    Ok(json!({ "tasks_created": tasks.len(), "tasks": tasks }))
}

pub fn log_workflow_completion(input: &Value) -> Result<Value, String> {
    let workflow_id = string_arg(input, "workflow_id")?;
    let steps = number_arg(input, "steps_completed")?;
    let total_time = number_arg(input, "total_time")?;
    info!(%workflow_id, steps, total_time, "workflow completed");
    Ok(json!({
        "workflow_id": workflow_id,
        "completed_at": Local::now().to_rfc3339(),
        "steps_completed": steps as u64,
        "total_time_seconds": total_time,
        "status": "completed"
    }))
}
