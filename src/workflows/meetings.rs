//! Turns meeting emails into calendar events with preparation and follow-up
//! tasks.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use super::WorkflowContext;
use crate::error::ConfigError;
use crate::extract::{extract_attendees, extract_date, extract_location, extract_time};
use crate::integrations::calendar::{Attendee, CalendarEvent, EventTime};
use crate::integrations::gmail::{Email, dedupe_by_id};
use crate::integrations::AsanaTask;
use crate::utils::{contains_any, truncate_chars};

pub const MEETING_QUERIES: [&str; 4] = [
    "subject:(meeting OR call OR conference OR zoom)",
    "subject:(invite OR invitation OR calendar)",
    "\"join the meeting\" OR \"zoom link\" OR \"teams meeting\"",
    "\"schedule\" OR \"let's meet\" OR \"can we meet\"",
];
pub const DEFAULT_DURATION_MINUTES: i64 = 60;
const SEARCH_LIMIT: u32 = 15;

const MEETING_KEYWORDS: &[&str] = &[
    "meeting",
    "call",
    "conference",
    "zoom",
    "teams",
    "invite",
    "invitation",
    "schedule",
    "calendar",
    "appointment",
    "discussion",
    "sync",
    "standup",
];
const EXCLUDE_KEYWORDS: &[&str] = &[
    "newsletter",
    "marketing",
    "promotion",
    "unsubscribe",
    "automated",
    "noreply",
    "system",
];

#[derive(Debug, Clone)]
pub struct MeetingSettings {
    pub asana_project_id: String,
    pub calendar_id: String,
    pub time_zone: String,
}

impl MeetingSettings {
    pub fn from_config(ctx: &WorkflowContext) -> Result<Self, ConfigError> {
        let config = &ctx.config;
        Ok(Self {
            asana_project_id: config.require("ASANA_PROJECT_ID")?.to_string(),
            calendar_id: config.get_or("CALENDAR_ID", "primary"),
            time_zone: config.get_or("MEETING_TIMEZONE", "America/New_York"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDetails {
    pub title: String,
    pub organizer: String,
    pub description: String,
    pub email_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub attendees: Vec<String>,
    pub location: String,
}

impl MeetingDetails {
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start() + Duration::minutes(self.duration_minutes)
    }
}

pub fn is_meeting_email(email: &Email) -> bool {
    let text = format!("{} {}", email.subject, email.content).to_lowercase();
    contains_any(&text, MEETING_KEYWORDS) && !contains_any(&text, EXCLUDE_KEYWORDS)
}

/// Missing dates fall back to the day after `today`, missing times to 14:00.
pub fn extract_meeting_details(email: &Email, today: NaiveDate) -> MeetingDetails {
    let content = &email.content;
    let title = if email.subject.trim().is_empty() {
        "Meeting".to_string()
    } else {
        email.subject.clone()
    };
    MeetingDetails {
        title,
        organizer: email.sender.clone(),
        description: truncate_chars(content, 500),
        email_id: email.id.clone(),
        date: extract_date(content).unwrap_or(today + Duration::days(1)),
        time: extract_time(content)
            .or_else(|| NaiveTime::from_hms_opt(14, 0, 0))
            .unwrap_or_default(),
        duration_minutes: DEFAULT_DURATION_MINUTES,
        attendees: extract_attendees(&email.sender, content),
        location: extract_location(content),
    }
}

pub fn calendar_event(details: &MeetingDetails, settings: &MeetingSettings) -> CalendarEvent {
    let stamp = |t: NaiveDateTime| EventTime {
        date_time: t.format("%Y-%m-%dT%H:%M:%S").to_string(),
        time_zone: settings.time_zone.clone(),
    };
    CalendarEvent {
        calendar_id: settings.calendar_id.clone(),
        summary: details.title.clone(),
        description: format!("{}\n\nOrganizer: {}", details.description, details.organizer),
        start: stamp(details.start()),
        end: stamp(details.end()),
        location: details.location.clone(),
        attendees: details
            .attendees
            .iter()
            .map(|email| Attendee { email: email.clone() })
            .collect(),
    }
}

fn event_line(event_id: Option<&str>) -> String {
    event_id
        .map(|id| format!("\n\n📅 Calendar Event: {id}"))
        .unwrap_or_default()
}

pub fn prep_task(details: &MeetingDetails, project_id: &str, event_id: Option<&str>) -> AsanaTask {
    let attendees: Vec<&str> = details.attendees.iter().take(5).map(String::as_str).collect();
    let notes = format!(
        "Meeting Preparation Checklist:

📅 Meeting: {title}
🕐 Date/Time: {date} at {time}
📍 Location: {location}
👥 Attendees: {attendees}

Preparation Tasks:
□ Review meeting agenda
□ Prepare presentation materials
□ Check technology/equipment
□ Review attendee backgrounds
□ Prepare questions and discussion topics
□ Confirm meeting logistics{event}",
        title = details.title,
        date = details.date.format("%Y-%m-%d"),
        time = details.time.format("%H:%M"),
        location = details.location,
        attendees = attendees.join(", "),
        event = event_line(event_id),
    );
    AsanaTask {
        name: format!("Prepare for: {}", details.title),
        notes,
        due_on: details.date.format("%Y-%m-%d").to_string(),
        projects: vec![project_id.to_string()],
    }
}

pub fn follow_up_task(details: &MeetingDetails, project_id: &str, event_id: Option<&str>) -> AsanaTask {
    let notes = format!(
        "Meeting Follow-up Actions:

📅 Meeting: {title}
🕐 Held: {date} at {time}

Follow-up Tasks:
□ Send meeting notes to attendees
□ Complete action items assigned
□ Schedule follow-up meetings if needed
□ Update project status
□ File meeting documentation{event}",
        title = details.title,
        date = details.date.format("%Y-%m-%d"),
        time = details.time.format("%H:%M"),
        event = event_line(event_id),
    );
    AsanaTask {
        name: format!("Follow-up: {}", details.title),
        notes,
        due_on: (details.date + Duration::days(1)).format("%Y-%m-%d").to_string(),
        projects: vec![project_id.to_string()],
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingScanReport {
    pub candidates: usize,
    pub organized: usize,
}

pub struct MeetingOrganizer {
    ctx: WorkflowContext,
    settings: MeetingSettings,
}

impl MeetingOrganizer {
    pub fn new(ctx: WorkflowContext) -> Result<Self, ConfigError> {
        let settings = MeetingSettings::from_config(&ctx)?;
        Ok(Self { ctx, settings })
    }

    async fn search(&self, query: &str, hours_back: u32) -> Vec<Email> {
        let query = format!("{query} newer_than:{hours_back}h");
        match self.ctx.integrations.gmail().search(&query, SEARCH_LIMIT).await {
            Ok(emails) => emails,
            Err(e) => {
                warn!(%query, error = %e, "meeting search failed");
                Vec::new()
            }
        }
    }

    async fn create_task(&self, task: &AsanaTask) -> Option<String> {
        match self.ctx.integrations.asana().create_task(task).await {
            Ok(gid) => gid,
            Err(e) => {
                warn!(task = %task.name, error = %e, "failed to create task");
                None
            }
        }
    }

    /// Creates the event and both tasks. Counts as organised when the event
    /// exists and at least one task was created.
    pub async fn process_meeting(&self, email: &Email, today: NaiveDate) -> bool {
        let details = extract_meeting_details(email, today);
        info!(title = %details.title, date = %details.date, time = %details.time, location = %details.location, "processing meeting");

        let event = calendar_event(&details, &self.settings);
        let event_id = match self.ctx.integrations.calendar().create_event(&event).await {
            Ok(id) => id,
            Err(e) => {
                warn!(title = %details.title, error = %e, "failed to create calendar event");
                None
            }
        };

        let project = &self.settings.asana_project_id;
        let mut tasks = Vec::new();
        for task in [
            prep_task(&details, project, event_id.as_deref()),
            follow_up_task(&details, project, event_id.as_deref()),
        ] {
            if let Some(gid) = self.create_task(&task).await {
                tasks.push(gid);
            }
        }

        let organized = event_id.is_some() && !tasks.is_empty();
        if !organized {
            warn!(title = %details.title, "meeting was only partially organised");
        }
        organized
    }

    pub async fn scan(&self, hours_back: u32) -> MeetingScanReport {
        let mut candidates = Vec::new();
        for query in MEETING_QUERIES {
            let emails = self.search(query, hours_back).await;
            candidates.extend(emails.into_iter().filter(is_meeting_email));
        }
        let candidates = dedupe_by_id(candidates);
        info!(count = candidates.len(), "potential meetings found");

        let today = Local::now().date_naive();
        let mut report = MeetingScanReport {
            candidates: candidates.len(),
            organized: 0,
        };
        for email in &candidates {
            if self.process_meeting(email, today).await {
                report.organized += 1;
            }
            self.ctx.pause().await;
        }
        info!(processed = report.candidates, organized = report.organized, "meeting scan complete");
        report
    }
}
