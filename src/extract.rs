//! Regex heuristics for pulling people, dates, times and places out of
//! email text.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::utils::title_case;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("valid regex"));

static WEEKDAY_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\w+day),?\s+(\w+)\s+(\d{1,2}),?\s+(\d{4})").expect("valid regex")
});
static US_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("valid regex"));
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("valid regex"));
static MONTH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\w+)\s+(\d{1,2}),?\s+(\d{4})").expect("valid regex")
});

static CLOCK_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(am|pm)").expect("valid regex")
});
static HOUR_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2})\s*(am|pm)").expect("valid regex"));
static AT_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)at\s+(\d{1,2}):(\d{2})").expect("valid regex"));

static VIDEO_LINK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(https://zoom\.us/j/\d+)",
        r"(?i)(https://teams\.microsoft\.com/\S+)",
        r"(?i)(https://meet\.google\.com/\S+)",
        r"(?i)(https://\S*\.webex\.com/\S+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});
static PLACE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:room|conference room|office)\s+([A-Z0-9\-]+)",
        r"(?i)(?:at|in)\s+([A-Z][a-zA-Z\s]+(?:room|office|building))",
        r"(?i)(?:location|where):\s*([^\n\r]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

pub const MAX_ATTENDEES: usize = 10;
pub const UNKNOWN: &str = "Unknown";
pub const LOCATION_TBD: &str = "TBD";

/// Splits `"Jane Doe <jane@acme.com>"` into name and address. Plain addresses
/// get the name `"Unknown"`.
pub fn split_sender(sender: &str) -> (String, String) {
    if let (Some(open), Some(close)) = (sender.find('<'), sender.rfind('>')) {
        if open < close {
            let name = sender[..open].trim().trim_matches('"').trim();
            let address = sender[open + 1..close].trim();
            let name = if name.is_empty() { UNKNOWN } else { name };
            return (name.to_string(), address.to_string());
        }
    }
    (UNKNOWN.to_string(), sender.trim().to_string())
}

pub fn email_domain(address: &str) -> Option<&str> {
    address.split_once('@').map(|(_, domain)| domain.trim())
}

/// `"jane@acme-corp.com"` becomes `"Acme-Corp"`.
pub fn company_from_email(address: &str) -> String {
    match email_domain(address) {
        Some(domain) if domain.contains('.') => {
            let label = domain.split('.').next().unwrap_or_default();
            if label.is_empty() {
                UNKNOWN.to_string()
            } else {
                title_case(label)
            }
        }
        _ => UNKNOWN.to_string(),
    }
}

fn month_number(name: &str) -> u32 {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
        .unwrap_or(1)
}

fn num<T: std::str::FromStr>(s: &str) -> Option<T> {
    s.parse().ok()
}

/// The first pattern that matches decides the result, even if the date it
/// names does not exist.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    if let Some(c) = WEEKDAY_DATE_RE.captures(text) {
        return NaiveDate::from_ymd_opt(num(&c[4])?, month_number(&c[2]), num(&c[3])?);
    }
    if let Some(c) = US_DATE_RE.captures(text) {
        return NaiveDate::from_ymd_opt(num(&c[3])?, num(&c[1])?, num(&c[2])?);
    }
    if let Some(c) = ISO_DATE_RE.captures(text) {
        return NaiveDate::from_ymd_opt(num(&c[1])?, num(&c[2])?, num(&c[3])?);
    }
    if let Some(c) = MONTH_DATE_RE.captures(text) {
        return NaiveDate::from_ymd_opt(num(&c[3])?, month_number(&c[1]), num(&c[2])?);
    }
    None
}

fn to_24h(hour: u32, meridiem: &str) -> u32 {
    match (meridiem.to_lowercase().as_str(), hour) {
        ("pm", h) if h != 12 => h + 12,
        ("am", 12) => 0,
        (_, h) => h,
    }
}

pub fn extract_time(text: &str) -> Option<NaiveTime> {
    if let Some(c) = CLOCK_TIME_RE.captures(text) {
        return NaiveTime::from_hms_opt(to_24h(num(&c[1])?, &c[3]), num(&c[2])?, 0);
    }
    if let Some(c) = HOUR_TIME_RE.captures(text) {
        return NaiveTime::from_hms_opt(to_24h(num(&c[1])?, &c[2]), 0, 0);
    }
    if let Some(c) = AT_TIME_RE.captures(text) {
        return NaiveTime::from_hms_opt(num(&c[1])?, num(&c[2])?, 0);
    }
    None
}

/// Distinct addresses in order of first appearance.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in EMAIL_RE.find_iter(text) {
        if !out.iter().any(|e| e == m.as_str()) {
            out.push(m.as_str().to_string());
        }
    }
    out
}

/// Sender first, then every address in the body.
pub fn extract_attendees(sender: &str, body: &str) -> Vec<String> {
    let mut attendees = Vec::new();
    if sender.contains('<') {
        let (_, address) = split_sender(sender);
        if !address.is_empty() {
            attendees.push(address);
        }
    }
    for address in extract_emails(body) {
        if !attendees.contains(&address) {
            attendees.push(address);
        }
    }
    attendees.truncate(MAX_ATTENDEES);
    attendees
}

pub fn extract_location(text: &str) -> String {
    for re in VIDEO_LINK_RES.iter() {
        if let Some(c) = re.captures(text) {
            return c[1].to_string();
        }
    }
    for re in PLACE_RES.iter() {
        if let Some(c) = re.captures(text) {
            let place = c[1].trim();
            let len = place.chars().count();
            if len > 5 && len < 100 {
                return place.to_string();
            }
        }
    }
    LOCATION_TBD.to_string()
}

pub fn first_number(text: &str) -> Option<u64> {
    NUMBER_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// `"$1,299.99"` becomes `1299.99`.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    DECIMAL_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().trim_end_matches('.').parse().ok())
}

/// `"4.5 stars"` becomes `4.5`.
pub fn parse_rating(text: &str) -> Option<f64> {
    DECIMAL_RE
        .find(text)
        .and_then(|m| m.as_str().trim_end_matches('.').parse().ok())
}
