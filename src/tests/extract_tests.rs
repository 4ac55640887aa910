use crate::extract::*;
use chrono::{NaiveDate, NaiveTime};

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn time(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn test_split_sender() {
        assert_eq!(
            split_sender("Jane Doe <jane@acme.com>"),
            ("Jane Doe".to_string(), "jane@acme.com".to_string())
        );
        assert_eq!(
            split_sender("\"Doe, Jane\" <j@x.io>"),
            ("Doe, Jane".to_string(), "j@x.io".to_string())
        );
        assert_eq!(
            split_sender("bob@x.com"),
            (UNKNOWN.to_string(), "bob@x.com".to_string())
        );
    }

    #[test]
    fn test_company_from_email() {
        assert_eq!(company_from_email("jane@acme-corp.com"), "Acme-Corp");
        assert_eq!(company_from_email("nobody"), UNKNOWN);
        assert_eq!(email_domain("a@b.org"), Some("b.org"));
    }

    #[test]
    fn test_extract_date_patterns() {
        assert_eq!(extract_date("Let's meet Monday, March 18, 2024 to review"), date(2024, 3, 18));
        assert_eq!(extract_date("How about 3/21/2024?"), date(2024, 3, 21));
        assert_eq!(extract_date("Scheduled for 2024-04-02"), date(2024, 4, 2));
        assert_eq!(extract_date("Meeting on April 5, 2024"), date(2024, 4, 5));
        assert_eq!(extract_date("no date here"), None);
        // the first matching pattern wins even when its date is impossible
        assert_eq!(extract_date("13/45/2024 or 2024-01-02"), None);
    }

    #[test]
    fn test_extract_time_patterns() {
        assert_eq!(extract_time("see you at 3:30 PM"), time(15, 30));
        assert_eq!(extract_time("around 10am works"), time(10, 0));
        assert_eq!(extract_time("12 am sharp"), time(0, 0));
        assert_eq!(extract_time("starts at 14:15"), time(14, 15));
        assert_eq!(extract_time("whenever"), None);
    }

    #[test]
    fn test_extract_location() {
        assert_eq!(
            extract_location("Join https://zoom.us/j/123456789 at noon"),
            "https://zoom.us/j/123456789"
        );
        assert_eq!(
            extract_location("Location: Main Office, 5th floor\nThanks"),
            "Main Office, 5th floor"
        );
        assert_eq!(extract_location("Nothing useful"), LOCATION_TBD);
    }

    #[test]
    fn test_extract_attendees_dedupes_and_caps() {
        let attendees = extract_attendees(
            "Jane <jane@acme.com>",
            "cc bob@x.com and jane@acme.com",
        );
        assert_eq!(attendees, vec!["jane@acme.com", "bob@x.com"]);

        let body: String = (0..15).map(|i| format!("p{i}@team.io ")).collect();
        assert_eq!(extract_attendees("plain@x.com", &body).len(), MAX_ATTENDEES);
    }

    #[test]
    fn test_number_parsers() {
        assert_eq!(first_number("about 250 employees"), Some(250));
        assert_eq!(first_number("none"), None);
        assert_eq!(parse_price("$1,299.99"), Some(1299.99));
        assert_eq!(parse_price("free"), None);
        assert_eq!(parse_rating("4.5 stars"), Some(4.5));
        assert_eq!(parse_rating("5."), Some(5.0));
    }
}
