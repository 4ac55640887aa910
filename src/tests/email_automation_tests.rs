use crate::error::ConfigError;
use crate::integrations::gmail::{self, Email};
use crate::integrations::sheets;
use crate::mocks::mock_api::MockApi;
use crate::mocks::test_context;
use crate::workflows::email_automation::*;
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn email(id: &str, sender: &str, subject: &str, content: &str) -> Email {
        Email {
            id: id.to_string(),
            sender: sender.to_string(),
            subject: subject.to_string(),
            content: content.to_string(),
        }
    }

    fn automation(mock: &MockApi) -> EmailAutomation {
        EmailAutomation::new(test_context(mock, &[("EMAIL_LOG_SHEET_ID", "log-sheet")])).unwrap()
    }

    #[test]
    fn test_categorize() {
        let support = email("1", "a@x.com", "Login", "I have a problem with my account");
        let sales = email("2", "a@x.com", "Hi", "Could we get a trial?");
        let general = email("3", "a@x.com", "Hi", "Just saying thanks");
        assert_eq!(categorize(&support), EmailCategory::Support);
        assert_eq!(categorize(&sales), EmailCategory::Sales);
        assert_eq!(categorize(&general), EmailCategory::General);
    }

    #[test]
    fn test_support_wins_over_sales() {
        let both = email("1", "a@x.com", "Hi", "need help with pricing");
        assert_eq!(categorize(&both), EmailCategory::Support);
    }

    #[test]
    fn test_auto_response_greets_sender() {
        let e = email("1", "Dana Lee <dana@x.com>", "Broken export", "export issue");
        let (subject, body) = auto_response(&e);
        assert_eq!(subject, "Re: Broken export");
        assert!(body.starts_with("Hi Dana Lee,"));
        assert!(body.contains("support team"));
    }

    #[test]
    fn test_auto_response_without_name() {
        let e = email("1", "dana@x.com", "Demo", "can I see a demo");
        let (_, body) = auto_response(&e);
        assert!(body.starts_with("Hi dana@x.com,"));
        assert!(body.contains("I'll connect you with our sales team"));
        assert!(body.contains("explore our resources:"));
    }

    #[test]
    fn test_auto_response_without_sender() {
        let e = email("1", "", "Hello", "just saying hi");
        let (_, body) = auto_response(&e);
        assert!(body.starts_with("Hi there,"));
        assert!(body.contains("respond to inquiries within 1-2 business days"));

        let e = email("2", " <ops@x.com>", "Hello", "hi");
        assert!(auto_response(&e).1.starts_with("Hi there,"));
    }

    #[test]
    fn test_requires_log_sheet() {
        let mock = MockApi::new();
        let err = EmailAutomation::new(test_context(&mock, &[])).err();
        assert_eq!(err, Some(ConfigError::Missing("EMAIL_LOG_SHEET_ID".to_string())));
    }

    #[tokio::test]
    async fn test_process_answers_each_email_once() {
        let mock = MockApi::new();
        let emails = vec![
            email("a", "Dana <dana@x.com>", "Help", "help please"),
            email("b", "Eli <eli@y.com>", "Pricing", "pricing?"),
        ];
        mock.on_execute(gmail::SEARCH, json!({"result": {"emails": emails}}));

        let report = automation(&mock).process().await;

        assert_eq!(report, AutomationReport { processed: 2, responses_sent: 2 });
        assert_eq!(mock.executions_for(gmail::SEARCH).len(), SUPPORT_QUERIES.len());
        assert!(mock
            .executions_for(gmail::SEARCH)
            .iter()
            .all(|r| r.inputs["max_results"] == json!(5)));

        let sent = mock.executions_for(gmail::SEND);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].inputs["to"], json!("dana@x.com"));

        let logged = mock.executions_for(sheets::APPEND);
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0].inputs["range"], json!(LOG_RANGE));
        let row = &logged[0].inputs["values"][0];
        assert_eq!(row[1], json!("Dana <dana@x.com>"));
        assert_eq!(row[3], json!("Auto-response sent"));
        assert_eq!(row[4], json!("a"));
    }

    #[tokio::test]
    async fn test_invalid_sender_is_logged_not_answered() {
        let mock = MockApi::new();
        let e = email("c", "", "", "question");
        mock.on_execute(gmail::SEARCH, json!({"result": {"emails": [e]}}));

        let report = automation(&mock).process().await;

        assert_eq!(report, AutomationReport { processed: 1, responses_sent: 0 });
        assert!(mock.executions_for(gmail::SEND).is_empty());
        let row = &mock.executions_for(sheets::APPEND)[0].inputs["values"][0];
        assert_eq!(row[1], json!("Unknown"));
        assert_eq!(row[2], json!("No Subject"));
        assert_eq!(row[3], json!("Invalid sender email"));
    }

    #[tokio::test]
    async fn test_send_errors_are_logged() {
        let mock = MockApi::new();
        mock.on_execute(
            gmail::SEARCH,
            json!({"result": {"emails": [email("a", "dana@x.com", "Help", "help")]}}),
        );
        mock.fail_execute(gmail::SEND, 500);

        let report = automation(&mock).process().await;

        assert_eq!(report.processed, 1);
        assert_eq!(report.responses_sent, 0);
        let row = &mock.executions_for(sheets::APPEND)[0].inputs["values"][0];
        assert!(row[3].as_str().unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_log_failures_do_not_stop_processing() {
        let mock = MockApi::new();
        mock.on_execute(
            gmail::SEARCH,
            json!({"result": {"emails": [email("a", "dana@x.com", "Help", "help")]}}),
        );
        mock.fail_execute(sheets::APPEND, 500);

        let report = automation(&mock).process().await;

        assert_eq!(report, AutomationReport { processed: 1, responses_sent: 1 });
    }
}
