use crate::api::MockIncredibleApi;
use crate::error::ApiError;
use crate::integrations::catalog::{self, AuthKind};
use crate::integrations::gmail::{self, Email, dedupe_by_id};
use crate::integrations::*;
use crate::mocks::mock_api::MockApi;
use crate::types::{ConnectOutcome, ExecuteResponse};
use serde_json::json;
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(mock: &MockApi) -> Integrations {
        Integrations::new(Arc::new(mock.clone()), "user-1")
    }

    #[tokio::test]
    async fn test_execute_sends_user_id_and_feature() {
        let mut api = MockIncredibleApi::new();
        api.expect_execute()
            .withf(|id, request| {
                id == "gmail"
                    && request.user_id == "user-1"
                    && request.feature_name == gmail::SEND
                    && request.inputs == json!({"to": "a@x.com", "subject": "Hi", "body": "Body"})
            })
            .times(1)
            .returning(|_, _| {
                Ok(ExecuteResponse {
                    result: json!({}),
                    success: Some(true),
                })
            });

        let hub = Integrations::new(Arc::new(api), "user-1");
        assert!(hub.gmail().send(" a@x.com ", "Hi", "Body").await.unwrap());
    }

    #[tokio::test]
    async fn test_gmail_search_reads_result_emails() {
        let mock = MockApi::new();
        mock.on_execute(
            gmail::SEARCH,
            json!({"result": {"emails": [
                {"id": "m1", "from": "Jane <jane@acme.com>", "subject": "Pricing", "body": "Hello"},
                {"id": "m2", "sender": "bob@x.com", "subject": "Hi", "content": "Yo"}
            ]}}),
        );

        let emails = hub(&mock).gmail().search("is:unread", 5).await.unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].sender_address(), "jane@acme.com");
        assert_eq!(emails[0].content, "Hello");
        assert_eq!(emails[1].sender, "bob@x.com");

        let request = &mock.executions_for(gmail::SEARCH)[0];
        assert_eq!(request.inputs, json!({"query": "is:unread", "max_results": 5}));
    }

    #[tokio::test]
    async fn test_gmail_search_keeps_readable_emails() {
        let mock = MockApi::new();
        mock.on_execute(
            gmail::SEARCH,
            json!({"result": {"emails": [
                {"id": "m1", "sender": "a@b.com", "subject": null, "content": null},
                {"id": "m2", "from": "c@d.com", "sender": "", "subject": "Hi", "body": "Text"},
                {"id": "m3", "subject": ["not", "a", "string"]},
                {"id": "m4", "from": "e@f.com", "sender": "g@h.com"}
            ]}}),
        );

        let emails = hub(&mock).gmail().search("q", 5).await.unwrap();
        let ids: Vec<_> = emails.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m4"]);
        assert_eq!(emails[0].subject, "");
        assert_eq!(emails[0].content, "");
        assert_eq!(emails[1].sender, "c@d.com");
        assert_eq!(emails[1].content, "Text");
        assert_eq!(emails[2].sender, "g@h.com");
    }

    #[tokio::test]
    async fn test_gmail_search_rejects_non_list_emails() {
        let mock = MockApi::new();
        mock.on_execute(gmail::SEARCH, json!({"result": {"emails": "none"}}));
        let err = hub(&mock).gmail().search("q", 5).await.unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_gmail_search_without_emails_is_empty() {
        let mock = MockApi::new();
        assert!(hub(&mock).gmail().search("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gmail_send_reports_explicit_failure() {
        let mock = MockApi::new();
        mock.on_execute(gmail::SEND, json!({"success": false}));
        assert!(!hub(&mock).gmail().send("a@x.com", "s", "b").await.unwrap());
    }

    #[test]
    fn test_dedupe_by_id_keeps_first() {
        let email = |id: &str, subject: &str| Email {
            id: id.to_string(),
            subject: subject.to_string(),
            ..Email::default()
        };
        let unique = dedupe_by_id(vec![email("1", "a"), email("2", "b"), email("1", "c")]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].subject, "a");
    }

    #[tokio::test]
    async fn test_sheets_calendar_asana_docs_payloads() {
        let mock = MockApi::new();
        mock.on_execute(calendar::CREATE_EVENT, json!({"result": {"id": "evt_9"}}));
        mock.on_execute(asana::CREATE_TASK, json!({"result": {"gid": 12345}}));
        mock.on_execute(
            docs::CREATE_DOCUMENT,
            json!({"result": {"url": "https://docs.google.com/d/1", "id": "doc_1"}}),
        );
        let hub = hub(&mock);

        hub.sheets()
            .update_range("sheet", "Leads!A:J", &[vec![json!("a"), json!(1)]])
            .await
            .unwrap();
        let request = &mock.executions_for(sheets::UPDATE)[0];
        assert_eq!(
            request.inputs,
            json!({"spreadsheet_id": "sheet", "range": "Leads!A:J", "values": [["a", 1]]})
        );

        let event = CalendarEvent {
            calendar_id: "primary".to_string(),
            summary: "Sync".to_string(),
            description: String::new(),
            start: calendar::EventTime {
                date_time: "2024-03-18T14:00:00".to_string(),
                time_zone: "America/New_York".to_string(),
            },
            end: calendar::EventTime {
                date_time: "2024-03-18T15:00:00".to_string(),
                time_zone: "America/New_York".to_string(),
            },
            location: "TBD".to_string(),
            attendees: vec![calendar::Attendee {
                email: "a@x.com".to_string(),
            }],
        };
        assert_eq!(hub.calendar().create_event(&event).await.unwrap().as_deref(), Some("evt_9"));
        let sent = &mock.executions_for(calendar::CREATE_EVENT)[0].inputs;
        assert_eq!(sent["start"]["dateTime"], "2024-03-18T14:00:00");
        assert_eq!(sent["start"]["timeZone"], "America/New_York");

        let task = AsanaTask {
            name: "Prep".to_string(),
            notes: String::new(),
            due_on: "2024-03-18".to_string(),
            projects: vec!["proj".to_string()],
        };
        assert_eq!(hub.asana().create_task(&task).await.unwrap().as_deref(), Some("12345"));

        let doc = hub.docs().create_document("Title", "Body", "folder").await.unwrap().unwrap();
        assert_eq!(doc.url, "https://docs.google.com/d/1");
        assert_eq!(doc.id.as_deref(), Some("doc_1"));
    }

    #[tokio::test]
    async fn test_docs_without_url_is_none() {
        let mock = MockApi::new();
        mock.on_execute(docs::CREATE_DOCUMENT, json!({"result": {"id": "doc_1"}}));
        assert!(hub(&mock).docs().create_document("t", "c", "f").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_perplexity_search_and_slack() {
        let mock = MockApi::new();
        mock.on_execute(
            perplexity::SEARCH,
            json!({"result": {"answer": "Rates held steady.", "sources": [{"url": "a"}, {"url": "b"}]}}),
        );
        let hub = hub(&mock);

        let finding = hub.perplexity().search("fed rates").await.unwrap();
        assert_eq!(finding.query, "fed rates");
        assert_eq!(finding.answer, "Rates held steady.");
        assert_eq!(finding.sources.len(), 2);
        assert_eq!(mock.executions()[0].0, ids::PERPLEXITY);

        assert!(hub.slack().post_message("#general", "hi").await.unwrap());
        let request = &mock.executions_for(slack::SEND_MESSAGE)[0];
        assert_eq!(request.inputs, json!({"channel": "#general", "text": "hi"}));
    }

    #[tokio::test]
    async fn test_execute_failure_propagates() {
        let mock = MockApi::new();
        mock.fail_execute(perplexity::SEARCH, 502);
        let err = hub(&mock).perplexity().search("q").await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_connect_helpers() {
        let mock = MockApi::new();
        mock.set_connect_outcome(ConnectOutcome::Redirect("https://auth/x".to_string()));
        let hub = hub(&mock);

        let outcome = hub.connect_oauth(ids::GMAIL, Some("https://cb")).await.unwrap();
        assert_eq!(outcome, ConnectOutcome::Redirect("https://auth/x".to_string()));
        hub.connect_api_key(ids::PERPLEXITY, "pplx-key").await.unwrap();

        let connections = mock.connections();
        assert_eq!(connections[0].1.callback_url.as_deref(), Some("https://cb"));
        assert_eq!(connections[1].0, "perplexity");
        assert_eq!(connections[1].1.api_key.as_deref(), Some("pplx-key"));
        assert_eq!(connections[1].1.user_id, "user-1");
    }

    #[test]
    fn test_catalog_specs() {
        let perplexity = catalog::find(ids::PERPLEXITY).unwrap();
        assert_eq!(perplexity.auth, AuthKind::ApiKey);
        let spec = perplexity.spec(Some(&["PerplexityAISearch"]));
        assert_eq!(spec.id, "perplexity");
        assert_eq!(spec.features, vec!["PerplexityAISearch"]);

        let gmail = catalog::find(ids::GMAIL).unwrap().spec(None);
        assert!(gmail.features.contains(&gmail::SEND.to_string()));
        assert!(catalog::find("myspace").is_none());
    }
}
