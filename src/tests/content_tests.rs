use crate::error::ConfigError;
use crate::integrations::{DocumentRef, ResearchFinding};
use crate::integrations::{docs, gmail, perplexity};
use crate::mocks::mock_api::MockApi;
use crate::mocks::test_context;
use crate::workflows::content::*;
use chrono::{Local, TimeZone};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(query: &str, answer: &str) -> ResearchFinding {
        ResearchFinding {
            query: query.to_string(),
            answer: answer.to_string(),
            sources: Vec::new(),
            timestamp: Local::now(),
        }
    }

    fn at() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2027, 4, 2, 15, 45, 0).unwrap()
    }

    fn sample() -> Vec<ResearchFinding> {
        vec![
            finding("Robotics latest trends developments 2027", "Emerging digital twins drive growth."),
            finding("Robotics expert opinions thought leadership", "Expert analysis says adoption will expand."),
            finding("Robotics challenges problems solutions industry", "Supply is the main issue."),
        ]
    }

    fn generator(mock: &MockApi, extra: &[(&str, &str)]) -> ContentGenerator {
        let mut settings = vec![("CONTENT_FOLDER_ID", "folder-1")];
        settings.extend_from_slice(extra);
        ContentGenerator::new(test_context(mock, &settings)).unwrap()
    }

    #[test]
    fn test_content_type_parsing() {
        assert_eq!("blog_post".parse::<ContentType>(), Ok(ContentType::BlogPost));
        assert_eq!(" newsletter ".parse::<ContentType>(), Ok(ContentType::Newsletter));
        assert_eq!(
            "podcast".parse::<ContentType>(),
            Err(ConfigError::Invalid {
                key: "CONTENT_TYPES".to_string(),
                value: "podcast".to_string()
            })
        );
        assert_eq!(ContentType::SocialMedia.document_suffix(), "Social Media Content");
    }

    #[test]
    fn test_content_queries() {
        let queries = content_queries("Robotics", 2027);
        assert_eq!(queries.len(), 5);
        assert_eq!(queries[0], "Robotics latest trends developments 2027");
    }

    #[test]
    fn test_analyze_angles_and_themes() {
        let analysis = analyze_opportunities(&sample());
        let angles: Vec<_> = analysis.angles.iter().map(|a| a.angle).collect();
        assert_eq!(angles, vec!["Trend Analysis", "Expert Insight", "Problem-Solution"]);
        assert_eq!(analysis.angles[0].source, "Robotics latest trends developments 2027");
        assert!(analysis.angles[0].description.ends_with("..."));
        // growth appears twice but is listed once
        assert_eq!(analysis.key_themes, vec!["Growth & Expansion", "Innovation & Technology"]);
    }

    #[test]
    fn test_angles_are_capped() {
        let findings: Vec<_> = (0..4)
            .map(|i| finding(&format!("q{i}"), "latest expert insight on a new problem"))
            .collect();
        assert_eq!(analyze_opportunities(&findings).angles.len(), MAX_ANGLES);
    }

    #[test]
    fn test_blog_post() {
        let findings = sample();
        let post = blog_post("Robotics", &findings, &analyze_opportunities(&findings), at());
        assert!(post.starts_with("# Robotics: Latest Trends and Insights"));
        assert!(post.contains("*Published: April 02, 2027*"));
        assert!(post.contains("### 1. Key Finding: latest trends developments 2027"));
        assert!(post.contains("- **Growth & Expansion**"));
        assert!(post.contains("### Trend Analysis"));
        assert!(post.contains("**Sources:** analysis of 3 research queries."));
    }

    #[test]
    fn test_social_media_defaults_without_themes() {
        let findings = vec![finding("q", "Steady quarter.")];
        let post = social_media("Robotics", &findings, &analyze_opportunities(&findings), at());
        assert!(post.starts_with("# Robotics - Social Media Content"));
        assert!(post.contains("2/5 📊 Key trend: Major industry shifts"));
        assert!(post.contains("3/5 💡 Expert insight: Steady quarter...."));
    }

    #[test]
    fn test_newsletter() {
        let findings = sample();
        let issue = newsletter("Robotics", &findings, &analyze_opportunities(&findings), at());
        assert!(issue.starts_with("# Weekly Newsletter: Robotics Edition"));
        assert!(issue.contains("**1. Latest Trends Developments 2027**"));
        assert!(issue.contains("• Innovation & Technology"));
    }

    #[test]
    fn test_distribution_email_lists_documents() {
        let documents = vec![DocumentRef {
            title: "Robotics - Blog Post".to_string(),
            url: "https://docs.google.com/document/d/1".to_string(),
            id: Some("1".to_string()),
        }];
        let (subject, body) = distribution_email("Robotics", &documents, "engineers", at());
        assert_eq!(subject, "New Content Ready: Robotics - April 02, 2027");
        assert!(body.contains("• **Robotics - Blog Post**"));
        assert!(body.contains("https://docs.google.com/document/d/1"));
        assert!(body.contains("Written for a engineers audience"));
    }

    #[test]
    fn test_settings_skip_unknown_types() {
        let mock = MockApi::new();
        let ctx = test_context(
            &mock,
            &[("CONTENT_FOLDER_ID", "f"), ("CONTENT_TYPES", "video,newsletter, podcast ,blog_post")],
        );
        let generator = ContentGenerator::new(ctx).unwrap();
        assert_eq!(
            generator.settings().content_types,
            vec![ContentType::Newsletter, ContentType::BlogPost]
        );
    }

    #[tokio::test]
    async fn test_run_with_only_unknown_types_creates_nothing() {
        let mock = MockApi::new();
        mock.on_execute(perplexity::SEARCH, json!({"result": {"answer": "ok"}}));
        mock.on_execute(docs::CREATE_DOCUMENT, json!({"result": {"url": "https://d/1"}}));

        let documents = generator(&mock, &[("CONTENT_TYPES", "video")]).run("Robotics").await.unwrap();

        assert!(documents.is_empty());
        assert!(mock.executions_for(docs::CREATE_DOCUMENT).is_empty());
    }

    #[test]
    fn test_settings_require_folder() {
        let mock = MockApi::new();
        let err = ContentGenerator::new(test_context(&mock, &[])).err();
        assert_eq!(err, Some(ConfigError::Missing("CONTENT_FOLDER_ID".to_string())));
    }

    #[tokio::test]
    async fn test_run_creates_documents_and_notifies_team() {
        let mock = MockApi::new();
        mock.on_execute(perplexity::SEARCH, json!({"result": {"answer": "New growth in digital tools."}}));
        mock.on_execute(
            docs::CREATE_DOCUMENT,
            json!({"result": {"url": "https://docs.google.com/document/d/abc", "id": "abc"}}),
        );

        let documents = generator(&mock, &[("CONTENT_TEAM_EMAILS", "team@acme.com")])
            .run("Robotics")
            .await
            .unwrap();

        let titles: Vec<_> = documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Robotics - Blog Post", "Robotics - Social Media Content", "Robotics - Newsletter Content"]
        );
        let created = mock.executions_for(docs::CREATE_DOCUMENT);
        assert_eq!(created.len(), 3);
        assert_eq!(created[0].inputs["folder_id"], json!("folder-1"));

        let sent = mock.executions_for(gmail::SEND);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].inputs["to"], json!("team@acme.com"));
    }

    #[tokio::test]
    async fn test_run_honours_content_types() {
        let mock = MockApi::new();
        mock.on_execute(perplexity::SEARCH, json!({"result": {"answer": "ok"}}));
        mock.on_execute(docs::CREATE_DOCUMENT, json!({"result": {"url": "https://d/1"}}));

        let documents = generator(&mock, &[("CONTENT_TYPES", "newsletter")])
            .run("Robotics")
            .await
            .unwrap();

        assert_eq!(documents.len(), 1);
        assert!(mock.executions_for(gmail::SEND).is_empty());
    }

    #[tokio::test]
    async fn test_run_skips_documents_without_url() {
        let mock = MockApi::new();
        mock.on_execute(perplexity::SEARCH, json!({"result": {"answer": "ok"}}));

        let documents = generator(&mock, &[("CONTENT_TEAM_EMAILS", "team@acme.com")])
            .run("Robotics")
            .await
            .unwrap();

        assert!(documents.is_empty());
        assert!(mock.executions_for(gmail::SEND).is_empty());
    }

    #[tokio::test]
    async fn test_run_fails_without_research() {
        let mock = MockApi::new();
        mock.fail_execute(perplexity::SEARCH, 502);

        assert!(generator(&mock, &[]).run("Robotics").await.is_err());
        assert!(mock.executions_for(docs::CREATE_DOCUMENT).is_empty());
    }
}
