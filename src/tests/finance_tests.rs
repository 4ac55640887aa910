use crate::error::ConfigError;
use crate::integrations::ResearchFinding;
use crate::integrations::{gmail, perplexity, sheets};
use crate::mocks::mock_api::MockApi;
use crate::mocks::test_context;
use crate::workflows::finance::*;
use chrono::{Local, TimeZone};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn point(category: Category, subject: Option<&str>, answer: &str) -> DataPoint {
        DataPoint {
            category,
            subject: subject.map(str::to_string),
            finding: ResearchFinding {
                query: format!("{} query", category.as_str()),
                answer: answer.to_string(),
                sources: vec![json!("https://news.example")],
                timestamp: Local::now(),
            },
        }
    }

    fn sample() -> Vec<DataPoint> {
        vec![
            point(Category::MarketOverview, None, "Shares rise on record earnings."),
            point(Category::CompanyPerformance, Some("TSLA"), "Sharp plunge in the stock price."),
            point(Category::SectorTrends, Some("energy"), "Unusual trading volumes."),
        ]
    }

    fn settings() -> FinanceSettings {
        FinanceSettings {
            sheet_id: "dash".to_string(),
            recipients: Vec::new(),
            symbols: vec!["TSLA".to_string()],
            sectors: vec!["energy".to_string()],
        }
    }

    fn dashboard(mock: &MockApi, extra: &[(&str, &str)]) -> FinancialDashboard {
        let mut settings = vec![("DASHBOARD_SHEET_ID", "dash"), ("MARKET_SECTORS", "energy")];
        settings.extend_from_slice(extra);
        FinancialDashboard::new(test_context(mock, &settings)).unwrap()
    }

    #[test]
    fn test_sentiment_needs_clear_margin() {
        assert_eq!(classify_sentiment(0, 0), Sentiment::Mixed);
        assert_eq!(classify_sentiment(3, 2), Sentiment::Mixed);
        assert_eq!(classify_sentiment(4, 2), Sentiment::Bullish);
        assert_eq!(classify_sentiment(1, 0), Sentiment::Bullish);
        assert_eq!(classify_sentiment(2, 4), Sentiment::Bearish);
        assert_eq!(Sentiment::Bearish.to_string(), "BEARISH");
    }

    #[test]
    fn test_queries() {
        assert_eq!(MARKET_QUERIES.len(), 5);
        assert_eq!(company_queries("TSLA")[0], "TSLA stock price performance earnings latest");
        assert_eq!(sector_queries("energy", 2027)[0], "energy sector performance trends analysis 2027");
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!(parse_symbols(" aapl, ,msft "), vec!["AAPL", "MSFT"]);
        assert!(parse_symbols("").is_empty());
    }

    #[test]
    fn test_analyze_insights_and_alerts() {
        let analysis = analyze(&sample());
        assert_eq!(analysis.sentiment, Sentiment::Bullish);
        assert_eq!(analysis.insights.len(), 1);
        assert_eq!(analysis.insights[0].category, Category::MarketOverview);
        let levels: Vec<_> = analysis.alerts.iter().map(|a| a.level).collect();
        assert_eq!(levels, vec![AlertLevel::High, AlertLevel::Medium]);
        assert_eq!(analysis.alerts[0].source, "company_performance query");
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.recommendations[0].kind, "INVESTMENT");
    }

    #[test]
    fn test_recommendations() {
        let bearish = recommendations(Sentiment::Bearish, 0);
        assert_eq!(bearish.len(), 1);
        assert_eq!(bearish[0].kind, "RISK_MANAGEMENT");
        assert_eq!(bearish[0].risk_level, "HIGH");

        assert!(recommendations(Sentiment::Mixed, 2).is_empty());

        let busy = recommendations(Sentiment::Mixed, 3);
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].kind, "MONITORING");
        assert_eq!(busy[0].reasoning, "3 significant market alerts detected");
    }

    #[test]
    fn test_sheet_rows() {
        let data = sample();
        let analysis = analyze(&data);
        let at = Local.with_ymd_and_hms(2027, 5, 3, 9, 15, 0).unwrap();

        let summary = summary_rows(&data, &analysis, at);
        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary[1],
            vec![json!("2027-05-03 09:15:00"), json!("BULLISH"), json!(1), json!(2), json!(3)]
        );

        let detail = detail_rows(&data);
        assert_eq!(detail.len(), 4);
        assert_eq!(detail[2][1], json!("company_performance"));
        assert_eq!(detail[2][4], json!(1));

        let alerts = alert_rows(&analysis.alerts).unwrap();
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[1][1], json!("HIGH"));
        assert!(alert_rows(&[]).is_none());
    }

    #[test]
    fn test_executive_report() {
        let data = sample();
        let analysis = analyze(&data);
        let at = Local.with_ymd_and_hms(2027, 5, 3, 9, 15, 0).unwrap();
        let symbols = vec!["TSLA".to_string()];
        let report = executive_report(&data, &analysis, &settings(), &symbols, at);

        assert!(report.contains("📈 Market Sentiment: BULLISH"));
        assert!(report.contains("Categories Covered: 3"));
        assert!(report.contains("Tracking: TSLA and sectors: energy"));
        assert!(report.contains("🚨 MARKET ALERTS"));
        assert!(report.contains("• **TSLA**: Sharp plunge in the stock price."));
        assert!(report.contains("Full dashboard: https://docs.google.com/spreadsheets/d/dash"));
        assert!(report.contains("May 03, 2027"));
    }

    #[test]
    fn test_settings_defaults_and_requirement() {
        let mock = MockApi::new();
        let err = FinancialDashboard::new(test_context(&mock, &[])).err();
        assert_eq!(err, Some(ConfigError::Missing("DASHBOARD_SHEET_ID".to_string())));

        let dash = FinancialDashboard::new(test_context(&mock, &[("DASHBOARD_SHEET_ID", "d")])).unwrap();
        assert_eq!(dash.settings().symbols, vec!["AAPL", "GOOGL", "MSFT"]);
        assert_eq!(dash.settings().sectors, vec!["technology", "finance", "healthcare"]);
    }

    #[tokio::test]
    async fn test_run_bullish_dashboard() {
        let mock = MockApi::new();
        mock.on_execute(
            perplexity::SEARCH,
            json!({"result": {"answer": "Stocks gain as markets rise to record highs.", "sources": ["a"]}}),
        );

        let outcome = dashboard(&mock, &[("REPORT_RECIPIENTS", "cfo@acme.com")])
            .run(Some(vec!["TSLA".to_string()]))
            .await
            .unwrap();

        assert_eq!(outcome.data_points, 11);
        assert_eq!(outcome.sentiment, Sentiment::Bullish);
        assert_eq!(outcome.alerts, 0);
        assert_eq!(outcome.recipients_emailed, 1);

        let queries: Vec<String> = mock
            .executions_for(perplexity::SEARCH)
            .iter()
            .map(|r| r.inputs["query"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(queries.len(), 11);
        assert!(queries.iter().any(|q| q.starts_with("TSLA ")));
        assert!(!queries.iter().any(|q| q.starts_with("AAPL ")));

        let ranges: Vec<_> = mock
            .executions_for(sheets::UPDATE)
            .iter()
            .map(|r| r.inputs["range"].clone())
            .collect();
        assert_eq!(ranges, vec![json!(SUMMARY_RANGE), json!(DETAIL_RANGE)]);

        let sent = mock.executions_for(gmail::SEND);
        assert!(sent[0].inputs["subject"]
            .as_str()
            .unwrap()
            .starts_with("Financial Dashboard Report - "));
    }

    #[tokio::test]
    async fn test_run_bearish_dashboard_writes_alerts() {
        let mock = MockApi::new();
        mock.on_execute(
            perplexity::SEARCH,
            json!({"result": {"answer": "Unusual volatility after a market crash; stocks down."}}),
        );

        let outcome = dashboard(&mock, &[]).run(Some(vec!["TSLA".to_string()])).await.unwrap();

        assert_eq!(outcome.sentiment, Sentiment::Bearish);
        assert_eq!(outcome.alerts, 11);
        assert_eq!(outcome.recipients_emailed, 0);
        assert!(outcome.report.contains("RISK_MANAGEMENT"));
        assert!(outcome.report.contains("MONITORING"));

        let updates = mock.executions_for(sheets::UPDATE);
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[2].inputs["range"], json!(ALERTS_RANGE));
    }

    #[tokio::test]
    async fn test_run_uses_configured_symbols() {
        let mock = MockApi::new();
        mock.on_execute(perplexity::SEARCH, json!({"result": {"answer": "flat"}}));

        let outcome = dashboard(&mock, &[("COMPANY_SYMBOLS", "ibm")]).run(None).await.unwrap();

        assert_eq!(outcome.data_points, 5 + 3 + 3);
        assert_eq!(outcome.sentiment, Sentiment::Mixed);
    }

    #[tokio::test]
    async fn test_run_fails_without_data() {
        let mock = MockApi::new();
        mock.fail_execute(perplexity::SEARCH, 500);

        let err = dashboard(&mock, &[]).run(None).await.unwrap_err();
        assert!(err.to_string().contains("no financial data"));
        assert!(mock.executions_for(sheets::UPDATE).is_empty());
    }
}
