//! Market, company and sector research rolled into a Sheets dashboard,
//! a sentiment call and an emailed executive report.

use std::collections::HashSet;
use std::fmt;

use anyhow::bail;
use chrono::{DateTime, Datelike, Local};
use serde_json::json;
use tracing::{info, warn};

use super::WorkflowContext;
use crate::error::ConfigError;
use crate::integrations::ResearchFinding;
use crate::integrations::sheets::Row;
use crate::utils::{contains_any, excerpt, preview};

pub const SUMMARY_RANGE: &str = "Market_Summary!A:E";
pub const DETAIL_RANGE: &str = "Detailed_Data!A:F";
pub const ALERTS_RANGE: &str = "Alerts!A:D";

pub const MARKET_QUERIES: &[&str] = &[
    "stock market performance today NYSE NASDAQ current",
    "market volatility index VIX fear greed current levels",
    "economic indicators GDP inflation unemployment latest",
    "Federal Reserve interest rates policy latest news",
    "market sentiment investor confidence latest trends",
];

const POSITIVE_WORDS: &[&str] = &["gain", "up", "rise", "positive", "growth", "bull"];
const NEGATIVE_WORDS: &[&str] = &["loss", "down", "fall", "negative", "decline", "bear"];
const MILESTONE_WORDS: &[&str] = &["breakthrough", "record", "highest", "milestone"];
const ALERT_WORDS: &[&str] = &["volatility", "crash", "plunge", "surge", "unusual"];
const SEVERE_WORDS: &[&str] = &["crash", "plunge"];

/// More than this many alerts adds a monitoring recommendation.
const ALERT_MONITORING_THRESHOLD: usize = 2;

pub fn company_queries(symbol: &str) -> Vec<String> {
    vec![
        format!("{symbol} stock price performance earnings latest"),
        format!("{symbol} quarterly results revenue growth analysis"),
        format!("{symbol} news announcements developments recent"),
    ]
}

pub fn sector_queries(sector: &str, year: i32) -> Vec<String> {
    vec![
        format!("{sector} sector performance trends analysis {year}"),
        format!("{sector} industry outlook growth opportunities"),
        format!("{sector} stocks leaders gainers performance"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    MarketOverview,
    CompanyPerformance,
    SectorTrends,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::MarketOverview => "market_overview",
            Category::CompanyPerformance => "company_performance",
            Category::SectorTrends => "sector_trends",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub category: Category,
    /// Ticker or sector name; `None` for market-wide queries.
    pub subject: Option<String>,
    pub finding: ResearchFinding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sentiment {
    Bullish,
    Bearish,
    #[default]
    Mixed,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::Bullish => "BULLISH",
            Sentiment::Bearish => "BEARISH",
            Sentiment::Mixed => "MIXED",
        })
    }
}

/// One side has to outweigh the other by half again to tip the call.
pub fn classify_sentiment(positive: usize, negative: usize) -> Sentiment {
    let (p, n) = (positive as f64, negative as f64);
    if p > n * 1.5 {
        Sentiment::Bullish
    } else if n > p * 1.5 {
        Sentiment::Bearish
    } else {
        Sentiment::Mixed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    High,
    Medium,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertLevel::High => "HIGH",
            AlertLevel::Medium => "MEDIUM",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub source: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketInsight {
    pub description: String,
    pub source: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub kind: &'static str,
    pub text: &'static str,
    pub reasoning: String,
    pub risk_level: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialAnalysis {
    pub sentiment: Sentiment,
    pub insights: Vec<MarketInsight>,
    pub alerts: Vec<Alert>,
    pub recommendations: Vec<Recommendation>,
}

pub fn analyze(data: &[DataPoint]) -> FinancialAnalysis {
    let mut analysis = FinancialAnalysis::default();
    let (mut positive, mut negative) = (0, 0);

    for point in data {
        let finding = &point.finding;
        let text = finding.answer.to_lowercase();
        if contains_any(&text, POSITIVE_WORDS) {
            positive += 1;
        }
        if contains_any(&text, NEGATIVE_WORDS) {
            negative += 1;
        }
        if contains_any(&text, MILESTONE_WORDS) {
            analysis.insights.push(MarketInsight {
                description: excerpt(&finding.answer, 200),
                source: finding.query.clone(),
                category: point.category,
            });
        }
        if contains_any(&text, ALERT_WORDS) {
            let level = if contains_any(&text, SEVERE_WORDS) {
                AlertLevel::High
            } else {
                AlertLevel::Medium
            };
            analysis.alerts.push(Alert {
                level,
                message: excerpt(&finding.answer, 150),
                source: finding.query.clone(),
                timestamp: finding.timestamp,
            });
        }
    }

    analysis.sentiment = classify_sentiment(positive, negative);
    analysis.recommendations = recommendations(analysis.sentiment, analysis.alerts.len());
    analysis
}

pub fn recommendations(sentiment: Sentiment, alert_count: usize) -> Vec<Recommendation> {
    let mut out = Vec::new();
    match sentiment {
        Sentiment::Bullish => out.push(Recommendation {
            kind: "INVESTMENT",
            text: "Consider increasing equity positions in strong-performing sectors",
            reasoning: "Market showing positive momentum across multiple indicators".to_string(),
            risk_level: "MODERATE",
        }),
        Sentiment::Bearish => out.push(Recommendation {
            kind: "RISK_MANAGEMENT",
            text: "Consider defensive positioning and portfolio hedging",
            reasoning: "Market showing concerning trends requiring caution".to_string(),
            risk_level: "HIGH",
        }),
        Sentiment::Mixed => {}
    }
    if alert_count > ALERT_MONITORING_THRESHOLD {
        out.push(Recommendation {
            kind: "MONITORING",
            text: "Increase portfolio monitoring frequency due to market volatility",
            reasoning: format!("{alert_count} significant market alerts detected"),
            risk_level: "MEDIUM",
        });
    }
    out
}

fn header(cells: &[&str]) -> Row {
    cells.iter().map(|c| json!(c)).collect()
}

pub fn summary_rows(data: &[DataPoint], analysis: &FinancialAnalysis, at: DateTime<Local>) -> Vec<Row> {
    vec![
        header(&["Timestamp", "Market Sentiment", "Total Insights", "Alerts", "Data Points"]),
        vec![
            json!(at.format("%Y-%m-%d %H:%M:%S").to_string()),
            json!(analysis.sentiment.to_string()),
            json!(analysis.insights.len()),
            json!(analysis.alerts.len()),
            json!(data.len()),
        ],
    ]
}

pub fn detail_rows(data: &[DataPoint]) -> Vec<Row> {
    let mut rows = vec![header(&["Timestamp", "Category", "Query", "Key_Data", "Sources", "Analysis"])];
    rows.extend(data.iter().map(|p| {
        vec![
            json!(p.finding.timestamp.to_rfc3339()),
            json!(p.category.as_str()),
            json!(p.finding.query),
            json!(preview(&p.finding.answer, 500)),
            json!(p.finding.sources.len()),
            json!("Processed"),
        ]
    }));
    rows
}

/// `None` when there is nothing to alert on.
pub fn alert_rows(alerts: &[Alert]) -> Option<Vec<Row>> {
    if alerts.is_empty() {
        return None;
    }
    let mut rows = vec![header(&["Timestamp", "Level", "Message", "Source"])];
    rows.extend(alerts.iter().map(|a| {
        vec![
            json!(a.timestamp.to_rfc3339()),
            json!(a.level.as_str()),
            json!(a.message),
            json!(a.source),
        ]
    }));
    Some(rows)
}

pub fn executive_report(
    data: &[DataPoint],
    analysis: &FinancialAnalysis,
    settings: &FinanceSettings,
    symbols: &[String],
    generated_at: DateTime<Local>,
) -> String {
    let stamp = generated_at.format("%B %d, %Y at %I:%M %p");
    let categories: HashSet<Category> = data.iter().map(|p| p.category).collect();
    let sentiment = analysis.sentiment.to_string();

    let mut report = format!(
        "📊 FINANCIAL INTELLIGENCE REPORT\n{rule}\n📅 Generated: {stamp}\n📈 Market Sentiment: {sentiment}\n\
📊 Data Points Analyzed: {points}\n🏷️ Categories Covered: {cats}\n\n💡 EXECUTIVE SUMMARY\n{short}\n\
Market analysis shows {lower} sentiment with {insights} significant insights and {alerts} alerts requiring attention.\n\n\
Tracking: {symbols} and sectors: {sectors}\n",
        rule = "=".repeat(50),
        points = data.len(),
        cats = categories.len(),
        short = "-".repeat(20),
        lower = sentiment.to_lowercase(),
        insights = analysis.insights.len(),
        alerts = analysis.alerts.len(),
        symbols = symbols.join(", "),
        sectors = settings.sectors.join(", "),
    );

    if !analysis.insights.is_empty() {
        report.push_str(&format!("\n🎯 KEY INSIGHTS\n{}\n", "-".repeat(15)));
        for (i, insight) in analysis.insights.iter().take(5).enumerate() {
            report.push_str(&format!("{}. {}\n   Source: {}\n\n", i + 1, insight.description, insight.source));
        }
    }
    if !analysis.alerts.is_empty() {
        report.push_str(&format!("🚨 MARKET ALERTS\n{}\n", "-".repeat(15)));
        for alert in &analysis.alerts {
            report.push_str(&format!("• **{}**: {}\n\n", alert.level.as_str(), alert.message));
        }
    }
    if !analysis.recommendations.is_empty() {
        report.push_str(&format!("💼 STRATEGIC RECOMMENDATIONS\n{}\n", "-".repeat(30)));
        for (i, rec) in analysis.recommendations.iter().enumerate() {
            report.push_str(&format!(
                "{}. **{}** (Risk: {})\n   {}\n   Reasoning: {}\n\n",
                i + 1,
                rec.kind,
                rec.risk_level,
                rec.text,
                rec.reasoning,
            ));
        }
    }

    report.push_str(&format!("📈 MARKET OVERVIEW\n{}\n", "-".repeat(17)));
    for point in data.iter().filter(|p| p.category == Category::MarketOverview).take(3) {
        report.push_str(&format!("• {}\n\n", preview(&point.finding.answer, 200)));
    }
    let companies: Vec<&DataPoint> = data
        .iter()
        .filter(|p| p.category == Category::CompanyPerformance)
        .take(3)
        .collect();
    if !companies.is_empty() {
        report.push_str(&format!("🏢 COMPANY HIGHLIGHTS\n{}\n", "-".repeat(20)));
        for point in companies {
            report.push_str(&format!(
                "• **{}**: {}\n\n",
                point.subject.as_deref().unwrap_or("N/A"),
                preview(&point.finding.answer, 150),
            ));
        }
    }

    report.push_str(&format!(
        "\n📊 DATA SOURCES & METHODOLOGY\n{rule}\n• Financial research via Perplexity AI\n\
• Keyword sentiment and alert detection\n\n🔗 DASHBOARD ACCESS\n{short}\n\
Full dashboard: https://docs.google.com/spreadsheets/d/{sheet}\n\n---\n\
🤖 Generated by Incredible Financial Dashboard\n📅 Report Date: {stamp}\n",
        rule = "-".repeat(30),
        short = "-".repeat(20),
        sheet = settings.sheet_id,
    ));
    report
}

/// Uppercases and trims a `--symbols` style list.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
pub struct FinanceSettings {
    pub sheet_id: String,
    pub recipients: Vec<String>,
    pub symbols: Vec<String>,
    pub sectors: Vec<String>,
}

impl FinanceSettings {
    pub fn from_config(ctx: &WorkflowContext) -> Result<Self, ConfigError> {
        let config = &ctx.config;
        Ok(Self {
            sheet_id: config.require("DASHBOARD_SHEET_ID")?.to_string(),
            recipients: config.list("REPORT_RECIPIENTS", ""),
            symbols: config.list("COMPANY_SYMBOLS", "AAPL,GOOGL,MSFT"),
            sectors: config.list("MARKET_SECTORS", "technology,finance,healthcare"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOutcome {
    pub data_points: usize,
    pub sentiment: Sentiment,
    pub alerts: usize,
    pub recipients_emailed: usize,
    pub report: String,
}

pub struct FinancialDashboard {
    ctx: WorkflowContext,
    settings: FinanceSettings,
}

impl FinancialDashboard {
    pub fn new(ctx: WorkflowContext) -> Result<Self, ConfigError> {
        let settings = FinanceSettings::from_config(&ctx)?;
        Ok(Self { ctx, settings })
    }

    pub fn settings(&self) -> &FinanceSettings {
        &self.settings
    }

    async fn collect(&self, category: Category, subject: Option<&str>, queries: &[String]) -> Vec<DataPoint> {
        self.ctx
            .research(queries)
            .await
            .into_iter()
            .map(|finding| DataPoint {
                category,
                subject: subject.map(str::to_string),
                finding,
            })
            .collect()
    }

    pub async fn gather(&self, symbols: &[String]) -> Vec<DataPoint> {
        let market: Vec<String> = MARKET_QUERIES.iter().map(|q| q.to_string()).collect();
        let mut data = self.collect(Category::MarketOverview, None, &market).await;
        info!(points = data.len(), "market overview research complete");

        for symbol in symbols {
            let points = self
                .collect(Category::CompanyPerformance, Some(symbol), &company_queries(symbol))
                .await;
            data.extend(points);
        }
        let year = Local::now().year();
        for sector in &self.settings.sectors {
            let points = self
                .collect(Category::SectorTrends, Some(sector), &sector_queries(sector, year))
                .await;
            data.extend(points);
        }
        data
    }

    async fn update_dashboard(&self, data: &[DataPoint], analysis: &FinancialAnalysis) {
        let sheets = self.ctx.integrations.sheets();
        let mut writes = vec![
            (SUMMARY_RANGE, summary_rows(data, analysis, Local::now())),
            (DETAIL_RANGE, detail_rows(data)),
        ];
        if let Some(rows) = alert_rows(&analysis.alerts) {
            writes.push((ALERTS_RANGE, rows));
        }
        for (range, rows) in writes {
            if let Err(e) = sheets.update_range(&self.settings.sheet_id, range, &rows).await {
                warn!(range, error = %e, "failed to update dashboard sheet");
            }
        }
    }

    /// `symbols` overrides the configured tickers when given.
    pub async fn run(&self, symbols: Option<Vec<String>>) -> anyhow::Result<DashboardOutcome> {
        let symbols = symbols.unwrap_or_else(|| self.settings.symbols.clone());
        let data = self.gather(&symbols).await;
        if data.is_empty() {
            bail!("no financial data collected");
        }

        let analysis = analyze(&data);
        info!(sentiment = %analysis.sentiment, insights = analysis.insights.len(), alerts = analysis.alerts.len(), "financial analysis complete");
        self.update_dashboard(&data, &analysis).await;

        let now = Local::now();
        let report = executive_report(&data, &analysis, &self.settings, &symbols, now);
        let recipients_emailed = if self.settings.recipients.is_empty() {
            info!("no report recipients configured, skipping email");
            0
        } else {
            let subject = format!("Financial Dashboard Report - {}", now.format("%B %d, %Y"));
            self.ctx.email_all(&self.settings.recipients, &subject, &report).await
        };

        Ok(DashboardOutcome {
            data_points: data.len(),
            sentiment: analysis.sentiment,
            alerts: analysis.alerts.len(),
            recipients_emailed,
            report,
        })
    }
}
