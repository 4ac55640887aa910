//! Multi-query topic research with keyword analysis, a Sheets archive and an
//! emailed executive report.

use anyhow::bail;
use chrono::{DateTime, Datelike, Local};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::WorkflowContext;
use crate::error::ConfigError;
use crate::integrations::ResearchFinding;
use crate::integrations::sheets::Row;
use crate::utils::{contains_any, excerpt, preview};

pub const DATA_RANGE: &str = "Research_Data!A:F";
pub const ANALYSIS_RANGE: &str = "Analysis!A:E";

const THEME_WORDS: &[&str] = &["trend", "trending", "growth", "increase"];
const OPPORTUNITY_WORDS: &[&str] = &["opportunity", "potential", "market", "demand"];
const CHALLENGE_WORDS: &[&str] = &["challenge", "barrier", "difficulty", "problem"];

pub fn research_queries(topic: &str, year: i32) -> Vec<String> {
    vec![
        format!("{topic} latest developments {year}"),
        format!("{topic} market trends analysis current"),
        format!("{topic} challenges opportunities industry"),
        format!("{topic} expert opinions predictions future"),
        format!("{topic} case studies success stories recent"),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub label: &'static str,
    pub source_query: String,
    pub evidence: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchAnalysis {
    pub key_themes: Vec<Insight>,
    pub opportunities: Vec<Insight>,
    pub challenges: Vec<Insight>,
}

pub fn analyze(findings: &[ResearchFinding]) -> ResearchAnalysis {
    let mut analysis = ResearchAnalysis::default();
    for finding in findings {
        let text = finding.answer.to_lowercase();
        let insight = |label| Insight {
            label,
            source_query: finding.query.clone(),
            evidence: excerpt(&finding.answer, 200),
        };
        if contains_any(&text, THEME_WORDS) {
            analysis.key_themes.push(insight("Growth Trend"));
        }
        if contains_any(&text, OPPORTUNITY_WORDS) {
            analysis.opportunities.push(insight("Market Opportunity"));
        }
        if contains_any(&text, CHALLENGE_WORDS) {
            analysis.challenges.push(insight("Industry Challenge"));
        }
    }
    analysis
}

pub fn data_rows(topic: &str, findings: &[ResearchFinding]) -> Vec<Row> {
    let mut rows = vec![header(&["Timestamp", "Topic", "Query", "Answer", "Sources Count", "Analysis"])];
    rows.extend(findings.iter().map(|f| {
        vec![
            json!(f.timestamp.to_rfc3339()),
            json!(topic),
            json!(f.query),
            json!(preview(&f.answer, 1000)),
            json!(f.sources.len()),
            json!("Processed"),
        ]
    }));
    rows
}

pub fn analysis_rows(topic: &str, analysis: &ResearchAnalysis, at: DateTime<Local>) -> Vec<Row> {
    let timestamp = at.format("%Y-%m-%d %H:%M:%S").to_string();
    let mut rows = vec![header(&["Timestamp", "Topic", "Category", "Insight", "Source Query"])];
    let groups = [
        ("Theme", &analysis.key_themes),
        ("Opportunity", &analysis.opportunities),
        ("Challenge", &analysis.challenges),
    ];
    for (category, insights) in groups {
        rows.extend(insights.iter().map(|i| {
            vec![
                json!(timestamp),
                json!(topic),
                json!(category),
                json!(i.evidence),
                json!(i.source_query),
            ]
        }));
    }
    rows
}

fn header(cells: &[&str]) -> Row {
    cells.iter().map(|c| Value::String(c.to_string())).collect()
}

fn numbered(out: &mut String, heading: &str, insights: &[Insight]) {
    if insights.is_empty() {
        return;
    }
    out.push_str(heading);
    out.push('\n');
    for (i, insight) in insights.iter().take(3).enumerate() {
        out.push_str(&format!("{}. {}\n\n", i + 1, insight.evidence));
    }
}

pub fn executive_report(
    topic: &str,
    findings: &[ResearchFinding],
    analysis: &ResearchAnalysis,
    sheet_id: &str,
    generated_at: DateTime<Local>,
) -> String {
    let stamp = generated_at.format("%B %d, %Y at %I:%M %p").to_string();
    let total_sources: usize = findings.iter().map(|f| f.sources.len()).sum();

    let mut report = format!(
        "📊 RESEARCH REPORT: {upper}
{rule}
📅 Generated: {stamp}
🔍 Research Queries: {queries}
📚 Total Sources: {total_sources}

📋 EXECUTIVE SUMMARY
{short}
This report covers {topic} based on {queries} targeted research queries and {total_sources} sources. The analysis highlights trends, opportunities and challenges in this domain.

🎯 KEY FINDINGS
{short}
",
        upper = topic.to_uppercase(),
        rule = "=".repeat(50),
        queries = findings.len(),
        short = "-".repeat(20),
    );
    numbered(&mut report, "\n🔍 Major Themes:", &analysis.key_themes);
    numbered(&mut report, "💡 Key Opportunities:", &analysis.opportunities);
    numbered(&mut report, "⚠️  Key Challenges:", &analysis.challenges);

    report.push_str(&format!("\n📚 DETAILED RESEARCH FINDINGS\n{}\n", "-".repeat(30)));
    for (i, finding) in findings.iter().enumerate() {
        report.push_str(&format!(
            "\n{n}. {query}\n{underline}\n{answer}\n\nSources: {sources} references\n{rule}\n",
            n = i + 1,
            query = finding.query,
            underline = "-".repeat(finding.query.chars().count()),
            answer = preview(&finding.answer, 500),
            sources = finding.sources.len(),
            rule = "-".repeat(20),
        ));
    }

    report.push_str(&format!(
        "
📈 RECOMMENDATIONS
{rule}
1. Investigate the most promising opportunities identified
2. Develop strategies for the key challenges
3. Keep monitoring trends and developments

📋 DATA ACCESS
{rule}
Full research data: https://docs.google.com/spreadsheets/d/{sheet_id}

---
🤖 Generated by Incredible Research Reporter
📅 Report Date: {stamp}
",
        rule = "-".repeat(20),
    ));
    report
}

#[derive(Debug, Clone)]
pub struct ResearchSettings {
    pub sheet_id: String,
    pub recipients: Vec<String>,
}

impl ResearchSettings {
    pub fn from_config(ctx: &WorkflowContext) -> Result<Self, ConfigError> {
        Ok(Self {
            sheet_id: ctx.config.require("RESEARCH_SHEET_ID")?.to_string(),
            recipients: ctx.config.list("REPORT_RECIPIENTS", ""),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOutcome {
    pub findings: usize,
    pub total_sources: usize,
    pub recipients_emailed: usize,
    pub report: String,
}

pub struct ResearchReporter {
    ctx: WorkflowContext,
    settings: ResearchSettings,
}

impl ResearchReporter {
    pub fn new(ctx: WorkflowContext) -> Result<Self, ConfigError> {
        let settings = ResearchSettings::from_config(&ctx)?;
        Ok(Self { ctx, settings })
    }

    pub async fn research_topic(&self, topic: &str) -> Vec<ResearchFinding> {
        let queries = research_queries(topic, Local::now().year());
        self.ctx.research(&queries).await
    }

    async fn archive(&self, topic: &str, findings: &[ResearchFinding], analysis: &ResearchAnalysis) {
        let sheets = self.ctx.integrations.sheets();
        let writes = [
            (DATA_RANGE, data_rows(topic, findings)),
            (ANALYSIS_RANGE, analysis_rows(topic, analysis, Local::now())),
        ];
        for (range, rows) in writes {
            if let Err(e) = sheets.update_range(&self.settings.sheet_id, range, &rows).await {
                warn!(range, error = %e, "failed to update research sheet");
            }
        }
    }

    /// Fails only when no query produced a finding.
    pub async fn run(&self, topic: &str) -> anyhow::Result<ResearchOutcome> {
        let findings = self.research_topic(topic).await;
        if findings.is_empty() {
            bail!("no research data collected for {topic:?}");
        }

        let analysis = analyze(&findings);
        info!(themes = analysis.key_themes.len(), opportunities = analysis.opportunities.len(), challenges = analysis.challenges.len(), "analysis complete");
        self.archive(topic, &findings, &analysis).await;

        let now = Local::now();
        let report = executive_report(topic, &findings, &analysis, &self.settings.sheet_id, now);
        let recipients_emailed = if self.settings.recipients.is_empty() {
            info!("no report recipients configured, skipping email");
            0
        } else {
            let subject = format!("Research Report: {topic} - {}", now.format("%B %d, %Y"));
            self.ctx.email_all(&self.settings.recipients, &subject, &report).await
        };

        Ok(ResearchOutcome {
            findings: findings.len(),
            total_sources: findings.iter().map(|f| f.sources.len()).sum(),
            recipients_emailed,
            report,
        })
    }
}
