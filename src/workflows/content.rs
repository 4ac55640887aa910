//! Researches a topic and drafts blog, social and newsletter documents in
//! Google Docs, then tells the content team where to find them.

use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, Datelike, Local};
use tracing::{info, warn};

use super::WorkflowContext;
use crate::error::ConfigError;
use crate::integrations::{DocumentRef, ResearchFinding};
use crate::utils::{contains_any, excerpt, preview, title_case};

pub const MAX_ANGLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    BlogPost,
    SocialMedia,
    Newsletter,
}

impl ContentType {
    pub fn document_suffix(self) -> &'static str {
        match self {
            ContentType::BlogPost => "Blog Post",
            ContentType::SocialMedia => "Social Media Content",
            ContentType::Newsletter => "Newsletter Content",
        }
    }
}

impl FromStr for ContentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "blog_post" => Ok(ContentType::BlogPost),
            "social_media" => Ok(ContentType::SocialMedia),
            "newsletter" => Ok(ContentType::Newsletter),
            other => Err(ConfigError::Invalid {
                key: "CONTENT_TYPES".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

pub fn content_queries(topic: &str, year: i32) -> Vec<String> {
    vec![
        format!("{topic} latest trends developments {year}"),
        format!("{topic} expert opinions thought leadership"),
        format!("{topic} case studies success stories examples"),
        format!("{topic} challenges problems solutions industry"),
        format!("{topic} future predictions outlook trends"),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentAngle {
    pub angle: &'static str,
    pub description: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentAnalysis {
    pub angles: Vec<ContentAngle>,
    /// Distinct, in order of first appearance.
    pub key_themes: Vec<&'static str>,
}

const ANGLES: &[(&str, &[&str])] = &[
    ("Trend Analysis", &["trend", "emerging", "new", "latest"]),
    ("Problem-Solution", &["challenge", "problem", "issue", "solution"]),
    ("Expert Insight", &["expert", "opinion", "analysis", "insight"]),
];
const THEMES: &[(&str, &[&str])] = &[
    ("Growth & Expansion", &["growth", "increase", "expand"]),
    ("Innovation & Technology", &["innovation", "technology", "digital"]),
];

pub fn analyze_opportunities(findings: &[ResearchFinding]) -> ContentAnalysis {
    let mut analysis = ContentAnalysis::default();
    for finding in findings {
        let text = finding.answer.to_lowercase();
        for (angle, words) in ANGLES {
            if contains_any(&text, words) {
                analysis.angles.push(ContentAngle {
                    angle,
                    description: excerpt(&finding.answer, 200),
                    source: finding.query.clone(),
                });
            }
        }
        for (theme, words) in THEMES {
            if contains_any(&text, words) && !analysis.key_themes.contains(theme) {
                analysis.key_themes.push(theme);
            }
        }
    }
    analysis.angles.truncate(MAX_ANGLES);
    analysis
}

// "AI latest trends developments 2025" -> "latest trends developments 2025"
fn query_focus(query: &str, topic: &str) -> String {
    query.replace(topic, "").trim().to_string()
}

pub fn blog_post(topic: &str, findings: &[ResearchFinding], analysis: &ContentAnalysis, at: DateTime<Local>) -> String {
    let lower = topic.to_lowercase();
    let mut out = format!(
        "# {topic}: Latest Trends and Insights\n\n*Published: {date}*\n*Reading Time: 5-7 minutes*\n\n\
## Introduction\n\n{topic} keeps evolving, bringing new opportunities and challenges for businesses and professionals. \
This piece looks at recent developments, expert views and where the field is heading.\n\n\
## Current Landscape\n\nRecent research points to significant change in {lower}:\n\n",
        date = at.format("%B %d, %Y"),
    );
    for (i, finding) in findings.iter().take(3).enumerate() {
        out.push_str(&format!(
            "\n### {}. Key Finding: {}\n\n{}\n\n",
            i + 1,
            query_focus(&finding.query, topic),
            preview(&finding.answer, 400),
        ));
    }
    if !analysis.key_themes.is_empty() {
        out.push_str("\n## Major Themes and Trends\n\n");
        for theme in &analysis.key_themes {
            out.push_str(&format!("- **{theme}**: driving change across the industry\n"));
        }
    }
    out.push_str("\n\n## Expert Perspectives\n\n");
    if let Some(angle) = analysis.angles.first() {
        out.push_str(&format!("### {}\n\n{}\n\n", angle.angle, angle.description));
    }
    out.push_str(&format!(
        "\n## Looking Ahead\n\nOrganisations that adapt quickly to changes in {lower} will be best placed to use the opportunities ahead.\n\n\
## Key Takeaways\n\n- Monitor emerging trends and their impact\n- Follow expert analysis and industry insight\n- Plan for continued change in this space\n\n\
---\n\n**Sources:** analysis of {count} research queries.\n",
        count = findings.len(),
    ));
    out
}

pub fn social_media(topic: &str, findings: &[ResearchFinding], analysis: &ContentAnalysis, at: DateTime<Local>) -> String {
    let lower = topic.to_lowercase();
    let first_theme = analysis.key_themes.first().copied().unwrap_or("Major industry shifts");
    let mut out = format!(
        "# {topic} - Social Media Content\n\n*Created: {date}*\n\n## LinkedIn Post\n\n\
🚀 **{topic} Update: What You Need to Know**\n\nLatest research on {lower}:\n\n",
        date = at.format("%B %d, %Y"),
    );
    for finding in findings.iter().take(3) {
        out.push_str(&format!("• {}\n", preview(&finding.answer, 100)));
    }
    let insight = findings
        .first()
        .map(|f| excerpt(&f.answer, 100))
        .unwrap_or_else(|| "Significant developments ahead".to_string());
    out.push_str(&format!(
        "\nAre you ready for these changes?\n\n#Technology #Innovation #Business #Trends\n\n---\n\n\
## Twitter Thread\n\n1/5 🔥 {topic} is heating up. Here's what experts are saying...\n\n\
2/5 📊 Key trend: {first_theme}\n\n3/5 💡 Expert insight: {insight}\n\n\
4/5 🎯 What this means: organisations need to adapt quickly\n\n\
5/5 🚀 Bottom line: {topic} will keep evolving. Stay informed!\n\n---\n\n\
## Instagram Caption\n\n🌟 {topic} Spotlight\n\nOur latest research into {lower} turned up some big insights.\n\n\
✨ Innovation accelerating\n✨ New opportunities emerging\n\n#Innovation #Technology #Future\n\n---\n\n\
## Newsletter Snippet\n\n**This Week in {topic}**\n\n🔍 **Research Highlights:**\n",
    ));
    for finding in findings.iter().take(2) {
        out.push_str(&format!("• {}\n", excerpt(&finding.answer, 80)));
    }
    out.push_str(&format!("\n📈 **Trend Watch:** {first_theme}\n"));
    out
}

pub fn newsletter(topic: &str, findings: &[ResearchFinding], analysis: &ContentAnalysis, at: DateTime<Local>) -> String {
    let lower = topic.to_lowercase();
    let mut out = format!(
        "# Weekly Newsletter: {topic} Edition\n\n*Issue Date: {date}*\n\n## 📧 Subject Line Options\n\
- \"This Week in {topic}: Major Developments You Can't Miss\"\n\
- \"{topic} Insights: Latest Trends and Expert Analysis\"\n\n\
## 📰 Newsletter Content\n\n**Hello [First Name],**\n\nWelcome to this week's {topic} newsletter.\n\n\
### 🔥 What's Trending\n\n",
        date = at.format("%B %d, %Y"),
    );
    for (i, finding) in findings.iter().take(3).enumerate() {
        out.push_str(&format!(
            "\n**{}. {}**\n{}\n\n",
            i + 1,
            title_case(&query_focus(&finding.query, topic)),
            preview(&finding.answer, 200),
        ));
    }
    out.push_str("\n### 💡 Expert Insights\n\n");
    if let Some(angle) = analysis.angles.first() {
        out.push_str(&format!("{}\n\n", angle.description));
    }
    out.push_str(&format!("\n### 📈 Looking Ahead\n\nTrends worth watching in {lower}:\n\n"));
    for theme in analysis.key_themes.iter().take(3) {
        out.push_str(&format!("• {theme}\n"));
    }
    out.push_str("\n\n**Questions or feedback?** Reply to this email.\n\nBest regards,\nThe Research Team\n");
    out
}

pub fn distribution_email(
    topic: &str,
    documents: &[DocumentRef],
    audience: &str,
    at: DateTime<Local>,
) -> (String, String) {
    let subject = format!("New Content Ready: {topic} - {}", at.format("%B %d, %Y"));
    let stamp = at.format("%B %d, %Y at %I:%M %p");
    let mut body = format!(
        "📄 **Content Distribution Notification**\n📅 Generated: {stamp}\n\nHi Team,\n\n\
New content for **{topic}** is ready for review and publication.\n\n📋 **Generated Content:**\n"
    );
    for doc in documents {
        body.push_str(&format!("\n• **{}**\n  📎 Google Doc: {}\n", doc.title, doc.url));
    }
    body.push_str(&format!(
        "\n\n🎯 **Next Steps:**\n1. Review content for accuracy and brand voice\n2. Edit as needed\n\
3. Schedule publication\n4. Track engagement\n\n📊 **Notes:**\n- Based on {topic} research\n\
- Written for a {audience} audience\n\nBest regards,\nContent Generation Team\n",
    ));
    (subject, body)
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub folder_id: String,
    pub team_emails: Vec<String>,
    pub content_types: Vec<ContentType>,
    pub target_audience: String,
}

impl ContentSettings {
    pub fn from_config(ctx: &WorkflowContext) -> Result<Self, ConfigError> {
        let config = &ctx.config;
        let content_types = config
            .list("CONTENT_TYPES", "blog_post,social_media,newsletter")
            .iter()
            .filter_map(|t| match t.parse() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    warn!(error = %e, "skipping unknown content type");
                    None
                }
            })
            .collect();
        Ok(Self {
            folder_id: config.require("CONTENT_FOLDER_ID")?.to_string(),
            team_emails: config.list("CONTENT_TEAM_EMAILS", ""),
            content_types,
            target_audience: config.get_or("TARGET_AUDIENCE", "professionals"),
        })
    }
}

pub struct ContentGenerator {
    ctx: WorkflowContext,
    settings: ContentSettings,
}

impl ContentGenerator {
    pub fn new(ctx: WorkflowContext) -> Result<Self, ConfigError> {
        let settings = ContentSettings::from_config(&ctx)?;
        Ok(Self { ctx, settings })
    }

    pub fn settings(&self) -> &ContentSettings {
        &self.settings
    }

    fn render(&self, kind: ContentType, topic: &str, findings: &[ResearchFinding], analysis: &ContentAnalysis) -> String {
        let now = Local::now();
        match kind {
            ContentType::BlogPost => blog_post(topic, findings, analysis, now),
            ContentType::SocialMedia => social_media(topic, findings, analysis, now),
            ContentType::Newsletter => newsletter(topic, findings, analysis, now),
        }
    }

    /// Returns the documents that were created.
    pub async fn run(&self, topic: &str) -> anyhow::Result<Vec<DocumentRef>> {
        let findings = self
            .ctx
            .research(&content_queries(topic, Local::now().year()))
            .await;
        if findings.is_empty() {
            bail!("no research data collected for {topic:?}");
        }
        let analysis = analyze_opportunities(&findings);
        info!(angles = analysis.angles.len(), themes = analysis.key_themes.len(), "content analysis complete");

        let docs = self.ctx.integrations.docs();
        let mut documents = Vec::new();
        for kind in &self.settings.content_types {
            let title = format!("{topic} - {}", kind.document_suffix());
            let content = self.render(*kind, topic, &findings, &analysis);
            match docs.create_document(&title, &content, &self.settings.folder_id).await {
                Ok(Some(doc)) => documents.push(doc),
                Ok(None) => warn!(%title, "document was not created"),
                Err(e) => warn!(%title, error = %e, "failed to create document"),
            }
            self.ctx.pause().await;
        }

        if !documents.is_empty() && !self.settings.team_emails.is_empty() {
            let (subject, body) =
                distribution_email(topic, &documents, &self.settings.target_audience, Local::now());
            let sent = self.ctx.email_all(&self.settings.team_emails, &subject, &body).await;
            info!(sent, "distribution email sent");
        }
        Ok(documents)
    }
}
