//! Utilities a writing model can lean on: research notes, text statistics,
//! Markdown framing and file output confined to one workspace directory.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use chrono::Local;
use serde_json::{Value, json};
use tracing::info;

use super::{clock, definition, int_arg_or, string_arg, text_arg};
use crate::function_registry::FunctionRegistry;

pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const FILE_TYPES: &[&str] = &["txt", "md", "html", "json"];

const WORDS_PER_MINUTE: f64 = 200.0;

/// Directory all file functions read and write under.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Accepts names relative to the workspace, or paths already prefixed
    /// with it as returned by `create_file`. Anything escaping it is refused.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, String> {
        let path = Path::new(name.trim());
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let mut components = relative.components().peekable();
        if components.peek().is_none() || !components.all(|c| matches!(c, Component::Normal(_))) {
            return Err(format!("'{name}' is outside the workspace"));
        }
        Ok(self.root.join(relative))
    }

    pub fn create_file(&self, filename: &str, content: &str, file_type: &str) -> Result<PathBuf, String> {
        if !FILE_TYPES.contains(&file_type) {
            return Err(format!("unsupported file type '{file_type}'"));
        }
        let path = self.resolve(&format!("{filename}.{file_type}"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("Error: {e}"))?;
        }
        fs::write(&path, content).map_err(|e| format!("Error: {e}"))?;
        info!(path = %path.display(), bytes = content.len(), "file created");
        Ok(path)
    }

    /// The file must already exist.
    pub fn append(&self, filename: &str, content: &str) -> Result<(), String> {
        let path = self.resolve(filename)?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| format!("Error: {e}"))?;
        write!(file, "\n\n{content}").map_err(|e| format!("Error: {e}"))
    }

    pub fn read(&self, filename: &str) -> Result<String, String> {
        let path = self.resolve(filename)?;
        fs::read_to_string(&path).map_err(|e| format!("Error reading file: {e}"))
    }
}

/// Offline research notes shaped like a search summary.
pub fn search_web(input: &Value) -> Result<Value, String> {
    let query = string_arg(input, "query")?;
    let num_results = int_arg_or(input, "num_results", 5)?.clamp(1, 10);
    let lower = query.to_lowercase();
    let about_dev_ai = lower.split_whitespace().any(|w| w == "ai")
        && (lower.contains("developer") || lower.contains("software"));

    if about_dev_ai {
        return Ok(json!({
            "query": query,
            "key_insights": [
                "AI tools like GitHub Copilot and ChatGPT are enhancing developer productivity by 30-50%",
                "Software developers are adapting rather than being replaced - AI handles routine tasks while developers focus on complex problem-solving",
                "New roles emerging: AI/ML engineers, prompt engineers, AI ethics specialists",
                "Skills in demand: AI integration, machine learning, data analysis, human-AI collaboration",
                "Companies report 40% faster development cycles when using AI coding assistants",
                "Developer job market remains strong with 22% projected growth through 2030"
            ],
            "statistics": {
                "productivity_increase": "30-50% with AI tools",
                "job_growth_projection": "22% through 2030",
                "companies_using_ai": "65% of tech companies",
                "developer_satisfaction": "78% positive about AI integration"
            },
            "expert_opinions": [
                "AI augments human creativity rather than replacing it - developers become AI collaborators",
                "The future belongs to developers who can effectively work alongside AI systems",
                "Coding will shift from writing syntax to designing solutions and managing AI outputs"
            ],
            "total_results": num_results,
            "research_quality": "comprehensive"
        }));
    }
    Ok(json!({
        "query": query,
        "summary": format!("Found {num_results} relevant results about {query}"),
        "key_findings": [
            format!("Current trends in {query} show significant industry growth"),
            format!("Expert analysis reveals emerging opportunities in {query}"),
            format!("Recent research indicates important developments in {query}")
        ],
        "total_results": num_results
    }))
}

pub fn count_words(input: &Value) -> Result<Value, String> {
    let text = input
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing argument 'text'".to_string())?;
    Ok(text_statistics(text))
}

pub fn text_statistics(text: &str) -> Value {
    let words = text.split_whitespace().count();
    let sentences = text.split('.').filter(|s| !s.trim().is_empty()).count();
    let paragraphs = text.split("\n\n").filter(|p| !p.trim().is_empty()).count();
    let round1 = |v: f64| (v * 10.0).round() / 10.0;
    json!({
        "word_count": words,
        "character_count": text.chars().count(),
        "character_count_no_spaces": text.chars().filter(|c| *c != ' ').count(),
        "sentence_count": sentences,
        "paragraph_count": paragraphs,
        "average_words_per_sentence": round1(words as f64 / sentences.max(1) as f64),
        "reading_time_minutes": round1(words as f64 / WORDS_PER_MINUTE)
    })
}

pub fn format_as_markdown(input: &Value) -> Result<Value, String> {
    let content = string_arg(input, "content")?;
    let title = text_arg(input, "title").unwrap_or_else(|| "Document".to_string());
    Ok(json!(markdown_document(&title, &content)))
}

pub fn markdown_document(title: &str, content: &str) -> String {
    format!(
        "# {title}\n\n*Generated on {}*\n\n---\n\n{content}\n\n---\n\n*This content was generated using the Incredible API with function calling capabilities.*\n",
        Local::now().format("%Y-%m-%d at %H:%M:%S")
    )
}

pub fn register(registry: &mut FunctionRegistry, workspace: Workspace) {
    registry.register(
        definition(
            "search_web",
            "Search for information about a topic and return structured results",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query to find information about" },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of search results to return (1-10)",
                        "minimum": 1,
                        "maximum": 10
                    }
                },
                "required": ["query"]
            }),
        ),
        search_web,
    );

    let ws = workspace.clone();
    registry.register(
        definition(
            "create_file",
            "Create a new file with specified content",
            json!({
                "type": "object",
                "properties": {
                    "filename": { "type": "string", "description": "Name for the new file (without extension)" },
                    "content": { "type": "string", "description": "Content to write to the file" },
                    "file_type": { "type": "string", "description": "File extension/type", "enum": FILE_TYPES }
                },
                "required": ["filename", "content"]
            }),
        ),
        move |input| {
            let filename = string_arg(input, "filename")?;
            let content = input.get("content").and_then(Value::as_str).unwrap_or_default();
            let file_type = text_arg(input, "file_type").unwrap_or_else(|| "txt".to_string());
            let path = ws.create_file(&filename, content, &file_type)?;
            Ok(json!(path.display().to_string()))
        },
    );

    let ws = workspace.clone();
    registry.register(
        definition(
            "append_to_file",
            "Append additional content to an existing file",
            json!({
                "type": "object",
                "properties": {
                    "filename": { "type": "string", "description": "Path to the existing file" },
                    "new_content": { "type": "string", "description": "Content to append to the file" }
                },
                "required": ["filename", "new_content"]
            }),
        ),
        move |input| {
            let filename = string_arg(input, "filename")?;
            let content = string_arg(input, "new_content")?;
            ws.append(&filename, &content)?;
            Ok(json!(format!("Content appended to {filename}")))
        },
    );

    registry.register(
        definition(
            "read_file_content",
            "Read and return the contents of a file",
            json!({
                "type": "object",
                "properties": {
                    "filename": { "type": "string", "description": "Path to the file to read" }
                },
                "required": ["filename"]
            }),
        ),
        move |input| {
            let filename = string_arg(input, "filename")?;
            Ok(json!(workspace.read(&filename)?))
        },
    );

    registry.register(
        definition(
            "count_words",
            "Analyze text and return word count, reading time, and other statistics",
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "Text content to analyze" }
                },
                "required": ["text"]
            }),
        ),
        count_words,
    );
    registry.register(
        definition(
            "format_as_markdown",
            "Format content as structured Markdown with title and metadata",
            json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "Content to format as Markdown" },
                    "title": { "type": "string", "description": "Title for the Markdown document" }
                },
                "required": ["content"]
            }),
        ),
        format_as_markdown,
    );
    clock::register(registry);
}
