// Template engine for README and HTML output

use super::context::DocContext;
use crate::error::Result;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

pub const README_TEMPLATE: &str = "readme.md";
pub const HTML_TEMPLATE: &str = "index.html";
pub const PAGE_TEMPLATE: &str = "page.html";

/// Tera with the built-in documents and custom filters registered.
///
/// Template names ending in `.html` are autoescaped by Tera; the markdown
/// template is not.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (README_TEMPLATE, include_str!("../../templates/readme.md.tera")),
            (HTML_TEMPLATE, include_str!("../../templates/index.html.tera")),
            (PAGE_TEMPLATE, include_str!("../../templates/page.html.tera")),
        ])?;
        register_filters(&mut tera);
        Ok(Self { tera })
    }

    pub fn render_readme(&self, ctx: &DocContext) -> Result<String> {
        self.render(README_TEMPLATE, &Context::from_serialize(ctx)?)
    }

    pub fn render_html(&self, ctx: &DocContext) -> Result<String> {
        self.render(HTML_TEMPLATE, &Context::from_serialize(ctx)?)
    }

    /// Wrap a Markdown document in a standalone HTML page
    pub fn render_markdown_page(&self, title: &str, markdown: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("body", markdown);
        self.render(PAGE_TEMPLATE, &context)
    }

    /// Render a named template with context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

fn register_filters(tera: &mut Tera) {
    tera.register_filter("truncate_words", truncate_words);
    tera.register_filter("pluralize", pluralize);
    tera.register_filter("slugify", slugify_filter);
}

/// Truncate text to a number of words
fn truncate_words(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value.as_str().unwrap_or("");
    let max_words = args
        .get("count")
        .and_then(|v| v.as_u64())
        .unwrap_or(50) as usize;

    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() <= max_words {
        Ok(Value::String(s.to_string()))
    } else {
        Ok(Value::String(format!("{}...", words[..max_words].join(" "))))
    }
}

/// Pluralize a word based on count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    let word = if count == 1 { singular } else { plural };
    Ok(Value::String(format!("{} {}", count, word)))
}

fn slugify_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(slugify(value.as_str().unwrap_or(""))))
}

/// Convert text to a URL-friendly anchor
pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
