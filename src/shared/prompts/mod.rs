//! Prompt templates for model calls.
//!
//! Templates are stored in `templates/prompts/` and use Jinja2 syntax.

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::Value;
use std::collections::HashMap;

/// Render the report prioritization prompt.
///
/// `categories` is the closed vocabulary the model must choose from.
pub fn render_classification_prompt(
    description: &str,
    categories: &[&str],
) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("description", Value::from(description));
    ctx.insert(
        "categories",
        Value::from(categories.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
    );

    render_template("classification/prioritize.jinja", &ctx)
}
