use serde_json::Value;
use std::sync::Arc;

use crate::features::classification::clients::ClassifierBackend;
use crate::features::classification::models::{
    Classification, ClassificationSchema, ClassificationSource,
};
use crate::features::reports::models::{Priority, ReportCategory};
use crate::shared::llm::{parse_json, response_schema};
use crate::shared::prompts::render_classification_prompt;

/// Assigns priority and category to report descriptions.
///
/// Never fails: every backend or parsing problem is turned into a fallback
/// classification so intake is never blocked.
pub struct Classifier {
    backend: Arc<dyn ClassifierBackend>,
    schema: Value,
}

impl Classifier {
    pub fn new(backend: Arc<dyn ClassifierBackend>) -> Self {
        Self {
            backend,
            schema: response_schema::<ClassificationSchema>(),
        }
    }

    pub async fn classify(&self, description: &str) -> Classification {
        let labels: Vec<&str> = ReportCategory::ALL.iter().map(|c| c.label()).collect();

        let prompt = match render_classification_prompt(description, &labels) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!("Failed to render classification prompt: {}", e);
                return Classification::unavailable();
            }
        };

        let text = match self.backend.generate(&prompt, &self.schema).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Classifier backend call failed: {}", e);
                return Classification::unavailable();
            }
        };

        if text.trim().is_empty() {
            tracing::warn!("Empty classifier response, using fallback");
            return Classification::unavailable();
        }

        let value = match parse_json(&text) {
            // A bare `null` has no fields to validate
            Ok(Value::Null) => {
                tracing::warn!("Null classifier response, using fallback");
                return Classification::unavailable();
            }
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Unparsable classifier response, using fallback: {}", e);
                return Classification::unavailable();
            }
        };

        match validate(&value) {
            Some(classification) => classification,
            None => {
                let output = value.to_string();
                tracing::warn!(
                    "Classifier output failed validation: {}, using fallback",
                    output
                );
                Classification::invalid()
            }
        }
    }
}

/// Must be an object whose `priority` is a JSON number and `category` an exact
/// vocabulary label. Arrays and scalars fail here, not at parsing.
fn validate(value: &Value) -> Option<Classification> {
    let score = value.get("priority").and_then(Value::as_f64)?;
    let category = value
        .get("category")
        .and_then(Value::as_str)
        .and_then(ReportCategory::from_label)?;

    Some(Classification {
        priority: Priority::from_score(score),
        category,
        source: ClassificationSource::Model,
    })
}
