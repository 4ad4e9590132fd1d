use schemars::JsonSchema;
use serde::Deserialize;

use crate::features::reports::models::{Priority, ReportCategory};

/// Shape the model is asked to produce.
///
/// `category` stays a free string here: vocabulary checks happen after parsing
/// so an out-of-vocabulary answer can be told apart from unparsable output.
#[allow(dead_code)]
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClassificationSchema {
    /// The priority score from 1 to 5.
    pub priority: f64,
    /// The primary issue category.
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Model,
    Fallback,
}

/// Priority and category attached to a report at intake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub priority: Priority,
    pub category: ReportCategory,
    pub source: ClassificationSource,
}

impl Classification {
    /// Backend unreachable, empty or unparsable output
    pub fn unavailable() -> Self {
        Self {
            priority: Priority::MIN,
            category: ReportCategory::Other,
            source: ClassificationSource::Fallback,
        }
    }

    /// Parsable output that failed validation
    pub fn invalid() -> Self {
        Self {
            priority: Priority::from_score(2.0),
            category: ReportCategory::Other,
            source: ClassificationSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ClassificationSource::Fallback
    }
}
