mod config;
mod rules;

pub use config::{ClassifierConfig, RuleConfig, DEFAULT_CRISIS_HOTLINE};
pub use rules::{KeywordRule, RuleSet, RuleSetError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Response category assigned to one piece of user text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crisis,
    Anxiety,
    Depression,
    AcademicStress,
    General,
}

impl Category {
    /// Evaluation rank; lower runs first. `General` is the fallback and never matched.
    pub fn priority(self) -> u8 {
        match self {
            Category::Crisis => 0,
            Category::Anxiety => 1,
            Category::Depression => 2,
            Category::AcademicStress => 3,
            Category::General => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Crisis => "crisis",
            Category::Anxiety => "anxiety",
            Category::Depression => "depression",
            Category::AcademicStress => "academic_stress",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category and canned reply chosen for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub reply: String,
    pub is_crisis: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
}

/// Stateless keyword classifier. Cloning shares the underlying rule set.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Arc<RuleSet>,
}

impl Classifier {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn standard() -> Self {
        let rules = ClassifierConfig::standard()
            .build()
            .expect("standard classifier rules are valid");
        Self::new(rules)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Total over all inputs: unmatched text, including the empty string, is `General`.
    ///
    /// Matching is case-insensitive substring containment with no other normalization.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let folded = text.to_lowercase();
        let hit = self.rules.evaluate(&folded);

        tracing::debug!(category = %hit.category, "classified message");

        ClassificationResult {
            category: hit.category,
            reply: hit.reply.to_string(),
            is_crisis: hit.category == Category::Crisis,
            matched_keyword: hit.keyword.map(str::to_string),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}
