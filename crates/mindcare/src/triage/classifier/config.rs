use serde::{Deserialize, Serialize};

use super::rules::{KeywordRule, RuleSet, RuleSetError};
use super::Category;

pub const DEFAULT_CRISIS_HOTLINE: &str = "988";

const CRISIS_REPLY: &str = "🚨 I'm concerned about what you've shared. You're not alone, and help is available. Please reach out to the National Suicide Prevention Lifeline at 988 or contact your campus counseling center immediately. Would you like me to help you find local crisis resources?";
const ANXIETY_REPLY: &str = "I understand you're feeling anxious. That's a very common experience for students. Let's try a quick breathing exercise: breathe in for 4 counts, hold for 4, breathe out for 6. Would you like me to guide you through some other coping strategies?";
const DEPRESSION_REPLY: &str = "I hear that you're going through a difficult time. These feelings are valid, and it's brave of you to reach out. Remember that small steps count - have you been able to eat something today or get a bit of fresh air?";
const ACADEMIC_REPLY: &str = "Academic pressure can be overwhelming. Remember that your worth isn't defined by your grades. Let's break this down - what specific aspect of your studies is causing the most stress right now?";
const GENERAL_REPLY: &str = "Thank you for sharing that with me. I'm here to listen and support you. Can you tell me more about how you're feeling right now? Sometimes talking through our thoughts can help us process them better.";

/// Serializable keyword rule as it appears in a triage profile. Keywords are matched as
/// written apart from case, so padding such as `" die "` is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub category: Category,
    pub keywords: Vec<String>,
    pub reply: String,
}

/// Rule data for the classifier. Order of `rules` does not affect precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_hotline")]
    pub crisis_hotline: String,
    pub fallback_reply: String,
    pub rules: Vec<RuleConfig>,
}

fn default_hotline() -> String {
    DEFAULT_CRISIS_HOTLINE.to_string()
}

impl ClassifierConfig {
    /// Vocabulary and replies used by the companion chat.
    pub fn standard() -> Self {
        Self {
            crisis_hotline: default_hotline(),
            fallback_reply: GENERAL_REPLY.to_string(),
            rules: vec![
                rule(
                    Category::Crisis,
                    &["hurt", "die", "suicide", "kill"],
                    CRISIS_REPLY,
                ),
                rule(
                    Category::Anxiety,
                    &["anxious", "worry", "panic", "stress"],
                    ANXIETY_REPLY,
                ),
                rule(
                    Category::Depression,
                    &["sad", "depressed", "lonely", "tired"],
                    DEPRESSION_REPLY,
                ),
                rule(
                    Category::AcademicStress,
                    &["exam", "study", "grade", "assignment"],
                    ACADEMIC_REPLY,
                ),
            ],
        }
    }

    /// Validates the rule data and hoists the crisis rule.
    ///
    /// Several crisis entries are merged: their keywords join the first entry, whose
    /// reply is kept.
    pub fn build(&self) -> Result<RuleSet, RuleSetError> {
        let mut crisis: Option<KeywordRule> = None;
        let mut others = Vec::with_capacity(self.rules.len());

        for entry in &self.rules {
            let rule = KeywordRule::new(entry.category, &entry.keywords, entry.reply.clone())?;
            if entry.category == Category::Crisis && crisis.is_none() {
                crisis = Some(rule);
            } else {
                others.push(rule);
            }
        }

        let crisis = crisis.ok_or(RuleSetError::MissingCrisisRule)?;
        if !crisis.reply().contains(self.crisis_hotline.as_str()) {
            return Err(RuleSetError::CrisisReplyWithoutHotline {
                hotline: self.crisis_hotline.clone(),
            });
        }

        RuleSet::new(crisis, others, self.fallback_reply.clone())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::standard()
    }
}

fn rule(category: Category, keywords: &[&str], reply: &str) -> RuleConfig {
    RuleConfig {
        category,
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        reply: reply.to_string(),
    }
}
