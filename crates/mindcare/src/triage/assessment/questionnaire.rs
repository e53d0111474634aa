use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier for a question, e.g. `q1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: u32,
    pub label: String,
}

/// One item with its ordinal answer scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn accepts(&self, value: u32) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    pub fn max_value(&self) -> u32 {
        self.options
            .last()
            .map(|option| option.value)
            .unwrap_or_default()
    }

    pub fn option_label(&self, value: u32) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestionnaireError {
    #[error("questionnaire has no questions")]
    Empty,
    #[error("question id '{0}' appears more than once")]
    DuplicateQuestionId(QuestionId),
    #[error("question '{0}' has no answer options")]
    NoOptions(QuestionId),
    #[error("option values for question '{0}' must be strictly increasing")]
    NonIncreasingValues(QuestionId),
    #[error("highest possible total exceeds {}", u32::MAX)]
    TotalOverflow,
}

#[derive(Deserialize)]
struct RawQuestionnaire {
    id: String,
    title: String,
    #[serde(default)]
    instructions: String,
    questions: Vec<Question>,
}

/// Fixed, ordered set of questions evaluated as a whole once complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Questionnaire {
    id: String,
    title: String,
    instructions: String,
    questions: Vec<Question>,
}

const PHQ9_INSTRUCTIONS: &str = "Over the last 2 weeks, how often have you been bothered by:";

const PHQ9_ITEMS: [&str; 9] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself - or that you are a failure or have let yourself or your family down",
    "Trouble concentrating on things, such as reading the newspaper or watching television",
    "Moving or speaking so slowly that other people could have noticed? Or the opposite - being so fidgety or restless that you have been moving around a lot more than usual",
    "Thoughts that you would be better off dead or of hurting yourself in some way",
];

impl Questionnaire {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        instructions: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuestionnaireError> {
        if questions.is_empty() {
            return Err(QuestionnaireError::Empty);
        }

        let mut seen = BTreeSet::new();
        for question in &questions {
            if !seen.insert(&question.id) {
                return Err(QuestionnaireError::DuplicateQuestionId(question.id.clone()));
            }
            if question.options.is_empty() {
                return Err(QuestionnaireError::NoOptions(question.id.clone()));
            }
            if question
                .options
                .windows(2)
                .any(|pair| pair[1].value <= pair[0].value)
            {
                return Err(QuestionnaireError::NonIncreasingValues(question.id.clone()));
            }
        }
        if checked_max_total(&questions).is_none() {
            return Err(QuestionnaireError::TotalOverflow);
        }

        Ok(Self {
            id: id.into(),
            title: title.into(),
            instructions: instructions.into(),
            questions,
        })
    }

    /// The three-item excerpt shown on the assessment page.
    pub fn phq9_screener() -> Self {
        Self::from_items("phq9-screener", "Mental Health Assessment (PHQ-9)", &PHQ9_ITEMS[..3])
    }

    pub fn phq9() -> Self {
        Self::from_items("phq9", "Patient Health Questionnaire (PHQ-9)", &PHQ9_ITEMS)
    }

    fn from_items(id: &str, title: &str, items: &[&str]) -> Self {
        let questions = items
            .iter()
            .enumerate()
            .map(|(index, prompt)| Question {
                id: QuestionId(format!("q{}", index + 1)),
                prompt: prompt.to_string(),
                options: frequency_scale(),
            })
            .collect();

        Self {
            id: id.to_string(),
            title: title.to_string(),
            instructions: PHQ9_INSTRUCTIONS.to_string(),
            questions,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.questions.iter().position(|question| &question.id == id)
    }

    /// Highest reachable total.
    pub fn max_total(&self) -> u32 {
        checked_max_total(&self.questions).unwrap_or(u32::MAX)
    }
}

impl<'de> Deserialize<'de> for Questionnaire {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawQuestionnaire::deserialize(deserializer)?;
        Self::new(raw.id, raw.title, raw.instructions, raw.questions)
            .map_err(serde::de::Error::custom)
    }
}

pub(crate) fn checked_max_total(questions: &[Question]) -> Option<u32> {
    questions
        .iter()
        .try_fold(0u32, |total, question| total.checked_add(question.max_value()))
}

fn frequency_scale() -> Vec<AnswerOption> {
    [
        (0, "Not at all"),
        (1, "Several days"),
        (2, "More than half the days"),
        (3, "Nearly every day"),
    ]
    .into_iter()
    .map(|(value, label)| AnswerOption {
        value,
        label: label.to_string(),
    })
    .collect()
}
