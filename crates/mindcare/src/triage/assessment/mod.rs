mod bands;
mod questionnaire;

pub use bands::{Band, BandTable, BandTableError, BandThreshold, Interpretation};
pub use questionnaire::{AnswerOption, Question, QuestionId, Questionnaire, QuestionnaireError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chosen value per question id. Built incrementally; valid once it covers every question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<QuestionId, u32>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records or revises an answer, returning the previous value.
    pub fn insert(&mut self, question_id: QuestionId, value: u32) -> Option<u32> {
        self.0.insert(question_id, value)
    }

    pub fn get(&self, question_id: &QuestionId) -> Option<u32> {
        self.0.get(question_id).copied()
    }

    pub fn contains(&self, question_id: &QuestionId) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn remove(&mut self, question_id: &QuestionId) -> Option<u32> {
        self.0.remove(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, u32)> {
        self.0.iter().map(|(id, value)| (id, *value))
    }
}

impl<K: Into<QuestionId>> FromIterator<(K, u32)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (K, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(id, value)| (id.into(), value)).collect())
    }
}

/// Total, band and referral flag for a completed answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total: u32,
    pub max_total: u32,
    pub band: Band,
    pub recommend_to_seek_help: bool,
}

impl ScoreResult {
    pub fn interpretation(&self) -> Interpretation {
        self.band.interpretation()
    }
}

/// Answer-set problems detected before any score is computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    #[error("answers missing for question(s): {}", join_ids(.missing))]
    IncompleteAnswers { missing: Vec<QuestionId> },
    #[error("answer references unknown question '{0}'")]
    UnknownQuestionId(QuestionId),
    #[error("value {value} is not an option for question '{question_id}'")]
    OutOfRangeValue { question_id: QuestionId, value: u32 },
    #[error("highest possible total does not fit in a score")]
    TotalOverflow,
}

impl AssessmentError {
    /// Stable tag for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            AssessmentError::IncompleteAnswers { .. } => "incomplete_answers",
            AssessmentError::UnknownQuestionId(_) => "unknown_question_id",
            AssessmentError::OutOfRangeValue { .. } => "out_of_range_value",
            AssessmentError::TotalOverflow => "total_overflow",
        }
    }
}

fn join_ids(ids: &[QuestionId]) -> String {
    ids.iter()
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stateless scorer applying a band table to completed answer sets.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    bands: BandTable,
}

impl ScoringEngine {
    pub fn new(bands: BandTable) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &BandTable {
        &self.bands
    }

    /// True when every question has an answer. Extra ids are ignored here and rejected by
    /// [`ScoringEngine::score`].
    pub fn is_complete(&self, questions: &[Question], answers: &AnswerSet) -> bool {
        questions
            .iter()
            .all(|question| answers.contains(&question.id))
    }

    /// Checks, in order: unknown ids, out-of-range values, missing answers.
    pub fn validate(
        &self,
        questions: &[Question],
        answers: &AnswerSet,
    ) -> Result<(), AssessmentError> {
        for (question_id, value) in answers.iter() {
            let question = questions
                .iter()
                .find(|question| &question.id == question_id)
                .ok_or_else(|| AssessmentError::UnknownQuestionId(question_id.clone()))?;
            if !question.accepts(value) {
                return Err(AssessmentError::OutOfRangeValue {
                    question_id: question_id.clone(),
                    value,
                });
            }
        }

        let missing: Vec<QuestionId> = questions
            .iter()
            .filter(|question| !answers.contains(&question.id))
            .map(|question| question.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(AssessmentError::IncompleteAnswers { missing });
        }

        Ok(())
    }

    pub fn score(
        &self,
        questions: &[Question],
        answers: &AnswerSet,
    ) -> Result<ScoreResult, AssessmentError> {
        self.validate(questions, answers)?;
        let max_total =
            questionnaire::checked_max_total(questions).ok_or(AssessmentError::TotalOverflow)?;

        // Every value is a listed option, so the total never exceeds `max_total`.
        let total = questions
            .iter()
            .filter_map(|question| answers.get(&question.id))
            .fold(0u32, u32::saturating_add);
        let band = self.bands.band_for(total);

        Ok(ScoreResult {
            total,
            max_total,
            band,
            recommend_to_seek_help: band.recommends_help(),
        })
    }
}
