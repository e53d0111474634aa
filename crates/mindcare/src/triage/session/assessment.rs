use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::SessionId;
use crate::triage::assessment::{
    AnswerSet, AssessmentError, Question, QuestionId, Questionnaire, ScoreResult, ScoringEngine,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentFlowError {
    #[error(transparent)]
    Answers(#[from] AssessmentError),
    #[error("assessment already completed; restart to answer again")]
    AlreadyCompleted,
}

/// Result of pressing "next" on the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentStep {
    Next { index: usize },
    Completed(ScoreResult),
}

/// Progress through one questionnaire, one question at a time.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: SessionId,
    questionnaire: Arc<Questionnaire>,
    current: usize,
    answers: AnswerSet,
    outcome: Option<ScoreResult>,
    started_at: DateTime<Utc>,
}

impl AssessmentSession {
    pub fn new(id: SessionId, questionnaire: Arc<Questionnaire>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            questionnaire,
            current: 0,
            answers: AnswerSet::new(),
            outcome: None,
            started_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn outcome(&self) -> Option<&ScoreResult> {
        self.outcome.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    /// `None` once the assessment has been scored.
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.questionnaire.questions().get(self.current)
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questionnaire.len()
    }

    /// Percentage shown by the progress bar, counting the current question as reached.
    pub fn progress_percent(&self) -> u8 {
        let total = self.questionnaire.len().max(1) as f64;
        let reached = (self.current + 1).min(self.questionnaire.len()) as f64;
        (reached / total * 100.0).round() as u8
    }

    /// Records or revises an answer to any question of the questionnaire.
    pub fn answer(
        &mut self,
        question_id: &QuestionId,
        value: u32,
    ) -> Result<(), AssessmentFlowError> {
        if self.is_complete() {
            return Err(AssessmentFlowError::AlreadyCompleted);
        }

        let question = self
            .questionnaire
            .question(question_id)
            .ok_or_else(|| AssessmentError::UnknownQuestionId(question_id.clone()))?;
        if !question.accepts(value) {
            return Err(AssessmentError::OutOfRangeValue {
                question_id: question_id.clone(),
                value,
            }
            .into());
        }

        self.answers.insert(question_id.clone(), value);
        Ok(())
    }

    /// Gate for the "next"/"submit" action.
    pub fn can_advance(&self) -> bool {
        self.current_question()
            .map(|question| self.answers.contains(&question.id))
            .unwrap_or(false)
    }

    /// Moves to the next question, or scores the answers on the last one.
    pub fn advance(
        &mut self,
        engine: &ScoringEngine,
    ) -> Result<AssessmentStep, AssessmentFlowError> {
        let question = self
            .current_question()
            .ok_or(AssessmentFlowError::AlreadyCompleted)?;
        if !self.answers.contains(&question.id) {
            return Err(AssessmentError::IncompleteAnswers {
                missing: vec![question.id.clone()],
            }
            .into());
        }

        if !self.is_last_question() {
            self.current += 1;
            return Ok(AssessmentStep::Next {
                index: self.current,
            });
        }

        let result = engine.score(self.questionnaire.questions(), &self.answers)?;
        self.outcome = Some(result);
        Ok(AssessmentStep::Completed(result))
    }

    /// Clears answers and outcome so the questionnaire can be retaken.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.current = 0;
        self.answers.clear();
        self.outcome = None;
        self.started_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AssessmentSession {
        AssessmentSession::new(
            SessionId::from("assessment-test"),
            Arc::new(Questionnaire::phq9_screener()),
            Utc::now(),
        )
    }

    #[test]
    fn progress_counts_the_current_question() {
        let mut session = session();
        let engine = ScoringEngine::default();
        assert_eq!(session.progress_percent(), 33);

        session.answer(&QuestionId::from("q1"), 0).expect("answer");
        session.advance(&engine).expect("advance");
        assert_eq!(session.progress_percent(), 67);

        session.answer(&QuestionId::from("q2"), 0).expect("answer");
        session.advance(&engine).expect("advance");
        assert_eq!(session.progress_percent(), 100);
    }

    #[test]
    fn cannot_advance_past_an_unanswered_question() {
        let mut session = session();
        assert!(!session.can_advance());

        match session.advance(&ScoringEngine::default()) {
            Err(AssessmentFlowError::Answers(AssessmentError::IncompleteAnswers { missing })) => {
                assert_eq!(missing, vec![QuestionId::from("q1")]);
            }
            other => panic!("expected incomplete answers, got {other:?}"),
        }
        assert_eq!(session.current_index(), 0);
    }
}
