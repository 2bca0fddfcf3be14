use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ChapterId, Question, QuestionId, Quiz, PASS_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    ChapterPicking,
    QuizPicking,
    Answering,
    Reviewing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("`{operation}` is not allowed while {phase:?}")]
    WrongPhase {
        operation: &'static str,
        phase: Phase,
    },
    #[error("quiz {quiz_id} belongs to chapter {quiz_chapter}, not {selected}")]
    ChapterMismatch {
        quiz_id: u32,
        quiz_chapter: ChapterId,
        selected: ChapterId,
    },
    #[error("quiz {0} has no questions")]
    EmptyQuiz(u32),
    #[error("question {0} is not part of the selected quiz")]
    UnknownQuestion(QuestionId),
    #[error("option {index} is out of range for question {question_id} ({options} options)")]
    OptionOutOfRange {
        question_id: QuestionId,
        index: usize,
        options: usize,
    },
    #[error("only {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
}

/// Outcome of a submitted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub passed: bool,
}

impl QuizResult {
    pub fn new(score: usize, total: usize) -> Self {
        let percentage = rounded_percentage(score, total);
        Self {
            score,
            total,
            percentage,
            passed: percentage >= PASS_THRESHOLD,
        }
    }
}

/// `round(100 * score / total)` with halves rounded up.
fn rounded_percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * score + total) / (2 * total)) as u32
}

/// Progress of one user through the chapter → quiz → questions → results flow.
///
/// Operations that break a precondition return a [`SessionError`] and leave the
/// session exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    chapter_id: Option<ChapterId>,
    quiz: Option<Quiz>,
    position: usize,
    answers: HashMap<QuestionId, usize>,
    phase: Phase,
    score: Option<usize>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn chapter_id(&self) -> Option<ChapterId> {
        self.chapter_id
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn question_count(&self) -> usize {
        self.quiz.as_ref().map_or(0, |q| q.questions.len())
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Answering => self.quiz.as_ref()?.questions.get(self.position),
            _ => None,
        }
    }

    pub fn answer_for(&self, question_id: QuestionId) -> Option<usize> {
        self.answers.get(&question_id).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn is_complete(&self) -> bool {
        self.quiz.as_ref().is_some_and(|quiz| {
            quiz.questions
                .iter()
                .all(|q| self.answers.contains_key(&q.id))
        })
    }

    pub fn can_advance(&self) -> bool {
        self.phase == Phase::Answering && self.position + 1 < self.question_count()
    }

    pub fn can_go_back(&self) -> bool {
        self.phase == Phase::Answering && self.position > 0
    }

    /// Score of the submitted attempt; `None` outside `Reviewing`.
    pub fn score(&self) -> Option<usize> {
        match self.phase {
            Phase::Reviewing => self.score,
            _ => None,
        }
    }

    pub fn result(&self) -> Option<QuizResult> {
        let score = self.score()?;
        Some(QuizResult::new(score, self.question_count()))
    }

    pub fn select_chapter(&mut self, chapter_id: ChapterId) {
        self.clear_attempt();
        self.quiz = None;
        self.chapter_id = Some(chapter_id);
        self.phase = Phase::QuizPicking;
    }

    pub fn select_quiz(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        self.expect_phase("select_quiz", &[Phase::QuizPicking, Phase::Answering])?;
        if let Some(selected) = self.chapter_id {
            if quiz.chapter_id != selected {
                return Err(SessionError::ChapterMismatch {
                    quiz_id: quiz.id,
                    quiz_chapter: quiz.chapter_id,
                    selected,
                });
            }
        }
        if quiz.questions.is_empty() {
            return Err(SessionError::EmptyQuiz(quiz.id));
        }

        self.clear_attempt();
        self.quiz = Some(quiz);
        self.phase = Phase::Answering;
        Ok(())
    }

    /// Records (or overwrites) the chosen option. Does not move the position.
    pub fn answer_question(
        &mut self,
        question_id: QuestionId,
        option: usize,
    ) -> Result<(), SessionError> {
        self.expect_phase("answer_question", &[Phase::Answering])?;
        let question = self
            .quiz
            .as_ref()
            .and_then(|quiz| quiz.question(question_id))
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        if option >= question.option_count() {
            return Err(SessionError::OptionOutOfRange {
                question_id,
                index: option,
                options: question.option_count(),
            });
        }

        self.answers.insert(question_id, option);
        Ok(())
    }

    /// Moves to the next question; a no-op on the last one.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.expect_phase("next", &[Phase::Answering])?;
        if self.can_advance() {
            self.position += 1;
        }
        Ok(())
    }

    /// Moves to the previous question; a no-op on the first one.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.expect_phase("previous", &[Phase::Answering])?;
        if self.can_go_back() {
            self.position -= 1;
        }
        Ok(())
    }

    pub fn submit(&mut self) -> Result<QuizResult, SessionError> {
        self.expect_phase("submit", &[Phase::Answering])?;
        let Some(quiz) = self.quiz.as_ref() else {
            return Err(SessionError::WrongPhase {
                operation: "submit",
                phase: self.phase,
            });
        };
        if !self.is_complete() {
            return Err(SessionError::Incomplete {
                answered: self.answers.len(),
                total: quiz.questions.len(),
            });
        }

        let score = quiz
            .questions
            .iter()
            .filter(|q| self.answers.get(&q.id) == Some(&q.correct))
            .count();
        let result = QuizResult::new(score, quiz.questions.len());

        log::debug!(
            "Quiz {} submitted: {}/{} ({}%)",
            quiz.id,
            result.score,
            result.total,
            result.percentage
        );

        self.score = Some(score);
        self.phase = Phase::Reviewing;
        Ok(result)
    }

    /// Restarts the selected quiz from its first question.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.expect_phase("reset", &[Phase::Answering, Phase::Reviewing])?;
        self.clear_attempt();
        self.phase = Phase::Answering;
        Ok(())
    }

    pub fn back_to_chapters(&mut self) {
        *self = Self::default();
    }

    fn clear_attempt(&mut self) {
        self.position = 0;
        self.answers.clear();
        self.score = None;
    }

    fn expect_phase(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                operation,
                phase: self.phase,
            })
        }
    }
}
