// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One row of the unprocessed survey export.
///
/// Rows are never mutated once read. An empty `answer` means that the
/// respondent saw the poll but did not pick anything.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RawResponse {
    pub poll_id: String,
    pub user_id: String,
    pub user_name: String,
    pub question: String,
    pub answer: String,
    /// Tag of the survey family this row belongs to.
    pub message_text: String,
}

impl RawResponse {
    /// A row is usable only if it names both a poll and a user.
    pub fn check(&self) -> Result<(), SurveyErrors> {
        if self.poll_id.trim().is_empty() {
            return Err(SurveyErrors::EmptyPollId);
        }
        if self.user_id.trim().is_empty() {
            return Err(SurveyErrors::EmptyUserId);
        }
        Ok(())
    }
}

/// A row of the normalized grid.
///
/// There is exactly one of these per (poll, user) pair of the reference table.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct NormalizedResponse {
    pub poll_id: String,
    pub user_id: String,
    pub user_name: String,
    pub question: String,
    pub answer: String,
}

/// The answers given by a visitor so far, keyed by poll id.
pub type VisitorAnswers = BTreeMap<String, String>;

// ********* Configuration **********

/// The rules that govern how a raw export is turned into a reference table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizeRules {
    /// Only the rows with this `message_text` are kept.
    pub survey_tag: String,
    /// Answer used to fill the cells of respondents who skipped a poll.
    pub sentinel: String,
}

impl NormalizeRules {
    pub const DEFAULT_SURVEY_TAG: &'static str = "sociological survey";
    pub const DEFAULT_SENTINEL: &'static str = "not sure";

    pub fn new(survey_tag: &str, sentinel: &str) -> NormalizeRules {
        NormalizeRules {
            survey_tag: survey_tag.to_string(),
            sentinel: sentinel.to_string(),
        }
    }

    pub fn default_rules() -> NormalizeRules {
        NormalizeRules::new(Self::DEFAULT_SURVEY_TAG, Self::DEFAULT_SENTINEL)
    }
}

impl Default for NormalizeRules {
    fn default() -> Self {
        NormalizeRules::default_rules()
    }
}

// ******** Output data structures *********

/// The closest historical respondent for a set of visitor answers.
///
/// `user_id` and `user_name` are empty when the reference table has no users.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    #[serde(rename = "matchCount")]
    pub match_count: u32,
    #[serde(rename = "totalQuestions")]
    pub total_questions: u32,
    pub percent: f64,
}

impl MatchResult {
    pub fn no_match(total_questions: u32) -> MatchResult {
        MatchResult {
            user_id: None,
            user_name: None,
            match_count: 0,
            total_questions,
            percent: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.user_id.is_some()
    }
}

/// What the visitor should see next.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum QuizStep {
    Question {
        poll_id: String,
        question_text: String,
        /// Regular answers sorted, the sentinel last if present.
        options: Vec<String>,
        /// 1-based position of this question.
        question_number: usize,
        total: usize,
        /// The state to send back with the visitor's answer.
        token: String,
    },
    /// All the questions have been answered.
    Complete,
}

/// Errors raised when assembling the raw input.
///
/// The quiz operations themselves never fail: bad input degrades to a
/// fallback value instead.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SurveyErrors {
    EmptyPollId,
    EmptyUserId,
}

impl Error for SurveyErrors {}

impl Display for SurveyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyErrors::EmptyPollId => write!(f, "SurveyError: response without a poll id"),
            SurveyErrors::EmptyUserId => write!(f, "SurveyError: response without a user id"),
        }
    }
}
