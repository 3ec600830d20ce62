use log::{debug, info};

use crate::config::{MatchResult, VisitorAnswers};
use crate::table::ReferenceTable;

/// Answers are compared without regard to case or surrounding whitespace.
pub fn answers_match(stored: &str, given: &str) -> bool {
    stored.trim().to_lowercase() == given.trim().to_lowercase()
}

/// The number of polls on which a user agrees with the visitor.
///
/// Polls that are not part of the table are ignored. Poll ids are matched
/// exactly: only the answers themselves are normalized.
pub fn count_matches(table: &ReferenceTable, user_id: &str, answers: &VisitorAnswers) -> u32 {
    answers
        .iter()
        .filter(|(poll_id, given)| {
            table
                .answer(poll_id, user_id)
                .map(|stored| answers_match(stored, given))
                .unwrap_or(false)
        })
        .count() as u32
}

/// Finds the user of the table whose answers agree with the visitor's on the
/// most polls.
///
/// Ties are won by the user that comes first in the table. An empty table
/// gives the no-match result.
pub fn find_best_match(table: &ReferenceTable, answers: &VisitorAnswers) -> MatchResult {
    let total_questions = table.total_questions() as u32;

    let unknown: Vec<&String> = answers
        .keys()
        .filter(|p| !table.contains_poll(p))
        .collect();
    if !unknown.is_empty() {
        debug!("find_best_match: ignoring unknown polls {:?}", unknown);
    }

    let mut best: Option<(&str, u32)> = None;
    for user_id in table.users() {
        let matches = count_matches(table, user_id, answers);
        match best {
            Some((_, best_count)) if matches <= best_count => {}
            _ => {
                best = Some((user_id.as_str(), matches));
            }
        }
    }

    let (user_id, match_count) = match best {
        Some(x) => x,
        None => {
            info!("find_best_match: no user to match against");
            return MatchResult::no_match(total_questions);
        }
    };

    let percent = if total_questions > 0 {
        (match_count as f64) / (total_questions as f64) * 100.0
    } else {
        0.0
    };

    info!(
        "find_best_match: best user {:?} with {:?}/{:?} matches",
        user_id, match_count, total_questions
    );

    MatchResult {
        user_id: Some(user_id.to_string()),
        user_name: table.user_name(user_id).map(|s| s.to_string()),
        match_count,
        total_questions,
        percent,
    }
}
