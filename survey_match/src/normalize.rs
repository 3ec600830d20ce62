use log::{debug, info};

use std::collections::{HashMap, HashSet};

use crate::config::{NormalizeRules, NormalizedResponse, RawResponse};
use crate::table::{compare_ids, ReferenceTable};

/// Builds the reference table out of a raw survey export.
///
/// The steps are:
/// * keep only the rows tagged with the survey of interest
/// * deduplicate on (poll, user), the last occurrence wins
/// * drop the polls that have fewer than two distinct real answers
/// * expand to the full poll x user grid, filling the gaps with the sentinel
///
/// An input without any relevant row produces an empty table.
pub fn normalize(raw: &[RawResponse], rules: &NormalizeRules) -> ReferenceTable {
    info!(
        "normalize: processing {:?} raw rows, rules: {:?}",
        raw.len(),
        rules
    );

    let tagged: Vec<&RawResponse> = raw
        .iter()
        .filter(|r| r.message_text == rules.survey_tag)
        .collect();
    debug!("normalize: {:?} rows with the survey tag", tagged.len());

    let deduped = deduplicate(&tagged);
    debug!("normalize: {:?} rows after deduplication", deduped.len());

    let discriminating = discriminating_polls(&deduped, &rules.sentinel);
    let kept: Vec<&RawResponse> = deduped
        .into_iter()
        .filter(|r| discriminating.contains(r.poll_id.as_str()))
        .collect();

    // First-seen wins for the names and question texts.
    let mut user_names: HashMap<&str, &str> = HashMap::new();
    let mut questions: HashMap<&str, &str> = HashMap::new();
    let mut answers: HashMap<(&str, &str), &str> = HashMap::new();
    for r in kept.iter() {
        user_names
            .entry(r.user_id.as_str())
            .or_insert(r.user_name.as_str());
        questions
            .entry(r.poll_id.as_str())
            .or_insert(r.question.as_str());
        if let Some(answer) = real_answer(&r.answer) {
            answers.insert((r.poll_id.as_str(), r.user_id.as_str()), answer);
        }
    }

    let mut polls: Vec<String> = questions.keys().map(|s| s.to_string()).collect();
    polls.sort_by(|a, b| compare_ids(a, b));
    let mut users: Vec<String> = user_names.keys().map(|s| s.to_string()).collect();
    users.sort_by(|a, b| compare_ids(a, b));

    info!(
        "normalize: {:?} polls and {:?} users in the reference table",
        polls.len(),
        users.len()
    );

    ReferenceTable::from_grid(polls, users, &rules.sentinel, |poll_id, user_id| {
        let answer = answers
            .get(&(poll_id, user_id))
            .map(|s| s.to_string())
            .unwrap_or_else(|| rules.sentinel.clone());
        NormalizedResponse {
            poll_id: poll_id.to_string(),
            user_id: user_id.to_string(),
            user_name: user_names.get(user_id).unwrap_or(&"").to_string(),
            question: questions.get(poll_id).unwrap_or(&"").to_string(),
            answer,
        }
    })
}

// Keeps the last occurrence of every (poll, user) pair, at the position of that occurrence.
fn deduplicate<'a>(rows: &[&'a RawResponse]) -> Vec<&'a RawResponse> {
    let mut last_seen: HashMap<(&str, &str), usize> = HashMap::new();
    for (idx, r) in rows.iter().enumerate() {
        last_seen.insert((r.poll_id.as_str(), r.user_id.as_str()), idx);
    }
    rows.iter()
        .enumerate()
        .filter(|(idx, r)| last_seen.get(&(r.poll_id.as_str(), r.user_id.as_str())) == Some(idx))
        .map(|(_, r)| *r)
        .collect()
}

/// The polls that have at least two distinct real answers.
fn discriminating_polls<'a>(rows: &[&'a RawResponse], sentinel: &str) -> HashSet<&'a str> {
    let mut distinct: HashMap<&str, HashSet<&str>> = HashMap::new();
    for r in rows.iter() {
        let e = distinct.entry(r.poll_id.as_str()).or_default();
        if let Some(answer) = real_answer(&r.answer) {
            if answer != sentinel {
                e.insert(answer);
            }
        }
    }
    for (poll_id, answers) in distinct.iter() {
        if answers.len() <= 1 {
            debug!(
                "discriminating_polls: dropping poll {:?} with answers {:?}",
                poll_id, answers
            );
        }
    }
    distinct
        .into_iter()
        .filter(|(_, answers)| answers.len() > 1)
        .map(|(poll_id, _)| poll_id)
        .collect()
}

// A blank answer is the same as no answer at all.
fn real_answer(answer: &str) -> Option<&str> {
    if answer.trim().is_empty() {
        None
    } else {
        Some(answer)
    }
}
