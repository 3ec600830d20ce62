use log::{debug, info, warn};

use std::collections::HashMap;

use crate::codec::{self, QuizState};
use crate::config::{MatchResult, NormalizeRules, QuizStep, RawResponse, VisitorAnswers};
use crate::matching::find_best_match;
use crate::normalize::normalize;
use crate::sequence::{answer_options, QuestionOrder};
use crate::table::ReferenceTable;

/// All the read-only data a quiz needs.
///
/// It is built once at startup and then shared by every request: nothing in
/// it changes afterwards, so it can be read concurrently without locking.
#[derive(Debug, Clone)]
pub struct QuizContext {
    table: ReferenceTable,
    options: HashMap<String, Vec<String>>,
    shuffle: bool,
}

impl QuizContext {
    pub fn new(table: ReferenceTable) -> QuizContext {
        let options = table
            .polls()
            .iter()
            .map(|p| (p.clone(), answer_options(&table, p)))
            .collect();
        QuizContext {
            table,
            options,
            shuffle: true,
        }
    }

    pub fn from_responses(raw: &[RawResponse], rules: &NormalizeRules) -> QuizContext {
        QuizContext::new(normalize(raw, rules))
    }

    /// Present the questions in the order of the table instead of a per-session order.
    pub fn without_shuffle(self) -> QuizContext {
        QuizContext {
            shuffle: false,
            ..self
        }
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    pub fn total_questions(&self) -> usize {
        self.table.total_questions()
    }

    /// The answers offered for a poll. Empty for an unknown poll.
    pub fn options(&self, poll_id: &str) -> &[String] {
        self.options.get(poll_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The question order of the session started with this seed.
    pub fn question_order(&self, seed: u32) -> QuestionOrder {
        if self.shuffle {
            QuestionOrder::seeded(&self.table, seed)
        } else {
            QuestionOrder::canonical(&self.table)
        }
    }

    /// Starts a new session.
    pub fn reset(&self, seed: u32) -> QuizState {
        info!("reset: new session with seed {:?}", seed);
        QuizState::new(seed)
    }

    /// The question to ask for this state, or the completion signal once the
    /// index is past the last question.
    pub fn next_step(&self, state: &QuizState) -> QuizStep {
        self.next_step_in(&self.question_order(state.seed), state)
    }

    /// Same as `next_step`, with the order of the session already computed.
    pub fn next_step_in(&self, order: &QuestionOrder, state: &QuizState) -> QuizStep {
        let poll_id = match order.get(state.q_idx) {
            Some(p) => p,
            None => {
                debug!(
                    "next_step: index {:?} out of {:?} questions, quiz complete",
                    state.q_idx,
                    order.len()
                );
                return QuizStep::Complete;
            }
        };
        QuizStep::Question {
            poll_id: poll_id.to_string(),
            question_text: self.table.question(poll_id).unwrap_or_default().to_string(),
            options: self.options(poll_id).to_vec(),
            question_number: state.q_idx + 1,
            total: order.len(),
            token: codec::encode(state),
        }
    }

    /// Same as `next_step`, reading the state from a token.
    pub fn next_step_from_token(&self, token: &str) -> QuizStep {
        self.next_step(&codec::decode(token))
    }

    /// Records the answer to the current question and moves to the next one.
    ///
    /// Nothing happens once the quiz is complete.
    pub fn record_answer(&self, state: &QuizState, answer: &str) -> QuizState {
        self.record_answer_in(&self.question_order(state.seed), state, answer)
    }

    /// Same as `record_answer`, with the order of the session already computed.
    pub fn record_answer_in(
        &self,
        order: &QuestionOrder,
        state: &QuizState,
        answer: &str,
    ) -> QuizState {
        match order.get(state.q_idx) {
            Some(poll_id) => {
                if !self.options(poll_id).iter().any(|o| o == answer) {
                    warn!(
                        "record_answer: {:?} is not one of the options of poll {:?}",
                        answer, poll_id
                    );
                }
                let mut next = state.clone();
                next.answers.insert(poll_id.to_string(), answer.to_string());
                next.q_idx += 1;
                next
            }
            None => state.clone(),
        }
    }

    pub fn compute_result(&self, answers: &VisitorAnswers) -> MatchResult {
        find_best_match(&self.table, answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(poll_id: &str, user_id: &str, answer: &str) -> RawResponse {
        RawResponse {
            poll_id: poll_id.to_string(),
            user_id: user_id.to_string(),
            user_name: format!("user {}", user_id),
            question: format!("question {}?", poll_id),
            answer: answer.to_string(),
            message_text: NormalizeRules::DEFAULT_SURVEY_TAG.to_string(),
        }
    }

    fn context() -> QuizContext {
        let raw = vec![
            row("1", "1", "red"),
            row("1", "2", "blue"),
            row("2", "1", "yes"),
            row("2", "2", "no"),
            row("3", "1", "cats"),
            row("3", "2", "dogs"),
            row("3", "3", "fish"),
        ];
        QuizContext::from_responses(&raw, &NormalizeRules::default_rules())
    }

    #[test]
    fn full_session() {
        let _ = env_logger::try_init();
        let ctx = context();
        let mut state = ctx.reset(7);
        let mut seen: Vec<String> = Vec::new();
        loop {
            match ctx.next_step(&state) {
                QuizStep::Question {
                    poll_id,
                    question_text,
                    options,
                    question_number,
                    total,
                    token,
                } => {
                    assert_eq!(question_number, seen.len() + 1);
                    assert_eq!(total, 3);
                    assert_eq!(question_text, format!("question {}?", poll_id));
                    assert!(!options.is_empty());
                    // The token carries the whole state.
                    assert_eq!(codec::decode(&token), state);
                    // Answer like user 2 would.
                    let answer = ctx.table().answer(&poll_id, "2").unwrap().to_string();
                    state = ctx.record_answer(&codec::decode(&token), &answer);
                    seen.push(poll_id);
                }
                QuizStep::Complete => break,
            }
        }
        seen.sort();
        assert_eq!(seen, ctx.table().polls().to_vec());

        let res = ctx.compute_result(&state.answers);
        assert_eq!(res.user_id, Some("2".to_string()));
        assert_eq!(res.user_name, Some("user 2".to_string()));
        assert_eq!(res.match_count, 3);
        assert_eq!(res.percent, 100.0);
    }

    #[test]
    fn same_seed_same_questions() {
        let ctx = context();
        let s1 = QuizState::new(99);
        let s2 = codec::decode(&codec::encode(&s1));
        assert_eq!(ctx.next_step(&s1), ctx.next_step(&s2));
    }

    #[test]
    fn out_of_range_index_completes() {
        let ctx = context();
        let mut state = ctx.reset(1);
        state.q_idx = 3;
        assert_eq!(ctx.next_step(&state), QuizStep::Complete);
        state.q_idx = usize::MAX;
        assert_eq!(ctx.next_step(&state), QuizStep::Complete);
        assert_eq!(ctx.record_answer(&state, "red"), state);
    }

    #[test]
    fn broken_token_starts_over() {
        let ctx = context().without_shuffle();
        match ctx.next_step_from_token("not-valid-base64!!") {
            QuizStep::Question {
                poll_id,
                question_number,
                options,
                ..
            } => {
                assert_eq!(poll_id, "1");
                assert_eq!(question_number, 1);
                assert_eq!(options, vec!["blue".to_string(), "red".to_string(), "not sure".to_string()]);
            }
            QuizStep::Complete => panic!("expected a question"),
        }
    }

    #[test]
    fn shared_order_gives_same_steps() {
        let ctx = context();
        let state = ctx.reset(42);
        let order = ctx.question_order(state.seed);
        assert_eq!(ctx.next_step_in(&order, &state), ctx.next_step(&state));

        let next = ctx.record_answer_in(&order, &state, "red");
        assert_eq!(next, ctx.record_answer(&state, "red"));
        assert_eq!(ctx.next_step_in(&order, &next), ctx.next_step(&next));
        assert_eq!(next.answers.get(order.get(0).unwrap()), Some(&"red".to_string()));
    }

    #[test]
    fn empty_dataset() {
        let ctx = QuizContext::from_responses(&[], &NormalizeRules::default_rules());
        assert_eq!(ctx.total_questions(), 0);
        assert_eq!(ctx.next_step(&ctx.reset(3)), QuizStep::Complete);
        let res = ctx.compute_result(&VisitorAnswers::new());
        assert!(!res.is_match());
        assert_eq!(res.match_count, 0);
        assert_eq!(res.percent, 0.0);
    }
}
