use log::debug;

use crate::table::ReferenceTable;

/// The order in which the polls are presented during one quiz session.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionOrder {
    polls: Vec<String>,
}

impl QuestionOrder {
    /// The polls in the order of the reference table.
    pub fn canonical(table: &ReferenceTable) -> QuestionOrder {
        QuestionOrder {
            polls: table.polls().to_vec(),
        }
    }

    /// A permutation of the polls that only depends on the seed.
    ///
    /// Random in this context means hard to guess in advance: the polls are
    /// sorted by a cryptographic hash of the seed and the poll id, so the same
    /// seed always gives back the same order.
    pub fn seeded(table: &ReferenceTable, seed: u32) -> QuestionOrder {
        let mut data: Vec<(String, String)> = table
            .polls()
            .iter()
            .map(|p| (sha256::digest(format!("{:08}{}", seed, p)), p.clone()))
            .collect();
        data.sort();
        let polls: Vec<String> = data.into_iter().map(|p| p.1).collect();
        debug!("QuestionOrder::seeded: seed {:?} order {:?}", seed, polls);
        QuestionOrder { polls }
    }

    pub fn get(&self, q_idx: usize) -> Option<&str> {
        self.polls.get(q_idx).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }

    pub fn polls(&self) -> &[String] {
        &self.polls
    }
}

/// The answers offered for a poll.
///
/// All the distinct answers of the table for this poll, sorted, with the
/// sentinel moved to the end when some respondent has it.
pub fn answer_options(table: &ReferenceTable, poll_id: &str) -> Vec<String> {
    let mut regular: Vec<String> = Vec::new();
    let mut has_sentinel = false;
    for r in table.rows_for_poll(poll_id) {
        if r.answer == table.sentinel() {
            has_sentinel = true;
        } else if !regular.contains(&r.answer) {
            regular.push(r.answer.clone());
        }
    }
    regular.sort();
    if has_sentinel {
        regular.push(table.sentinel().to_string());
    }
    regular
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NormalizeRules, RawResponse};
    use crate::normalize::normalize;

    fn row(poll_id: &str, user_id: &str, answer: &str) -> RawResponse {
        RawResponse {
            poll_id: poll_id.to_string(),
            user_id: user_id.to_string(),
            user_name: format!("user {}", user_id),
            question: format!("question {}", poll_id),
            answer: answer.to_string(),
            message_text: NormalizeRules::DEFAULT_SURVEY_TAG.to_string(),
        }
    }

    fn table() -> ReferenceTable {
        let mut raw = Vec::new();
        for p in 1..=8 {
            let poll_id = p.to_string();
            raw.push(row(&poll_id, "1", "yes"));
            raw.push(row(&poll_id, "2", "no"));
        }
        raw.push(row("1", "3", "maybe"));
        raw.push(row("2", "3", "not sure"));
        normalize(&raw, &NormalizeRules::default_rules())
    }

    #[test]
    fn seeded_order_is_stable() {
        let t = table();
        let o1 = QuestionOrder::seeded(&t, 42);
        let o2 = QuestionOrder::seeded(&t, 42);
        assert_eq!(o1, o2);
        assert_eq!(o1.len(), t.total_questions());

        let mut sorted = o1.polls().to_vec();
        sorted.sort();
        let mut expected = t.polls().to_vec();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn different_seeds_shuffle() {
        let t = table();
        let orders: Vec<QuestionOrder> = (0..10).map(|s| QuestionOrder::seeded(&t, s)).collect();
        assert!(orders.iter().any(|o| o != &orders[0]));
    }

    #[test]
    fn options_put_sentinel_last() {
        let t = table();
        assert_eq!(
            answer_options(&t, "1"),
            vec!["maybe".to_string(), "no".to_string(), "yes".to_string()]
        );
        assert_eq!(
            answer_options(&t, "2"),
            vec!["no".to_string(), "yes".to_string(), "not sure".to_string()]
        );
        // User 3 never answered poll 3.
        assert_eq!(answer_options(&t, "3").last().unwrap(), "not sure");
    }

    #[test]
    fn options_for_unknown_poll() {
        assert!(answer_options(&table(), "99").is_empty());
    }

    #[test]
    fn options_never_empty() {
        let t = table();
        for p in QuestionOrder::canonical(&t).polls() {
            assert!(answer_options(&t, p).len() >= 2);
        }
    }
}
