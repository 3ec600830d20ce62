use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::NormalizedResponse;

/// Compares two identifiers.
///
/// Identifiers that look like integers are compared by value and come first,
/// everything else is compared as text.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// The dense user x poll grid of answers.
///
/// Rows are stored poll-major: all the users of the first poll, then all the
/// users of the second poll, and so on. Both polls and users are in the order
/// defined by `compare_ids`.
///
/// Invariant: `rows.len() == polls.len() * users.len()` and the row at
/// `poll_idx * users.len() + user_idx` holds the answer of that user to that poll.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReferenceTable {
    rows: Vec<NormalizedResponse>,
    polls: Vec<String>,
    users: Vec<String>,
    poll_index: HashMap<String, usize>,
    user_index: HashMap<String, usize>,
    sentinel: String,
}

impl ReferenceTable {
    /// Assembles a table from an already complete grid.
    ///
    /// `cells` is called for every (poll, user) pair in order and must return
    /// the corresponding row.
    pub(crate) fn from_grid<F>(
        polls: Vec<String>,
        users: Vec<String>,
        sentinel: &str,
        mut cells: F,
    ) -> ReferenceTable
    where
        F: FnMut(&str, &str) -> NormalizedResponse,
    {
        let mut rows: Vec<NormalizedResponse> = Vec::with_capacity(polls.len() * users.len());
        for poll_id in polls.iter() {
            for user_id in users.iter() {
                rows.push(cells(poll_id, user_id));
            }
        }
        let poll_index = polls
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.clone(), idx))
            .collect();
        let user_index = users
            .iter()
            .enumerate()
            .map(|(idx, u)| (u.clone(), idx))
            .collect();
        ReferenceTable {
            rows,
            polls,
            users,
            poll_index,
            user_index,
            sentinel: sentinel.to_string(),
        }
    }

    pub fn empty(sentinel: &str) -> ReferenceTable {
        ReferenceTable::from_grid(Vec::new(), Vec::new(), sentinel, |_, _| unreachable!())
    }

    pub fn rows(&self) -> &[NormalizedResponse] {
        &self.rows
    }

    /// The surviving polls, in canonical order.
    pub fn polls(&self) -> &[String] {
        &self.polls
    }

    /// The users of the grid, in canonical order.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    pub fn total_questions(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_poll(&self, poll_id: &str) -> bool {
        self.poll_index.contains_key(poll_id)
    }

    /// All the rows of one poll, one per user.
    pub fn rows_for_poll(&self, poll_id: &str) -> &[NormalizedResponse] {
        match self.poll_index.get(poll_id) {
            Some(p_idx) => {
                let width = self.users.len();
                &self.rows[p_idx * width..(p_idx + 1) * width]
            }
            None => &[],
        }
    }

    /// All the rows of one user, one per poll.
    pub fn rows_for_user(&self, user_id: &str) -> Vec<&NormalizedResponse> {
        match self.user_index.get(user_id) {
            Some(u_idx) => self
                .rows
                .iter()
                .skip(*u_idx)
                .step_by(self.users.len())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn get(&self, poll_id: &str, user_id: &str) -> Option<&NormalizedResponse> {
        let p_idx = self.poll_index.get(poll_id)?;
        let u_idx = self.user_index.get(user_id)?;
        self.rows.get(p_idx * self.users.len() + u_idx)
    }

    /// The answer of a user to a poll, if both are part of the table.
    pub fn answer(&self, poll_id: &str, user_id: &str) -> Option<&str> {
        self.get(poll_id, user_id).map(|r| r.answer.as_str())
    }

    pub fn user_name(&self, user_id: &str) -> Option<&str> {
        // Row `u_idx` is the cell of that user in the first poll.
        let u_idx = self.user_index.get(user_id)?;
        self.rows.get(*u_idx).map(|r| r.user_name.as_str())
    }

    pub fn question(&self, poll_id: &str) -> Option<&str> {
        self.rows_for_poll(poll_id)
            .first()
            .map(|r| r.question.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(poll_id: &str, user_id: &str) -> NormalizedResponse {
        NormalizedResponse {
            poll_id: poll_id.to_string(),
            user_id: user_id.to_string(),
            user_name: format!("name {}", user_id),
            question: format!("question {}", poll_id),
            answer: format!("{}/{}", poll_id, user_id),
        }
    }

    fn ids(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn numeric_ids_sort_by_value() {
        let mut xs = ids(&["10", "b", "9", "a", "100"]);
        xs.sort_by(|a, b| compare_ids(a, b));
        assert_eq!(xs, ids(&["9", "10", "100", "a", "b"]));
    }

    #[test]
    fn lookups_by_poll_and_user() {
        let table = ReferenceTable::from_grid(
            ids(&["p1", "p2", "p3"]),
            ids(&["u1", "u2"]),
            "not sure",
            cell,
        );
        assert_eq!(table.rows().len(), 6);
        assert_eq!(table.answer("p2", "u1"), Some("p2/u1"));
        assert_eq!(table.answer("p3", "u2"), Some("p3/u2"));
        assert_eq!(table.answer("p4", "u2"), None);

        let by_poll: Vec<&str> = table
            .rows_for_poll("p2")
            .iter()
            .map(|r| r.user_id.as_str())
            .collect();
        assert_eq!(by_poll, vec!["u1", "u2"]);

        let by_user: Vec<&str> = table
            .rows_for_user("u2")
            .iter()
            .map(|r| r.poll_id.as_str())
            .collect();
        assert_eq!(by_user, vec!["p1", "p2", "p3"]);

        assert_eq!(table.user_name("u1"), Some("name u1"));
        assert_eq!(table.user_name("u2"), Some("name u2"));
        assert_eq!(table.user_name("nobody"), None);
        assert_eq!(table.question("p1"), Some("question p1"));
        assert!(table.rows_for_user("nobody").is_empty());
    }

    #[test]
    fn empty_table() {
        let table = ReferenceTable::empty("not sure");
        assert!(table.is_empty());
        assert_eq!(table.total_questions(), 0);
        assert!(table.rows_for_poll("p1").is_empty());
        assert!(table.rows_for_user("u1").is_empty());
    }
}
