use std::collections::HashMap;

use crate::quiz::*;

pub const COL_POLL_ID: &str = "poll_id";
pub const COL_USER_ID: &str = "user_id";
pub const COL_USER_NAME: &str = "user_name";
pub const COL_QUESTION: &str = "question";
pub const COL_ANSWER: &str = "answer";
pub const COL_MESSAGE_TEXT: &str = "message_text";

/// Positions of the required columns in a row.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ColumnIndexes {
    pub poll_id: usize,
    pub user_id: usize,
    pub user_name: usize,
    pub question: usize,
    pub answer: usize,
    pub message_text: usize,
}

impl ColumnIndexes {
    pub fn max(&self) -> usize {
        [
            self.poll_id,
            self.user_id,
            self.user_name,
            self.question,
            self.answer,
            self.message_text,
        ]
        .iter()
        .cloned()
        .max()
        .unwrap_or(0)
    }
}

/// Given the header of a file (names of each of the columns), finds where the
/// required columns are. Other columns are ignored.
pub fn get_col_indexes(header: &[Option<String>], path: &str) -> BQResult<ColumnIndexes> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, x)| {
            x.as_ref()
                .map(|s| (s.trim_start_matches('\u{feff}').trim().to_string(), idx))
        })
        .collect();

    debug!("get_col_indexes: col_names: {:?}", col_names);

    let find = |cname: &str| -> BQResult<usize> {
        let idx = col_names
            .get(cname)
            .context(MissingColumnSnafu { column: cname, path })?;
        Ok(*idx)
    };

    Ok(ColumnIndexes {
        poll_id: find(COL_POLL_ID)?,
        user_id: find(COL_USER_ID)?,
        user_name: find(COL_USER_NAME)?,
        question: find(COL_QUESTION)?,
        answer: find(COL_ANSWER)?,
        message_text: find(COL_MESSAGE_TEXT)?,
    })
}

/// Identifiers written as floats by spreadsheet tools (`12.0`) are brought back to `12`.
pub fn normalize_id(id: &str) -> String {
    let id = id.trim();
    match id.strip_suffix(".0") {
        Some(int_part) if !int_part.is_empty() && int_part.parse::<i64>().is_ok() => {
            int_part.to_string()
        }
        _ => id.to_string(),
    }
}

/// Builds a response out of the cells of one row.
pub fn make_response(cells: &[String], cols: &ColumnIndexes) -> RawResponse {
    let cell = |idx: usize| cells.get(idx).cloned().unwrap_or_default();
    RawResponse {
        poll_id: normalize_id(&cell(cols.poll_id)),
        user_id: normalize_id(&cell(cols.user_id)),
        user_name: cell(cols.user_name),
        question: cell(cols.question),
        answer: cell(cols.answer),
        message_text: cell(cols.message_text).trim().to_string(),
    }
}

/// Keeps the rows that name both a poll and a user. Other rows are skipped
/// with a warning.
pub fn accept_response(response: &RawResponse, lineno: usize, path: &str) -> bool {
    match response.check() {
        Ok(()) => true,
        Err(e) => {
            warn!("{}: skipping line {}: {}", path, lineno, e);
            false
        }
    }
}
