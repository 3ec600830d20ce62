/*!
Survey compatibility matching.

A visitor answers the polls of a past survey, one at a time, and is told
which of the historical respondents answered most like them.

The pipeline is:
* [`normalize()`] turns the raw export into a dense [`ReferenceTable`]
* [`QuestionOrder`] and [`answer_options`] decide what to show and in which order
* [`codec`] carries the progress of a visitor in an opaque token
* [`find_best_match`] scores the visitor against every respondent

[`QuizContext`] bundles all of this behind the two calls a web layer needs:
[`QuizContext::next_step`] and [`QuizContext::compute_result`].
*/

pub mod builder;
pub mod codec;
mod config;
mod context;
pub mod manual;
mod matching;
mod normalize;
mod sequence;
mod table;

pub use crate::codec::{QuizState, TokenError};
pub use crate::config::*;
pub use crate::context::QuizContext;
pub use crate::matching::{answers_match, count_matches, find_best_match};
pub use crate::normalize::normalize;
pub use crate::sequence::{answer_options, QuestionOrder};
pub use crate::table::{compare_ids, ReferenceTable};
