pub use crate::config::*;
use crate::context::QuizContext;

/// A builder for adding survey responses.
///
/// ```
/// pub use survey_match::builder::Builder;
/// pub use survey_match::NormalizeRules;
/// # use survey_match::SurveyErrors;
///
/// let mut builder = Builder::new(&NormalizeRules::default_rules());
///
/// builder.add_response("1", "10", "Anna", "Favourite colour?", "red")?;
/// builder.add_response("1", "11", "Bob", "Favourite colour?", "blue")?;
///
/// let ctx = builder.build();
/// assert_eq!(ctx.total_questions(), 1);
///
/// # Ok::<(), SurveyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: NormalizeRules,
    pub(crate) _responses: Vec<RawResponse>,
}

impl Builder {
    pub fn new(rules: &NormalizeRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _responses: Vec::new(),
        }
    }

    /// Adds a response to the survey of the rules.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_response(
        &mut self,
        poll_id: &str,
        user_id: &str,
        user_name: &str,
        question: &str,
        answer: &str,
    ) -> Result<(), SurveyErrors> {
        let message_text = self._rules.survey_tag.clone();
        self.add_raw(&RawResponse {
            poll_id: poll_id.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            message_text,
        })
    }

    /// Adds a row as it appears in an export. Rows of other surveys are
    /// accepted and filtered out later.
    pub fn add_raw(&mut self, response: &RawResponse) -> Result<(), SurveyErrors> {
        response.check()?;
        self._responses.push(response.clone());
        Ok(())
    }

    pub fn responses(&self) -> &[RawResponse] {
        &self._responses
    }

    pub fn build(&self) -> QuizContext {
        QuizContext::from_responses(&self._responses, &self._rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_ids() {
        let mut builder = Builder::new(&NormalizeRules::default_rules());
        assert_eq!(
            builder.add_response("", "1", "a", "q", "yes"),
            Err(SurveyErrors::EmptyPollId)
        );
        assert_eq!(
            builder.add_response("1", " ", "a", "q", "yes"),
            Err(SurveyErrors::EmptyUserId)
        );
        assert!(builder.responses().is_empty());
    }

    #[test]
    fn builds_context() {
        let rules = NormalizeRules::new("weekly", "dunno");
        let mut builder = Builder::new(&rules);
        builder.add_response("1", "1", "a", "q", "yes").unwrap();
        builder.add_response("1", "2", "b", "q", "no").unwrap();
        builder.add_response("1", "3", "c", "q", "").unwrap();
        let ctx = builder.build();
        assert_eq!(ctx.total_questions(), 1);
        assert_eq!(
            ctx.options("1"),
            &["no".to_string(), "yes".to_string(), "dunno".to_string()]
        );
    }
}
