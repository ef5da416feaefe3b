//! Turn-taking rules for the session transcript.
//!
//! INVARIANT: the transcript alternates strictly — question, answer,
//! question, ... An answer is only accepted while the latest message is an
//! unanswered question, and the next question is only generated once the
//! previous one has been answered. Both predicates take the type of the
//! latest message (`None` for an empty transcript).

use crate::models::session::{MESSAGE_ANSWER, MESSAGE_QUESTION};

/// True when the candidate may submit an answer: there must be a question
/// waiting at the end of the transcript.
pub fn may_submit_answer(last_message_type: Option<&str>) -> bool {
    last_message_type == Some(MESSAGE_QUESTION)
}

/// True when the next question may be generated: either nothing has been
/// asked yet, or the previous question has been answered.
pub fn may_ask_next_question(last_message_type: Option<&str>) -> bool {
    match last_message_type {
        None => true,
        Some(t) => t == MESSAGE_ANSWER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_requires_a_waiting_question() {
        assert!(may_submit_answer(Some(MESSAGE_QUESTION)));
    }

    #[test]
    fn test_answer_rejected_without_a_waiting_question() {
        // Empty transcript: nothing to answer yet.
        assert!(!may_submit_answer(None));
        // Last message already an answer: a second answer in a row breaks
        // the alternation.
        assert!(!may_submit_answer(Some(MESSAGE_ANSWER)));
    }

    #[test]
    fn test_first_question_allowed_on_empty_transcript() {
        assert!(may_ask_next_question(None));
    }

    #[test]
    fn test_next_question_requires_answered_previous() {
        assert!(may_ask_next_question(Some(MESSAGE_ANSWER)));
        assert!(!may_ask_next_question(Some(MESSAGE_QUESTION)));
    }

    #[test]
    fn test_predicates_are_mutually_exclusive() {
        // At any transcript tail exactly one side may act.
        for last in [None, Some(MESSAGE_QUESTION), Some(MESSAGE_ANSWER)] {
            assert_ne!(may_submit_answer(last), may_ask_next_question(last));
        }
    }
}
