//! Retake lineage and question-type rotation.
//!
//! Retakes form a linear chain. INVARIANT: every session in a chain stores
//! the id of the chain's first session in `original_session_id`, so fetching
//! a whole chain is one query (`WHERE id = root OR original_session_id = root`).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::session::InterviewSessionRow;

/// The three interview question categories, asked in fixed rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Technical,
    Behavioral,
    Situational,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Technical => "technical",
            QuestionType::Behavioral => "behavioral",
            QuestionType::Situational => "situational",
        }
    }
}

const ROTATION: [QuestionType; 3] = [
    QuestionType::Technical,
    QuestionType::Behavioral,
    QuestionType::Situational,
];

/// Returns the question type for a 1-based question number:
/// technical, behavioral, situational, technical, ...
pub fn question_type_for(question_number: i32) -> Option<QuestionType> {
    if question_number < 1 {
        return None;
    }
    Some(ROTATION[((question_number - 1) % 3) as usize])
}

/// Lineage fields for a retake of `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetakeFields {
    /// Id of the first session in the chain. Equals `parent.id` when the
    /// parent is itself the original.
    pub original_session_id: Uuid,
    pub retake_number: i32,
}

pub fn retake_fields(parent: &InterviewSessionRow) -> RetakeFields {
    RetakeFields {
        original_session_id: parent.original_session_id.unwrap_or(parent.id),
        retake_number: parent.retake_number + 1,
    }
}

/// Resolves the chain root for any session in a chain.
pub fn chain_root(session: &InterviewSessionRow) -> Uuid {
    session.original_session_id.unwrap_or(session.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::STATUS_COMPLETED;
    use chrono::Utc;

    fn session(
        id: Uuid,
        retake_number: i32,
        original_session_id: Option<Uuid>,
    ) -> InterviewSessionRow {
        InterviewSessionRow {
            id,
            user_id: Uuid::new_v4(),
            job_posting_id: Uuid::new_v4(),
            status: STATUS_COMPLETED.to_string(),
            current_question_number: 5,
            retake_number,
            original_session_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rotation_cycles_through_all_three_types() {
        assert_eq!(question_type_for(1), Some(QuestionType::Technical));
        assert_eq!(question_type_for(2), Some(QuestionType::Behavioral));
        assert_eq!(question_type_for(3), Some(QuestionType::Situational));
        assert_eq!(question_type_for(4), Some(QuestionType::Technical));
        assert_eq!(question_type_for(7), Some(QuestionType::Technical));
        assert_eq!(question_type_for(8), Some(QuestionType::Behavioral));
    }

    #[test]
    fn test_rotation_rejects_non_positive_numbers() {
        assert_eq!(question_type_for(0), None);
        assert_eq!(question_type_for(-3), None);
    }

    #[test]
    fn test_first_retake_points_at_parent() {
        let root_id = Uuid::new_v4();
        let root = session(root_id, 0, None);
        let fields = retake_fields(&root);
        assert_eq!(fields.original_session_id, root_id);
        assert_eq!(fields.retake_number, 1);
    }

    #[test]
    fn test_chain_preserves_root_across_three_generations() {
        let root_id = Uuid::new_v4();
        let root = session(root_id, 0, None);

        let gen1 = retake_fields(&root);
        let s1 = session(Uuid::new_v4(), gen1.retake_number, Some(gen1.original_session_id));

        let gen2 = retake_fields(&s1);
        let s2 = session(Uuid::new_v4(), gen2.retake_number, Some(gen2.original_session_id));

        let gen3 = retake_fields(&s2);

        assert_eq!(gen1.original_session_id, root_id);
        assert_eq!(gen2.original_session_id, root_id);
        assert_eq!(gen3.original_session_id, root_id);
        assert_eq!(gen3.retake_number, 3);
    }

    #[test]
    fn test_chain_root_resolution() {
        let root_id = Uuid::new_v4();
        let root = session(root_id, 0, None);
        let retake = session(Uuid::new_v4(), 2, Some(root_id));
        assert_eq!(chain_root(&root), root_id);
        assert_eq!(chain_root(&retake), root_id);
    }
}
