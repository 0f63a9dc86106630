use diesel::{ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::models::{LearningAssessment, NewLearningAssessment};
use crate::db::schema::learning_assessments::dsl::*;

impl LearningAssessment {
    pub fn create(
        conn: &mut PgConnection,
        new_assessment: NewLearningAssessment,
    ) -> Result<LearningAssessment, diesel::result::Error> {
        diesel::insert_into(learning_assessments)
            .values(&new_assessment)
            .get_result(conn)
    }

    /// Append-only table; the newest row is the current learning style.
    pub fn find_latest_for_user(
        conn: &mut PgConnection,
        owner: Uuid,
    ) -> Result<Option<LearningAssessment>, diesel::result::Error> {
        learning_assessments
            .filter(user_id.eq(owner))
            .order(completed_at.desc())
            .first::<LearningAssessment>(conn)
            .optional()
    }
}
