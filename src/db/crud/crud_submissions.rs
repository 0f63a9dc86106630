use diesel::{ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::models::{NewQuizSubmission, QuizSubmission};
use crate::db::schema::quiz_submissions::dsl::*;

impl QuizSubmission {
    pub fn create(
        conn: &mut PgConnection,
        new_submission: NewQuizSubmission,
    ) -> Result<QuizSubmission, diesel::result::Error> {
        diesel::insert_into(quiz_submissions)
            .values(&new_submission)
            .get_result(conn)
    }

    pub fn find_for_quiz_user(
        conn: &mut PgConnection,
        quiz: Uuid,
        submitter: Uuid,
    ) -> Result<Vec<QuizSubmission>, diesel::result::Error> {
        quiz_submissions
            .filter(quiz_id.eq(quiz))
            .filter(user_id.eq(submitter))
            .order(completed_at.desc())
            .load::<QuizSubmission>(conn)
    }

    pub fn delete_by_quiz(
        conn: &mut PgConnection,
        quiz: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(quiz_submissions.filter(quiz_id.eq(quiz))).execute(conn)
    }
}
