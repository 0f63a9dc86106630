use diesel::{ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::models::{NewQuestion, Question};
use crate::db::schema::questions::dsl::*;

impl Question {
    pub fn create_batch(
        conn: &mut PgConnection,
        new_questions: &[NewQuestion],
    ) -> Result<Vec<Question>, diesel::result::Error> {
        diesel::insert_into(questions)
            .values(new_questions)
            .get_results(conn)
    }

    /// Display order. order_index is assigned densely at creation, so it is
    /// unique within a quiz.
    pub fn find_by_quiz(
        conn: &mut PgConnection,
        quiz: Uuid,
    ) -> Result<Vec<Question>, diesel::result::Error> {
        questions
            .filter(quiz_id.eq(quiz))
            .order(order_index.asc())
            .load::<Question>(conn)
    }

    pub fn delete_by_quiz(
        conn: &mut PgConnection,
        quiz: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(questions.filter(quiz_id.eq(quiz))).execute(conn)
    }
}
