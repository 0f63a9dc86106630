use diesel::{ExpressionMethods, JoinOnDsl, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper};
use uuid::Uuid;

use crate::db::models::{NewQuiz, Quiz};
use crate::db::schema::{documents, quizzes};

impl Quiz {
    pub fn create(
        conn: &mut PgConnection,
        new_quiz: NewQuiz,
    ) -> Result<Quiz, diesel::result::Error> {
        diesel::insert_into(quizzes::table)
            .values(&new_quiz)
            .get_result(conn)
    }

    /// Ownership goes through the parent document; a quiz has no user column.
    pub fn find_for_user(
        conn: &mut PgConnection,
        quiz_id: Uuid,
        owner: Uuid,
    ) -> Result<Quiz, diesel::result::Error> {
        quizzes::table
            .inner_join(documents::table.on(documents::id.eq(quizzes::document_id)))
            .filter(quizzes::id.eq(quiz_id))
            .filter(documents::user_id.eq(owner))
            .select(Quiz::as_select())
            .first(conn)
    }

    pub fn find_for_user_all(
        conn: &mut PgConnection,
        owner: Uuid,
    ) -> Result<Vec<Quiz>, diesel::result::Error> {
        quizzes::table
            .inner_join(documents::table.on(documents::id.eq(quizzes::document_id)))
            .filter(documents::user_id.eq(owner))
            .order(quizzes::created_at.desc())
            .select(Quiz::as_select())
            .load(conn)
    }

    pub fn find_by_document(
        conn: &mut PgConnection,
        document: Uuid,
    ) -> Result<Vec<Quiz>, diesel::result::Error> {
        quizzes::table
            .filter(quizzes::document_id.eq(document))
            .load(conn)
    }

    pub fn delete(
        conn: &mut PgConnection,
        quiz_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(quizzes::table.find(quiz_id)).execute(conn)
    }
}
