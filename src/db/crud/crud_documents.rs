use chrono::{DateTime, Utc};
use diesel::{ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::models::{Document, NewDocument, ProcessingStatus};
use crate::db::schema::documents::dsl::*;

impl Document {
    pub fn create(
        conn: &mut PgConnection,
        new_document: NewDocument,
    ) -> Result<Document, diesel::result::Error> {
        diesel::insert_into(documents)
            .values(&new_document)
            .get_result(conn)
    }

    pub fn find(
        conn: &mut PgConnection,
        document_id: Uuid,
    ) -> Result<Document, diesel::result::Error> {
        documents.find(document_id).first(conn)
    }

    /// Scoped lookup: only returns the document if `owner` uploaded it.
    pub fn find_for_user(
        conn: &mut PgConnection,
        document_id: Uuid,
        owner: Uuid,
    ) -> Result<Document, diesel::result::Error> {
        documents
            .find(document_id)
            .filter(user_id.eq(owner))
            .first(conn)
    }

    pub fn find_for_user_all(
        conn: &mut PgConnection,
        owner: Uuid,
    ) -> Result<Vec<Document>, diesel::result::Error> {
        documents
            .filter(user_id.eq(owner))
            .order(uploaded_at.desc())
            .load::<Document>(conn)
    }

    pub fn set_status(
        conn: &mut PgConnection,
        document_id: Uuid,
        status: ProcessingStatus,
    ) -> Result<Document, diesel::result::Error> {
        diesel::update(documents.find(document_id))
            .set(processing_status.eq(status.as_str()))
            .get_result(conn)
    }

    /// Writes the pipeline output in one shot; caller wraps this in the
    /// processing transaction together with quiz creation.
    pub fn store_processing_results(
        conn: &mut PgConnection,
        document_id: Uuid,
        extracted_text: &str,
        pages: i32,
        document_summary: &str,
        topics: &[String],
        finished_at: DateTime<Utc>,
    ) -> Result<Document, diesel::result::Error> {
        diesel::update(documents.find(document_id))
            .set((
                content.eq(extracted_text),
                page_count.eq(pages),
                summary.eq(document_summary),
                key_topics.eq(serde_json::json!(topics)),
                processing_status.eq(ProcessingStatus::Processed.as_str()),
                processed_at.eq(finished_at),
            ))
            .get_result(conn)
    }

    pub fn delete(
        conn: &mut PgConnection,
        document_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        diesel::delete(documents.find(document_id)).execute(conn)
    }
}
