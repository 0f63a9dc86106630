diesel::table! {
    documents (id) {
        id -> Uuid,
        user_id -> Uuid,
        filename -> Text,
        original_name -> Text,
        file_path -> Text,
        file_size -> Int8,
        mime_type -> Text,
        file_hash -> Nullable<Text>,
        page_count -> Nullable<Int4>,
        content -> Nullable<Text>,
        summary -> Nullable<Text>,
        key_topics -> Nullable<Jsonb>,
        tags -> Nullable<Jsonb>,
        processing_status -> Text,
        uploaded_at -> Nullable<Timestamptz>,
        processed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    quizzes (id) {
        id -> Uuid,
        document_id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        difficulty -> Text,
        estimated_duration -> Nullable<Int4>,
        created_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    questions (id) {
        id -> Uuid,
        quiz_id -> Uuid,
        question_text -> Text,
        question_type -> Text,
        options -> Nullable<Jsonb>,
        correct_answer -> Text,
        explanation -> Nullable<Text>,
        order_index -> Int4,
    }
}

diesel::table! {
    quiz_submissions (id) {
        id -> Uuid,
        quiz_id -> Uuid,
        user_id -> Uuid,
        answers -> Jsonb,
        score -> Int4,
        time_spent -> Nullable<Int4>,
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    learning_assessments (id) {
        id -> Uuid,
        user_id -> Uuid,
        assessment_data -> Jsonb,
        learning_style_result -> Text,
        visual_score -> Int4,
        auditory_score -> Int4,
        kinesthetic_score -> Int4,
        reading_score -> Int4,
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(quizzes -> documents (document_id));
diesel::joinable!(questions -> quizzes (quiz_id));
diesel::joinable!(quiz_submissions -> quizzes (quiz_id));

diesel::allow_tables_to_appear_in_same_query!(
    documents,
    quizzes,
    questions,
    quiz_submissions,
    learning_assessments,
);
