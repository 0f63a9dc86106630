use std::collections::HashMap;

use crate::db::models::Question;

/// Percentage score for one submission: round-down of
/// correct / total * 100, or 0 for a quiz with no questions.
///
/// Comparison is exact string equality against the stored correct-answer
/// key. No trimming or case folding is applied.
pub fn calculate_score(questions: &[Question], answers: &HashMap<String, String>) -> i32 {
    if questions.is_empty() {
        return 0;
    }

    let correct_count = questions
        .iter()
        .filter(|question| {
            answers
                .get(&question.id.to_string())
                .is_some_and(|answer| *answer == question.correct_answer)
        })
        .count();

    ((correct_count * 100) / questions.len()) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn question(correct: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            question_text: "q".to_string(),
            question_type: "multiple_choice".to_string(),
            options: None,
            correct_answer: correct.to_string(),
            explanation: None,
            order_index: 0,
        }
    }

    #[test]
    fn test_three_of_four_scores_75() {
        let questions: Vec<Question> = vec!["A", "B", "C", "D"].into_iter().map(question).collect();

        let mut answers = HashMap::new();
        answers.insert(questions[0].id.to_string(), "A".to_string());
        answers.insert(questions[1].id.to_string(), "B".to_string());
        answers.insert(questions[2].id.to_string(), "C".to_string());
        answers.insert(questions[3].id.to_string(), "A".to_string());

        assert_eq!(calculate_score(&questions, &answers), 75);
    }

    #[test]
    fn test_empty_quiz_scores_zero() {
        let mut answers = HashMap::new();
        answers.insert("anything".to_string(), "A".to_string());
        assert_eq!(calculate_score(&[], &answers), 0);
    }

    #[test]
    fn test_score_rounds_down() {
        let questions: Vec<Question> = vec!["A", "A", "A"].into_iter().map(question).collect();
        let mut answers = HashMap::new();
        answers.insert(questions[0].id.to_string(), "A".to_string());

        // 1/3 = 33.33.. -> 33
        assert_eq!(calculate_score(&questions, &answers), 33);
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let questions = vec![question("A")];
        let mut answers = HashMap::new();
        answers.insert(questions[0].id.to_string(), "a".to_string());

        assert_eq!(calculate_score(&questions, &answers), 0);
    }

    #[test]
    fn test_unanswered_questions_count_as_wrong() {
        let questions: Vec<Question> = vec!["A", "B"].into_iter().map(question).collect();
        let mut answers = HashMap::new();
        answers.insert(questions[0].id.to_string(), "A".to_string());

        assert_eq!(calculate_score(&questions, &answers), 50);
    }
}
