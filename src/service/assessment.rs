use serde::{Deserialize, Serialize};

/// One questionnaire entry served to the client.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentQuestion {
    pub id: u32,
    pub question: &'static str,
    pub options: [&'static str; 4],
    pub category: &'static str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssessmentResponse {
    pub question_id: u32,
    pub answer: String,
}

/// Derived style scores; the max bucket names the learning style.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningStyleScores {
    pub learning_style: &'static str,
    pub visual: i32,
    pub auditory: i32,
    pub reading: i32,
    pub kinesthetic: i32,
}

pub fn assessment_questions() -> Vec<AssessmentQuestion> {
    vec![
        AssessmentQuestion {
            id: 1,
            question: "When learning something new, I prefer to:",
            options: [
                "Read about it in detail",
                "Watch a demonstration",
                "Listen to someone explain it",
                "Try it hands-on immediately",
            ],
            category: "learning_preference",
        },
        AssessmentQuestion {
            id: 2,
            question: "I remember information best when:",
            options: [
                "I see it written down or in diagrams",
                "I hear it explained verbally",
                "I write notes or summaries",
                "I practice or apply it physically",
            ],
            category: "memory_style",
        },
        AssessmentQuestion {
            id: 3,
            question: "When solving problems, I tend to:",
            options: [
                "Draw diagrams or charts",
                "Talk through the problem aloud",
                "Write out the steps carefully",
                "Jump in and experiment",
            ],
            category: "problem_solving",
        },
        AssessmentQuestion {
            id: 4,
            question: "In a classroom, I learn best when:",
            options: [
                "There are visual aids and presentations",
                "There's group discussion",
                "I can take detailed notes",
                "There are hands-on activities",
            ],
            category: "classroom_preference",
        },
        AssessmentQuestion {
            id: 5,
            question: "I prefer to study:",
            options: [
                "Using highlighted texts and colorful materials",
                "In quiet environments where I can focus",
                "By reading and rereading materials",
                "By moving around or using manipulatives",
            ],
            category: "study_environment",
        },
    ]
}

/// Keyword scoring of free-text answers into the four style buckets.
/// Ties resolve in bucket order: visual, auditory, reading, kinesthetic.
pub fn calculate_learning_style(responses: &[AssessmentResponse]) -> LearningStyleScores {
    let mut visual = 0;
    let mut auditory = 0;
    let mut reading = 0;
    let mut kinesthetic = 0;

    for response in responses {
        let answer = response.answer.to_lowercase();
        if answer.contains("visual") || answer.contains("see") || answer.contains("diagram") {
            visual += 1;
        } else if answer.contains("hear")
            || answer.contains("listen")
            || answer.contains("discussion")
        {
            auditory += 1;
        } else if answer.contains("read") || answer.contains("write") || answer.contains("notes") {
            reading += 1;
        } else if answer.contains("hands-on")
            || answer.contains("practice")
            || answer.contains("physical")
        {
            kinesthetic += 1;
        }
    }

    let mut learning_style = "visual";
    let mut best = visual;
    for (name, score) in [
        ("auditory", auditory),
        ("reading", reading),
        ("kinesthetic", kinesthetic),
    ] {
        if score > best {
            best = score;
            learning_style = name;
        }
    }

    LearningStyleScores {
        learning_style,
        visual,
        auditory,
        reading,
        kinesthetic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(answer: &str) -> AssessmentResponse {
        AssessmentResponse {
            question_id: 1,
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_visual_answers_dominate() {
        let responses = vec![
            response("I see it written down or in diagrams"),
            response("Draw diagrams or charts"),
            response("I hear it explained verbally"),
        ];
        let scores = calculate_learning_style(&responses);
        assert_eq!(scores.learning_style, "visual");
        assert_eq!(scores.visual, 2);
        assert_eq!(scores.auditory, 1);
    }

    #[test]
    fn test_kinesthetic_keywords() {
        let responses = vec![
            response("Try it hands-on immediately"),
            response("I practice or apply it physically"),
        ];
        let scores = calculate_learning_style(&responses);
        assert_eq!(scores.learning_style, "kinesthetic");
        assert_eq!(scores.kinesthetic, 2);
    }

    #[test]
    fn test_unmatched_answers_score_nothing() {
        let scores = calculate_learning_style(&[response("None of the above")]);
        assert_eq!(scores.visual, 0);
        assert_eq!(scores.auditory, 0);
        assert_eq!(scores.reading, 0);
        assert_eq!(scores.kinesthetic, 0);
        // Tie resolves to the first bucket.
        assert_eq!(scores.learning_style, "visual");
    }

    #[test]
    fn test_questionnaire_has_five_entries() {
        assert_eq!(assessment_questions().len(), 5);
    }
}
