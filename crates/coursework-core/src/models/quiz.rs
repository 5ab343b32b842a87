use serde::{Deserialize, Serialize};

/// A multiple choice question from the quiz endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Question {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answers: Vec<String>,
    /// Index into `answers` of the correct choice.
    pub correct: usize,
}

impl Question {
    pub fn correct_answer(&self) -> Option<&str> {
        self.answers.get(self.correct).map(String::as_str)
    }

    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct
    }

    /// A question is playable when it has choices and the correct index points at one.
    pub fn is_playable(&self) -> bool {
        self.correct < self.answers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question() {
        let json = r#"[{"question":"2 + 2?","answers":["3","4","5"],"correct":1}]"#;
        let questions: Vec<Question> =
            serde_json::from_str(json).expect("Failed to parse quiz test JSON");
        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.question, "2 + 2?");
        assert_eq!(q.correct_answer(), Some("4"));
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert!(q.is_playable());
    }

    #[test]
    fn test_unplayable_question() {
        let q = Question {
            question: "?".to_string(),
            answers: vec!["a".to_string()],
            correct: 3,
        };
        assert!(!q.is_playable());
        assert_eq!(q.correct_answer(), None);
    }
}
