pub mod session;

use serde::{Deserialize, Serialize};

use crate::i18n::Language;

pub use session::{Phase, QuizResult, QuizSession, SessionError};

pub type ChapterId = u32;
pub type QuestionId = u32;

/// Minimum rounded percentage for a passed attempt.
pub const PASS_THRESHOLD: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: u32,
    pub title: String,
    #[serde(rename = "titleEn")]
    pub title_en: String,
    pub description: String,
    #[serde(rename = "descriptionEn")]
    pub description_en: String,
    #[serde(rename = "chapterId")]
    pub chapter_id: ChapterId,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn title(&self, lang: Language) -> &str {
        lang.pick(&self.title, &self.title_en)
    }

    pub fn description(&self, lang: Language) -> &str {
        lang.pick(&self.description, &self.description_en)
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    #[serde(rename = "questionEn")]
    pub question_en: String,
    pub options: Vec<String>,
    #[serde(rename = "optionsEn")]
    pub options_en: Vec<String>,
    pub correct: usize,
    pub explanation: String,
    #[serde(rename = "explanationEn")]
    pub explanation_en: String,
}

impl Question {
    pub fn prompt(&self, lang: Language) -> &str {
        lang.pick(&self.question, &self.question_en)
    }

    pub fn options(&self, lang: Language) -> &[String] {
        match lang {
            Language::Vietnamese => &self.options,
            Language::English => &self.options_en,
        }
    }

    pub fn option(&self, lang: Language, index: usize) -> Option<&str> {
        self.options(lang).get(index).map(String::as_str)
    }

    pub fn explanation(&self, lang: Language) -> &str {
        lang.pick(&self.explanation, &self.explanation_en)
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn is_correct(&self, index: usize) -> bool {
        self.correct == index
    }
}

/// Letter shown next to an option ("A", "B", ...).
pub fn option_label(index: usize) -> String {
    char::from_u32('A' as u32 + index as u32)
        .map(|c| c.to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

/// Inverse of [`option_label`] for a single letter typed or tapped by the user.
pub fn parse_option_label(text: &str) -> Option<usize> {
    let mut chars = text.trim().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !letter.is_ascii_uppercase() {
        return None;
    }
    Some(letter as usize - 'A' as usize)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn question(id: QuestionId, correct: usize) -> Question {
        Question {
            id,
            question: format!("Câu {id}"),
            question_en: format!("Question {id}"),
            options: vec!["Một".into(), "Hai".into(), "Ba".into()],
            options_en: vec!["One".into(), "Two".into(), "Three".into()],
            correct,
            explanation: "Vì vậy".into(),
            explanation_en: "Because".into(),
        }
    }

    pub fn quiz(id: u32, chapter_id: ChapterId, correct: &[usize]) -> Quiz {
        Quiz {
            id,
            title: format!("Bài kiểm tra {id}"),
            title_en: format!("Quiz {id}"),
            description: String::new(),
            description_en: String::new(),
            chapter_id,
            questions: correct
                .iter()
                .enumerate()
                .map(|(i, c)| question(i as QuestionId + 1, *c))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_labels_are_letters() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(3), "D");
        assert_eq!(parse_option_label("b"), Some(1));
        assert_eq!(parse_option_label(" C "), Some(2));
        assert_eq!(parse_option_label("AB"), None);
        assert_eq!(parse_option_label("1"), None);
        assert_eq!(parse_option_label(""), None);
    }

    #[test]
    fn localized_question_fields() {
        let q = fixtures::question(7, 1);
        assert_eq!(q.prompt(Language::English), "Question 7");
        assert_eq!(q.option(Language::Vietnamese, 1), Some("Hai"));
        assert_eq!(q.option(Language::English, 5), None);
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
    }
}
