use serde::{Deserialize, Serialize};

use crate::i18n::Language;
use crate::markdown::markdown_to_plain_text;
use crate::quiz::ChapterId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u32,
    pub slug: String,
    #[serde(rename = "chapterId")]
    pub chapter_id: ChapterId,
    pub title: String,
    #[serde(rename = "titleEn")]
    pub title_en: String,
    pub excerpt: String,
    #[serde(rename = "excerptEn")]
    pub excerpt_en: String,
    pub content: String,
    #[serde(rename = "contentEn")]
    pub content_en: String,
    pub author: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "readTime")]
    pub read_time: String,
    #[serde(rename = "readTimeEn")]
    pub read_time_en: String,
    pub thumbnail: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl Article {
    pub fn title(&self, lang: Language) -> &str {
        lang.pick(&self.title, &self.title_en)
    }

    pub fn excerpt(&self, lang: Language) -> &str {
        lang.pick(&self.excerpt, &self.excerpt_en)
    }

    pub fn content(&self, lang: Language) -> &str {
        lang.pick(&self.content, &self.content_en)
    }

    pub fn read_time(&self, lang: Language) -> &str {
        lang.pick(&self.read_time, &self.read_time_en)
    }

    pub fn plain_text(&self, lang: Language) -> String {
        markdown_to_plain_text(self.content(lang))
    }

    /// `term` must already be lowercased.
    pub(crate) fn matches(&self, lang: Language, term: &str) -> bool {
        self.title(lang).to_lowercase().contains(term)
            || self.excerpt(lang).to_lowercase().contains(term)
            || self
                .tags
                .iter()
                .flatten()
                .any(|tag| tag.to_lowercase().contains(term))
    }
}

/// Splits `text` into chunks of at most `limit` characters, preferring to
/// break on spaces. Chunks are trimmed and blank ones dropped, since Telegram
/// rejects empty messages. A `limit` of zero is treated as one.
pub fn split_for_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split(' ') {
        let word_len = word.chars().count();
        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > limit && !current.is_empty() {
            push_chunk(&mut chunks, &std::mem::take(&mut current));
            current_len = 0;
        }
        if word_len > limit {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(limit) {
                push_chunk(&mut chunks, &piece.iter().collect::<String>());
            }
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    push_chunk(&mut chunks, &current);
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, chunk: &str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_for_message("độc lập tự do", 100), vec!["độc lập tự do"]);
        assert!(split_for_message("", 10).is_empty());
    }

    #[test]
    fn blank_chunks_are_dropped() {
        assert!(split_for_message("   \n\n  \t ", 3).is_empty());
        let chunks = split_for_message("abc \n\n\n\n\n\n def", 4);
        assert_eq!(chunks, vec!["abc", "def"]);
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
    }

    #[test]
    fn zero_limit_does_not_panic() {
        assert_eq!(split_for_message("ab c", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn long_text_breaks_on_words() {
        let chunks = split_for_message("aaa bbb ccc ddd", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
    }

    #[test]
    fn oversized_words_are_cut() {
        let chunks = split_for_message("ab abcdefgh", 4);
        assert_eq!(chunks, vec!["ab", "abcd", "efgh"]);
    }
}
