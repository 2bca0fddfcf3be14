//! Static course content: chapters, quizzes and articles loaded once at startup.

pub mod article;
pub mod team;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::i18n::Language;
use crate::quiz::{ChapterId, Quiz};

pub use article::Article;
pub use team::TeamMember;

pub const CHAPTERS_FILE: &str = "chapters.json";
pub const QUIZZES_FILE: &str = "quizzes.json";
pub const ARTICLES_FILE: &str = "articles.json";
/// Optional; the about page lists no team when it is missing.
pub const TEAM_FILE: &str = "team.json";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("quiz group key `{0}` is not of the form chapter<N>")]
    BadGroupKey(String),
    #[error("quiz {quiz_id} is listed under chapter {group} but declares chapter {declared}")]
    ChapterMismatch {
        quiz_id: u32,
        group: ChapterId,
        declared: ChapterId,
    },
    #[error("quiz {0} has no questions")]
    EmptyQuiz(u32),
    #[error("quiz {quiz_id} repeats question id {question_id}")]
    DuplicateQuestion { quiz_id: u32, question_id: u32 },
    #[error("question {question_id} of quiz {quiz_id} has {vi} Vietnamese and {en} English options")]
    MisalignedOptions {
        quiz_id: u32,
        question_id: u32,
        vi: usize,
        en: usize,
    },
    #[error("question {question_id} of quiz {quiz_id} marks option {correct} correct but has {options} options")]
    CorrectOutOfRange {
        quiz_id: u32,
        question_id: u32,
        correct: usize,
        options: usize,
    },
    #[error("article slug `{0}` is used more than once")]
    DuplicateSlug(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    #[serde(rename = "titleEn")]
    pub title_en: String,
    pub description: String,
    #[serde(rename = "descriptionEn")]
    pub description_en: String,
    pub thumbnail: String,
    pub articles: u32,
}

impl Chapter {
    pub fn title(&self, lang: Language) -> &str {
        lang.pick(&self.title, &self.title_en)
    }

    pub fn description(&self, lang: Language) -> &str {
        lang.pick(&self.description, &self.description_en)
    }
}

/// Read-only reference data shared by every session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    chapters: Vec<Chapter>,
    quizzes: HashMap<ChapterId, Vec<Quiz>>,
    articles: Vec<Article>,
    team: Vec<TeamMember>,
}

impl Catalog {
    pub fn new(
        chapters: Vec<Chapter>,
        quizzes: HashMap<ChapterId, Vec<Quiz>>,
        articles: Vec<Article>,
    ) -> Result<Self, ContentError> {
        for (chapter_id, group) in &quizzes {
            for quiz in group {
                validate_quiz(*chapter_id, quiz)?;
            }
        }
        let mut slugs = HashSet::new();
        for article in &articles {
            if !slugs.insert(article.slug.as_str()) {
                return Err(ContentError::DuplicateSlug(article.slug.clone()));
            }
        }

        Ok(Self {
            chapters,
            quizzes,
            articles,
            team: Vec::new(),
        })
    }

    pub fn with_team(mut self, team: Vec<TeamMember>) -> Self {
        self.team = team;
        self
    }

    /// Loads the three content files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ContentError> {
        let chapters: Vec<Chapter> = read_json(&dir.join(CHAPTERS_FILE))?;
        let groups: BTreeMap<String, Vec<Quiz>> = read_json(&dir.join(QUIZZES_FILE))?;
        let articles: Vec<Article> = read_json(&dir.join(ARTICLES_FILE))?;

        let mut quizzes = HashMap::new();
        for (key, group) in groups {
            quizzes.insert(parse_group_key(&key)?, group);
        }

        let team_path = dir.join(TEAM_FILE);
        let team: Vec<TeamMember> = if team_path.exists() {
            read_json(&team_path)?
        } else {
            log::warn!("{} not found, the about page will list no team", team_path.display());
            Vec::new()
        };

        let catalog = Self::new(chapters, quizzes, articles)?.with_team(team);
        log::info!(
            "Loaded {} chapters, {} quizzes and {} articles from {}",
            catalog.chapters.len(),
            catalog.quizzes.values().map(Vec::len).sum::<usize>(),
            catalog.articles.len(),
            dir.display()
        );
        Ok(catalog)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn chapter_by_title(&self, lang: Language, title: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.title(lang) == title)
    }

    pub fn quizzes_for_chapter(&self, id: ChapterId) -> &[Quiz] {
        self.quizzes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn quiz_by_title(&self, chapter: ChapterId, lang: Language, title: &str) -> Option<&Quiz> {
        self.quizzes_for_chapter(chapter)
            .iter()
            .find(|q| q.title(lang) == title)
    }

    pub fn team(&self) -> &[TeamMember] {
        &self.team
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn articles_for_chapter(&self, id: ChapterId) -> Vec<&Article> {
        self.articles.iter().filter(|a| a.chapter_id == id).collect()
    }

    pub fn article_by_slug(&self, slug: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.slug == slug)
    }

    pub fn article_by_title(&self, lang: Language, title: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.title(lang) == title)
    }

    /// Case-insensitive search over the localized title, excerpt and tags.
    /// An empty term matches every article of the (optional) chapter.
    pub fn search_articles(
        &self,
        lang: Language,
        term: &str,
        chapter: Option<ChapterId>,
    ) -> Vec<&Article> {
        let term = term.trim().to_lowercase();
        self.articles
            .iter()
            .filter(|a| chapter.map_or(true, |id| a.chapter_id == id))
            .filter(|a| term.is_empty() || a.matches(lang, &term))
            .collect()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let file = File::open(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_group_key(key: &str) -> Result<ChapterId, ContentError> {
    key.strip_prefix("chapter")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| ContentError::BadGroupKey(key.to_string()))
}

fn validate_quiz(group: ChapterId, quiz: &Quiz) -> Result<(), ContentError> {
    if quiz.chapter_id != group {
        return Err(ContentError::ChapterMismatch {
            quiz_id: quiz.id,
            group,
            declared: quiz.chapter_id,
        });
    }
    if quiz.questions.is_empty() {
        return Err(ContentError::EmptyQuiz(quiz.id));
    }

    let mut seen = HashSet::new();
    for question in &quiz.questions {
        if !seen.insert(question.id) {
            return Err(ContentError::DuplicateQuestion {
                quiz_id: quiz.id,
                question_id: question.id,
            });
        }
        if question.options.len() != question.options_en.len() {
            return Err(ContentError::MisalignedOptions {
                quiz_id: quiz.id,
                question_id: question.id,
                vi: question.options.len(),
                en: question.options_en.len(),
            });
        }
        if question.correct >= question.options.len() {
            return Err(ContentError::CorrectOutOfRange {
                quiz_id: quiz.id,
                question_id: question.id,
                correct: question.correct,
                options: question.options.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::fixtures;

    fn article(slug: &str, chapter_id: ChapterId, title_en: &str, tags: &[&str]) -> Article {
        Article {
            id: 1,
            slug: slug.to_string(),
            chapter_id,
            title: format!("Bài {slug}"),
            title_en: title_en.to_string(),
            excerpt: String::new(),
            excerpt_en: "An overview of the revolution".to_string(),
            content: String::new(),
            content_en: String::new(),
            author: "Nhóm HCM202".to_string(),
            created_at: "2024-10-01".to_string(),
            read_time: "5 phút".to_string(),
            read_time_en: "5 min".to_string(),
            thumbnail: String::new(),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        }
    }

    fn catalog() -> Catalog {
        let mut quizzes = HashMap::new();
        quizzes.insert(1, vec![fixtures::quiz(1, 1, &[0, 1])]);
        Catalog::new(
            Vec::new(),
            quizzes,
            vec![
                article("doc-lap", 1, "National Independence", &["Independence"]),
                article("cnxh", 2, "Socialism in Vietnam", &["socialism"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn group_keys_are_chapter_numbers() {
        assert_eq!(parse_group_key("chapter3").unwrap(), 3);
        assert!(matches!(
            parse_group_key("chap3"),
            Err(ContentError::BadGroupKey(_))
        ));
        assert!(parse_group_key("chapterX").is_err());
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let mut quiz = fixtures::quiz(5, 1, &[0]);
        quiz.questions[0].correct = 3;
        let mut quizzes = HashMap::new();
        quizzes.insert(1, vec![quiz]);
        assert!(matches!(
            Catalog::new(Vec::new(), quizzes, Vec::new()),
            Err(ContentError::CorrectOutOfRange { correct: 3, .. })
        ));
    }

    #[test]
    fn rejects_misaligned_options_and_duplicate_ids() {
        let mut misaligned = fixtures::quiz(5, 1, &[0]);
        misaligned.questions[0].options_en.pop();
        assert!(matches!(
            validate_quiz(1, &misaligned),
            Err(ContentError::MisalignedOptions { vi: 3, en: 2, .. })
        ));

        let mut duplicated = fixtures::quiz(6, 1, &[0, 1]);
        duplicated.questions[1].id = duplicated.questions[0].id;
        assert!(matches!(
            validate_quiz(1, &duplicated),
            Err(ContentError::DuplicateQuestion { quiz_id: 6, .. })
        ));
    }

    #[test]
    fn rejects_quiz_filed_under_the_wrong_chapter() {
        let quiz = fixtures::quiz(7, 2, &[0]);
        assert!(matches!(
            validate_quiz(1, &quiz),
            Err(ContentError::ChapterMismatch {
                group: 1,
                declared: 2,
                ..
            })
        ));
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let articles = vec![article("a", 1, "A", &[]), article("a", 1, "B", &[])];
        assert!(matches!(
            Catalog::new(Vec::new(), HashMap::new(), articles),
            Err(ContentError::DuplicateSlug(slug)) if slug == "a"
        ));
    }

    #[test]
    fn search_matches_title_excerpt_and_tags() {
        let catalog = catalog();
        let slugs = |found: Vec<&Article>| found.iter().map(|a| a.slug.clone()).collect::<Vec<_>>();

        assert_eq!(slugs(catalog.search_articles(Language::English, "SOCIALISM", None)), vec!["cnxh"]);
        assert_eq!(slugs(catalog.search_articles(Language::English, "independence", None)), vec!["doc-lap"]);
        assert_eq!(catalog.search_articles(Language::English, "revolution", None).len(), 2);
        assert_eq!(slugs(catalog.search_articles(Language::English, "", Some(2))), vec!["cnxh"]);
        assert!(catalog.search_articles(Language::English, "socialism", Some(1)).is_empty());
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let catalog = catalog();
        assert!(catalog.article_by_slug("missing").is_none());
        assert_eq!(catalog.article_by_slug("cnxh").map(|a| a.chapter_id), Some(2));
    }

    #[test]
    fn quizzes_for_unknown_chapter_is_empty() {
        let catalog = catalog();
        assert_eq!(catalog.quizzes_for_chapter(1).len(), 1);
        assert!(catalog.quizzes_for_chapter(9).is_empty());
        assert!(catalog.quiz_by_title(1, Language::English, "Quiz 1").is_some());
    }

    #[test]
    fn bundled_content_loads() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let catalog = Catalog::load(&dir).unwrap();
        assert!(!catalog.chapters().is_empty());
        for chapter in catalog.chapters() {
            assert!(!catalog.quizzes_for_chapter(chapter.id).is_empty());
        }
        for article in catalog.articles() {
            assert!(catalog.chapter(article.chapter_id).is_some());
        }
        assert!(!catalog.team().is_empty());
    }

    #[test]
    fn missing_directory_reports_the_path() {
        let err = Catalog::load(Path::new("/nonexistent/content")).unwrap_err();
        assert!(err.to_string().contains(CHAPTERS_FILE));
    }
}
