use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

use super::{chapter_keyboard, column_keyboard, menu, BotDialogue, HandlerResult, State};
use crate::content::Catalog;
use crate::i18n::Language;
use crate::quiz::{
    option_label, parse_option_label, ChapterId, Phase, QuizSession, SessionError,
};

pub async fn quiz_step(
    bot: Bot,
    dialogue: BotDialogue,
    (lang, mut session): (Language, QuizSession),
    msg: Message,
    catalog: Arc<Catalog>,
) -> HandlerResult {
    let texts = lang.texts();
    let chat_id = msg.chat.id;
    let text = msg.text().unwrap_or_default().trim();

    if text == texts.back_to_menu {
        return menu::show_menu(&bot, &dialogue, lang).await;
    }
    if text == texts.quiz_back_to_chapters {
        session.back_to_chapters();
        bot.send_message(chat_id, texts.quiz_choose_chapter)
            .reply_markup(chapter_keyboard(&catalog, lang, texts.back_to_menu))
            .await?;
        dialogue.update(State::Quiz { lang, session }).await?;
        return Ok(());
    }

    let reply = match session.phase() {
        Phase::ChapterPicking => match catalog.chapter_by_title(lang, text) {
            Some(chapter) => {
                session.select_chapter(chapter.id);
                Reply::QuizList
            }
            None => Reply::Invalid,
        },
        Phase::QuizPicking => {
            let picked = session
                .chapter_id()
                .and_then(|chapter| catalog.quiz_by_title(chapter, lang, text));
            match picked {
                Some(quiz) => match session.select_quiz(quiz.clone()) {
                    Ok(()) => Reply::Question,
                    Err(err) => {
                        log::warn!("Chat {} could not start quiz {}: {}", chat_id, quiz.id, err);
                        Reply::Invalid
                    }
                },
                None => Reply::Invalid,
            }
        }
        Phase::Answering => answering(&mut session, lang, text),
        Phase::Reviewing => {
            if text == texts.quiz_try_again {
                session.reset()?;
                Reply::Question
            } else {
                Reply::Invalid
            }
        }
    };

    match reply {
        Reply::QuizList => {
            let chapter = session.chapter_id().unwrap_or_default();
            bot.send_message(chat_id, quiz_list_text(&catalog, lang, chapter))
                .reply_markup(quiz_keyboard(&catalog, lang, chapter))
                .await?;
        }
        Reply::Question => {
            let question = question_text(&session, lang).unwrap_or_default();
            bot.send_message(chat_id, question)
                .reply_markup(question_keyboard(&session, lang))
                .await?;
        }
        Reply::Results => {
            let results = results_text(&session, lang).unwrap_or_default();
            bot.send_message(chat_id, results)
                .reply_markup(results_keyboard(lang))
                .await?;
        }
        Reply::Incomplete => {
            bot.send_message(chat_id, texts.quiz_incomplete)
                .reply_markup(question_keyboard(&session, lang))
                .await?;
        }
        Reply::Invalid => {
            let markup = match session.phase() {
                Phase::ChapterPicking => chapter_keyboard(&catalog, lang, texts.back_to_menu),
                Phase::QuizPicking => {
                    quiz_keyboard(&catalog, lang, session.chapter_id().unwrap_or_default())
                }
                Phase::Answering => question_keyboard(&session, lang),
                Phase::Reviewing => results_keyboard(lang),
            };
            bot.send_message(chat_id, texts.choose_option)
                .reply_markup(markup)
                .await?;
        }
    }

    dialogue.update(State::Quiz { lang, session }).await?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    QuizList,
    Question,
    Results,
    Incomplete,
    Invalid,
}

fn answering(session: &mut QuizSession, lang: Language, text: &str) -> Reply {
    let texts = lang.texts();

    if text == texts.quiz_previous {
        return step(session.previous());
    }
    if text == texts.quiz_next {
        return step(session.next());
    }
    if text == texts.quiz_back_to_quizzes {
        if let Some(chapter) = session.chapter_id() {
            session.select_chapter(chapter);
            return Reply::QuizList;
        }
        return Reply::Invalid;
    }
    if text == texts.quiz_submit {
        return match session.submit() {
            Ok(_) => Reply::Results,
            Err(SessionError::Incomplete { .. }) => Reply::Incomplete,
            Err(err) => {
                log::warn!("Submit failed: {}", err);
                Reply::Invalid
            }
        };
    }

    let Some(option) = parse_option_label(text) else {
        return Reply::Invalid;
    };
    let Some(question_id) = session.current_question().map(|q| q.id) else {
        return Reply::Invalid;
    };
    match session.answer_question(question_id, option) {
        Ok(()) => {
            if session.can_advance() && !session.is_complete() {
                step(session.next())
            } else {
                Reply::Question
            }
        }
        Err(err) => {
            log::debug!("Ignoring answer `{}`: {}", text, err);
            Reply::Invalid
        }
    }
}

fn step(result: Result<(), SessionError>) -> Reply {
    match result {
        Ok(()) => Reply::Question,
        Err(err) => {
            log::warn!("Quiz navigation failed: {}", err);
            Reply::Invalid
        }
    }
}

pub fn quiz_list_text(catalog: &Catalog, lang: Language, chapter: ChapterId) -> String {
    let texts = lang.texts();
    let quizzes = catalog.quizzes_for_chapter(chapter);
    if quizzes.is_empty() {
        return texts.quiz_no_quizzes.to_string();
    }

    let mut out = String::from(texts.quiz_choose_quiz);
    for quiz in quizzes {
        out.push_str(&format!(
            "\n\n• {} ({} {})",
            quiz.title(lang),
            quiz.questions.len(),
            texts.quiz_count
        ));
        let description = quiz.description(lang);
        if !description.is_empty() {
            out.push('\n');
            out.push_str(description);
        }
    }
    out
}

fn quiz_keyboard(catalog: &Catalog, lang: Language, chapter: ChapterId) -> KeyboardMarkup {
    let texts = lang.texts();
    column_keyboard(
        catalog
            .quizzes_for_chapter(chapter)
            .iter()
            .map(|q| q.title(lang).to_string())
            .chain([
                texts.quiz_back_to_chapters.to_string(),
                texts.back_to_menu.to_string(),
            ]),
    )
}

/// Current question with its lettered options; the chosen one is marked.
pub fn question_text(session: &QuizSession, lang: Language) -> Option<String> {
    let texts = lang.texts();
    let question = session.current_question()?;
    let chosen = session.answer_for(question.id);

    let mut out = format!(
        "{} {} {} {} · {} {}/{}\n\n{}\n",
        texts.quiz_question,
        session.position() + 1,
        texts.quiz_of,
        session.question_count(),
        texts.quiz_answered,
        session.answered_count(),
        session.question_count(),
        question.prompt(lang),
    );
    for (index, option) in question.options(lang).iter().enumerate() {
        let marker = if chosen == Some(index) { "👉 " } else { "" };
        out.push_str(&format!("\n{}{}. {}", marker, option_label(index), option));
    }
    Some(out)
}

pub fn question_keyboard(session: &QuizSession, lang: Language) -> KeyboardMarkup {
    let texts = lang.texts();
    let mut rows = Vec::new();

    if let Some(question) = session.current_question() {
        rows.push(
            (0..question.option_count())
                .map(|i| KeyboardButton::new(option_label(i)))
                .collect::<Vec<_>>(),
        );
    }

    let mut nav = Vec::new();
    if session.can_go_back() {
        nav.push(KeyboardButton::new(texts.quiz_previous));
    }
    if session.can_advance() {
        nav.push(KeyboardButton::new(texts.quiz_next));
    }
    if !nav.is_empty() {
        rows.push(nav);
    }
    if session.is_complete() {
        rows.push(vec![KeyboardButton::new(texts.quiz_submit)]);
    }
    rows.push(vec![
        KeyboardButton::new(texts.quiz_back_to_quizzes),
        KeyboardButton::new(texts.quiz_back_to_chapters),
    ]);
    KeyboardMarkup::new(rows)
}

/// Score summary followed by a per-question review.
pub fn results_text(session: &QuizSession, lang: Language) -> Option<String> {
    let texts = lang.texts();
    let result = session.result()?;
    let quiz = session.quiz()?;

    let verdict = if result.passed {
        texts.quiz_passed
    } else {
        texts.quiz_failed
    };
    let mut out = format!(
        "{}: {}/{} ({}%)\n{}",
        texts.quiz_score, result.score, result.total, result.percentage, verdict
    );

    for (number, question) in quiz.questions.iter().enumerate() {
        let chosen = session.answer_for(question.id);
        let mark = if chosen == Some(question.correct) {
            "✅"
        } else {
            "❌"
        };
        out.push_str(&format!(
            "\n\n{} {}. {}",
            mark,
            number + 1,
            question.prompt(lang)
        ));
        if let Some(chosen) = chosen {
            out.push_str(&format!(
                "\n{}: {}. {}",
                texts.quiz_your_answer,
                option_label(chosen),
                question.option(lang, chosen).unwrap_or_default()
            ));
        }
        out.push_str(&format!(
            "\n{}: {}. {}",
            texts.quiz_correct_answer,
            option_label(question.correct),
            question.option(lang, question.correct).unwrap_or_default()
        ));
        let explanation = question.explanation(lang);
        if !explanation.is_empty() {
            out.push_str(&format!("\n{}: {}", texts.quiz_explanation, explanation));
        }
    }
    Some(out)
}

fn results_keyboard(lang: Language) -> KeyboardMarkup {
    let texts = lang.texts();
    column_keyboard([
        texts.quiz_try_again,
        texts.quiz_back_to_chapters,
        texts.back_to_menu,
    ])
}
