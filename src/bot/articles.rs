use std::sync::Arc;

use chrono::NaiveDate;
use teloxide::{prelude::*, types::ParseMode, utils::html};

use super::{chapter_keyboard, column_keyboard, menu, BotDialogue, HandlerResult, State, MESSAGE_CHUNK};
use crate::content::{article::split_for_message, Article, Catalog};
use crate::i18n::Language;
use crate::quiz::ChapterId;

pub async fn reading(
    bot: Bot,
    dialogue: BotDialogue,
    (lang, chapter_id): (Language, Option<ChapterId>),
    msg: Message,
    catalog: Arc<Catalog>,
) -> HandlerResult {
    let texts = lang.texts();
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        bot.send_message(chat_id, texts.choose_option).await?;
        return Ok(());
    };

    if text == texts.back_to_menu {
        return menu::show_menu(&bot, &dialogue, lang).await;
    }

    match chapter_id {
        None => match catalog.chapter_by_title(lang, text) {
            Some(chapter) => show_articles(&bot, &dialogue, &catalog, lang, chapter.id).await?,
            None => {
                bot.send_message(chat_id, texts.choose_option)
                    .reply_markup(chapter_keyboard(&catalog, lang, texts.back_to_menu))
                    .await?;
            }
        },
        Some(chapter_id) => {
            if text == texts.quiz_back_to_chapters {
                bot.send_message(chat_id, texts.reading_choose_chapter)
                    .reply_markup(chapter_keyboard(&catalog, lang, texts.back_to_menu))
                    .await?;
                dialogue
                    .update(State::Reading {
                        lang,
                        chapter_id: None,
                    })
                    .await?;
                return Ok(());
            }

            let article = catalog
                .articles_for_chapter(chapter_id)
                .into_iter()
                .find(|a| a.title(lang) == text);
            match article {
                Some(article) => send_article(&bot, chat_id, &catalog, article, lang).await?,
                None => {
                    bot.send_message(chat_id, texts.choose_option)
                        .reply_markup(article_keyboard(&catalog, lang, chapter_id))
                        .await?;
                }
            }
        }
    }
    Ok(())
}

async fn show_articles(
    bot: &Bot,
    dialogue: &BotDialogue,
    catalog: &Catalog,
    lang: Language,
    chapter_id: ChapterId,
) -> HandlerResult {
    let texts = lang.texts();
    let prompt = if catalog.articles_for_chapter(chapter_id).is_empty() {
        texts.reading_no_articles
    } else {
        texts.reading_choose_article
    };
    bot.send_message(dialogue.chat_id(), prompt)
        .reply_markup(article_keyboard(catalog, lang, chapter_id))
        .await?;
    dialogue
        .update(State::Reading {
            lang,
            chapter_id: Some(chapter_id),
        })
        .await?;
    Ok(())
}

fn article_keyboard(
    catalog: &Catalog,
    lang: Language,
    chapter_id: ChapterId,
) -> teloxide::types::KeyboardMarkup {
    let texts = lang.texts();
    column_keyboard(
        catalog
            .articles_for_chapter(chapter_id)
            .into_iter()
            .map(|a| a.title(lang).to_string())
            .chain([
                texts.quiz_back_to_chapters.to_string(),
                texts.back_to_menu.to_string(),
            ]),
    )
}

pub async fn send_article(
    bot: &Bot,
    chat_id: ChatId,
    catalog: &Catalog,
    article: &Article,
    lang: Language,
) -> HandlerResult {
    log::debug!("Sending article {} to {}", article.slug, chat_id);
    bot.send_message(chat_id, article_header(catalog, article, lang))
        .parse_mode(ParseMode::Html)
        .await?;
    for chunk in split_for_message(&article.plain_text(lang), MESSAGE_CHUNK) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

pub fn article_header(catalog: &Catalog, article: &Article, lang: Language) -> String {
    let chapter = catalog
        .chapter(article.chapter_id)
        .map(|c| c.title(lang))
        .unwrap_or_default();
    format!(
        "<b>{}</b>\n<i>{}</i>\n{} {} · {} · {}",
        html::escape(article.title(lang)),
        html::escape(chapter),
        lang.texts().article_by,
        html::escape(&article.author),
        format_date(&article.created_at, lang),
        html::escape(article.read_time(lang)),
    )
}

/// `2024-10-01` becomes `01/10/2024` in Vietnamese and `October 1, 2024` in English.
pub fn format_date(raw: &str, lang: Language) -> String {
    let day = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => match lang {
            Language::Vietnamese => date.format("%d/%m/%Y").to_string(),
            Language::English => date.format("%B %-d, %Y").to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

pub fn render_search(lang: Language, found: &[&Article]) -> String {
    let texts = lang.texts();
    if found.is_empty() {
        return texts.search_empty.to_string();
    }
    let lines: Vec<String> = found
        .iter()
        .map(|a| format!("• {}\n  /article {}", a.title(lang), a.slug))
        .collect();
    format!("{}:\n{}", texts.search_results, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_follow_language() {
        assert_eq!(format_date("2024-10-01", Language::Vietnamese), "01/10/2024");
        assert_eq!(format_date("2024-10-01T08:00:00Z", Language::English), "October 1, 2024");
        assert_eq!(format_date("soon", Language::English), "soon");
    }

    #[test]
    fn empty_search_has_a_notice() {
        assert_eq!(
            render_search(Language::English, &[]),
            Language::English.texts().search_empty
        );
    }
}
