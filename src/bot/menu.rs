use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
    utils::command::BotCommands,
};

use super::{
    about, articles, chapter_keyboard, chat, feedback, locks::ChatLocks, BotDialogue, Command,
    HandlerResult, State,
};
use crate::chat::{ChatSession, CompletionClient};
use crate::content::Catalog;
use crate::i18n::{Language, EN_BUTTON, VI_BUTTON};
use crate::quiz::QuizSession;

pub fn menu_keyboard(lang: Language) -> KeyboardMarkup {
    let texts = lang.texts();
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(texts.menu_articles),
            KeyboardButton::new(texts.menu_quiz),
        ],
        vec![
            KeyboardButton::new(texts.menu_chat),
            KeyboardButton::new(texts.menu_feedback),
        ],
        vec![
            KeyboardButton::new(texts.menu_about),
            KeyboardButton::new(texts.menu_language),
        ],
    ])
}

pub async fn show_menu(bot: &Bot, dialogue: &BotDialogue, lang: Language) -> HandlerResult {
    bot.send_message(dialogue.chat_id(), lang.texts().menu_prompt)
        .reply_markup(menu_keyboard(lang))
        .await?;
    dialogue.update(State::Menu { lang }).await?;
    Ok(())
}

pub async fn start(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    let texts = Language::default().texts();
    bot.send_message(msg.chat.id, texts.greeting)
        .reply_markup(KeyboardMarkup::new(vec![vec![
            KeyboardButton::new(VI_BUTTON),
            KeyboardButton::new(EN_BUTTON),
        ]]))
        .await?;

    dialogue.update(State::ReceiveLanguage).await?;
    Ok(())
}

pub async fn receive_language(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    match msg.text().and_then(Language::from_button) {
        Some(lang) => {
            log::info!("Chat {} picked {}", msg.chat.id, lang.code());
            show_menu(&bot, &dialogue, lang).await
        }
        None => {
            bot.send_message(msg.chat.id, Language::default().texts().choose_language)
                .await?;
            Ok(())
        }
    }
}

pub async fn menu_choice(
    bot: Bot,
    dialogue: BotDialogue,
    lang: Language,
    msg: Message,
    catalog: Arc<Catalog>,
    client: Arc<dyn CompletionClient>,
) -> HandlerResult {
    let texts = lang.texts();
    let chat_id = msg.chat.id;

    match msg.text() {
        Some(text) if text == texts.menu_articles => {
            bot.send_message(chat_id, texts.reading_choose_chapter)
                .reply_markup(chapter_keyboard(&catalog, lang, texts.back_to_menu))
                .await?;
            dialogue
                .update(State::Reading {
                    lang,
                    chapter_id: None,
                })
                .await?;
        }
        Some(text) if text == texts.menu_quiz => {
            bot.send_message(chat_id, texts.quiz_choose_chapter)
                .reply_markup(chapter_keyboard(&catalog, lang, texts.back_to_menu))
                .await?;
            dialogue
                .update(State::Quiz {
                    lang,
                    session: QuizSession::new(),
                })
                .await?;
        }
        Some(text) if text == texts.menu_chat => {
            bot.send_message(chat_id, texts.chat_intro)
                .reply_markup(KeyboardMarkup::new(vec![vec![KeyboardButton::new(
                    texts.back_to_menu,
                )]]))
                .await?;
            dialogue
                .update(State::Chat {
                    lang,
                    session: ChatSession::new(),
                })
                .await?;
        }
        Some(text) if text == texts.menu_feedback => {
            feedback::ask_rating(&bot, &dialogue, lang).await?;
        }
        Some(text) if text == texts.menu_about => {
            bot.send_message(chat_id, about::render_about(&catalog, lang, client.model()))
                .reply_markup(menu_keyboard(lang))
                .await?;
        }
        Some(text) if text == texts.menu_language => {
            show_menu(&bot, &dialogue, lang.toggled()).await?;
        }
        _ => {
            bot.send_message(chat_id, texts.choose_option)
                .reply_markup(menu_keyboard(lang))
                .await?;
        }
    }
    Ok(())
}

/// Commands work from every state; the current state supplies the language.
pub async fn command(
    bot: Bot,
    dialogue: BotDialogue,
    msg: Message,
    cmd: Command,
    state: State,
    catalog: Arc<Catalog>,
    client: Arc<dyn CompletionClient>,
    locks: Arc<ChatLocks>,
) -> HandlerResult {
    let lang = state.language();

    match cmd {
        Command::Start => {
            let _slot = locks.lock(msg.chat.id).await;
            start(bot, dialogue, msg).await?
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Menu => {
            let _slot = locks.lock(msg.chat.id).await;
            match lang {
                Some(lang) => show_menu(&bot, &dialogue, lang).await?,
                None => start(bot, dialogue, msg).await?,
            }
        }
        Command::Lang => {
            let _slot = locks.lock(msg.chat.id).await;
            show_menu(&bot, &dialogue, lang.unwrap_or_default().toggled()).await?;
        }
        Command::Clear => {
            match chat::with_chat_session(&dialogue, &locks, |session, _| session.clear()).await? {
                Some((lang, ())) => {
                    bot.send_message(msg.chat.id, lang.texts().chat_cleared)
                        .await?;
                }
                None => {
                    log::debug!("Ignoring /clear outside of chat mode in {}", msg.chat.id);
                }
            }
        }
        Command::About => {
            let lang = lang.unwrap_or_default();
            bot.send_message(msg.chat.id, about::render_about(&catalog, lang, client.model()))
                .await?;
        }
        Command::Article(slug) => {
            let lang = lang.unwrap_or_default();
            match catalog.article_by_slug(slug.trim()) {
                Some(article) => {
                    articles::send_article(&bot, msg.chat.id, &catalog, article, lang).await?
                }
                None => {
                    bot.send_message(msg.chat.id, lang.texts().article_not_found)
                        .await?;
                }
            }
        }
        Command::Search(term) => {
            let lang = lang.unwrap_or_default();
            let found = catalog.search_articles(lang, &term, None);
            bot.send_message(msg.chat.id, articles::render_search(lang, &found))
                .await?;
        }
    }
    Ok(())
}
