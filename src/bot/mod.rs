//! Telegram front end: one dialogue per chat, driving the quiz and chat sessions.

pub mod about;
pub mod articles;
pub mod chat;
pub mod feedback;
pub mod locks;
pub mod menu;
pub mod quiz;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use teloxide::{
    dispatching::{dialogue::ErasedStorage, UpdateHandler},
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
    utils::command::BotCommands,
};

use crate::chat::ChatSession;
use crate::content::Catalog;
use crate::i18n::Language;
use crate::quiz::{ChapterId, QuizSession};

pub type BotDialogue = Dialogue<State, ErasedStorage<State>>;
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;
pub type DialogueStorage = Arc<ErasedStorage<State>>;

/// Telegram caps a message at 4096 characters; leave room for headers.
pub const MESSAGE_CHUNK: usize = 3800;

#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveLanguage,
    Menu {
        lang: Language,
    },
    Reading {
        lang: Language,
        chapter_id: Option<ChapterId>,
    },
    Quiz {
        lang: Language,
        session: QuizSession,
    },
    Chat {
        lang: Language,
        session: ChatSession,
    },
    FeedbackRating {
        lang: Language,
    },
    FeedbackText {
        lang: Language,
        rating: u8,
    },
    FeedbackEmail {
        lang: Language,
        rating: u8,
        text: String,
    },
}

impl State {
    pub fn language(&self) -> Option<Language> {
        match self {
            State::Start | State::ReceiveLanguage => None,
            State::Menu { lang }
            | State::Reading { lang, .. }
            | State::Quiz { lang, .. }
            | State::Chat { lang, .. }
            | State::FeedbackRating { lang }
            | State::FeedbackText { lang, .. }
            | State::FeedbackEmail { lang, .. } => Some(*lang),
        }
    }
}

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "HCM202 study bot commands:")]
pub enum Command {
    #[command(description = "start over and pick a language")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "back to the main menu")]
    Menu,
    #[command(description = "switch between Vietnamese and English")]
    Lang,
    #[command(description = "clear the AI chat conversation")]
    Clear,
    #[command(description = "open an article by its slug")]
    Article(String),
    #[command(description = "search articles")]
    Search(String),
    #[command(description = "about the project team and the AI assistant")]
    About,
}

pub fn schema() -> UpdateHandler<HandlerError> {
    let commands = teloxide::filter_command::<Command, _>().endpoint(menu::command);

    let messages = Update::filter_message()
        .enter_dialogue::<Message, ErasedStorage<State>, State>()
        .branch(commands)
        .branch(dptree::case![State::Start].endpoint(menu::start))
        .branch(dptree::case![State::ReceiveLanguage].endpoint(menu::receive_language))
        .branch(dptree::case![State::Menu { lang }].endpoint(menu::menu_choice))
        .branch(dptree::case![State::Reading { lang, chapter_id }].endpoint(articles::reading))
        .branch(dptree::case![State::Quiz { lang, session }].endpoint(quiz::quiz_step))
        .branch(dptree::case![State::Chat { lang, session }].endpoint(chat::chat_message))
        .branch(dptree::case![State::FeedbackRating { lang }].endpoint(feedback::receive_rating))
        .branch(dptree::case![State::FeedbackText { lang, rating }].endpoint(feedback::receive_text))
        .branch(
            dptree::case![State::FeedbackEmail { lang, rating, text }].endpoint(feedback::receive_email),
        );

    let callbacks = Update::filter_callback_query()
        .enter_dialogue::<CallbackQuery, ErasedStorage<State>, State>()
        .branch(dptree::case![State::Chat { lang, session }].endpoint(chat::copy_callback));

    dptree::entry().branch(messages).branch(callbacks)
}

/// One button per row.
pub fn column_keyboard<I, S>(labels: I) -> KeyboardMarkup
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    KeyboardMarkup::new(
        labels
            .into_iter()
            .map(|label| vec![KeyboardButton::new(label)])
            .collect::<Vec<_>>(),
    )
}

pub fn chapter_keyboard(catalog: &Catalog, lang: Language, back: &str) -> KeyboardMarkup {
    column_keyboard(
        catalog
            .chapters()
            .iter()
            .map(|c| c.title(lang).to_string())
            .chain(std::iter::once(back.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(markup: &KeyboardMarkup) -> Vec<Vec<String>> {
        markup
            .keyboard
            .iter()
            .map(|row| row.iter().map(|b| b.text.clone()).collect())
            .collect()
    }

    #[test]
    fn column_keyboard_puts_each_label_on_its_own_row() {
        let markup = column_keyboard(["a", "b"]);
        assert_eq!(labels(&markup), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn language_is_known_after_the_start_flow() {
        assert_eq!(State::Start.language(), None);
        assert_eq!(
            State::Chat {
                lang: Language::English,
                session: ChatSession::new()
            }
            .language(),
            Some(Language::English)
        );
    }

    #[test]
    fn commands_parse_with_arguments() {
        assert!(matches!(
            Command::parse("/article doc-lap-dan-toc", "hcm202_bot"),
            Ok(Command::Article(slug)) if slug == "doc-lap-dan-toc"
        ));
        assert!(matches!(Command::parse("/clear", "hcm202_bot"), Ok(Command::Clear)));
        assert!(matches!(Command::parse("/about", "hcm202_bot"), Ok(Command::About)));
        assert!(Command::parse("/unknown", "hcm202_bot").is_err());
    }
}
