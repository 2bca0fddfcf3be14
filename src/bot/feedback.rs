use std::sync::Arc;

use teloxide::{prelude::*, types::KeyboardMarkup};

use super::{column_keyboard, menu, BotDialogue, HandlerResult, State};
use crate::feedback::{validate_email, Feedback, FeedbackError, FeedbackStore};
use crate::i18n::Language;

fn rating_button(lang: Language, rating: u8) -> String {
    let label = lang.texts().rating_labels[usize::from(rating - 1)];
    format!("{} {}", "⭐".repeat(usize::from(rating)), label)
}

fn rating_keyboard(lang: Language) -> KeyboardMarkup {
    column_keyboard(
        (1..=5u8)
            .rev()
            .map(|rating| rating_button(lang, rating))
            .chain(std::iter::once(lang.texts().back_to_menu.to_string())),
    )
}

/// Accepts a rating button or a bare digit.
pub fn parse_rating(lang: Language, text: &str) -> Option<u8> {
    let text = text.trim();
    if let Ok(rating) = text.parse::<u8>() {
        return (1..=5).contains(&rating).then_some(rating);
    }
    (1..=5u8).find(|&rating| rating_button(lang, rating) == text)
}

pub async fn ask_rating(bot: &Bot, dialogue: &BotDialogue, lang: Language) -> HandlerResult {
    bot.send_message(dialogue.chat_id(), lang.texts().feedback_rating)
        .reply_markup(rating_keyboard(lang))
        .await?;
    dialogue.update(State::FeedbackRating { lang }).await?;
    Ok(())
}

pub async fn receive_rating(
    bot: Bot,
    dialogue: BotDialogue,
    lang: Language,
    msg: Message,
) -> HandlerResult {
    let texts = lang.texts();
    let text = msg.text().unwrap_or_default();
    if text == texts.back_to_menu {
        return menu::show_menu(&bot, &dialogue, lang).await;
    }

    match parse_rating(lang, text) {
        Some(rating) => {
            bot.send_message(msg.chat.id, texts.feedback_text)
                .reply_markup(column_keyboard([texts.back_to_menu]))
                .await?;
            dialogue.update(State::FeedbackText { lang, rating }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, texts.feedback_invalid_rating)
                .reply_markup(rating_keyboard(lang))
                .await?;
        }
    }
    Ok(())
}

pub async fn receive_text(
    bot: Bot,
    dialogue: BotDialogue,
    (lang, rating): (Language, u8),
    msg: Message,
) -> HandlerResult {
    let texts = lang.texts();
    let text = msg.text().unwrap_or_default().trim();
    if text == texts.back_to_menu {
        return menu::show_menu(&bot, &dialogue, lang).await;
    }
    if text.is_empty() {
        bot.send_message(msg.chat.id, texts.feedback_empty).await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, texts.feedback_email)
        .reply_markup(column_keyboard([texts.feedback_skip, texts.back_to_menu]))
        .await?;
    dialogue
        .update(State::FeedbackEmail {
            lang,
            rating,
            text: text.to_string(),
        })
        .await?;
    Ok(())
}

pub async fn receive_email(
    bot: Bot,
    dialogue: BotDialogue,
    (lang, rating, text): (Language, u8, String),
    msg: Message,
    store: Arc<dyn FeedbackStore>,
) -> HandlerResult {
    let texts = lang.texts();
    let input = msg.text().unwrap_or_default().trim();
    if input == texts.back_to_menu {
        return menu::show_menu(&bot, &dialogue, lang).await;
    }

    let email = if input == texts.feedback_skip || input.is_empty() {
        None
    } else if validate_email(input).is_ok() {
        Some(input)
    } else {
        bot.send_message(msg.chat.id, texts.feedback_invalid_email)
            .await?;
        return Ok(());
    };

    let reply = match Feedback::new(rating, &text, email, lang) {
        Ok(feedback) => match store.submit(&feedback).await {
            Ok(()) => texts.feedback_thanks,
            Err(FeedbackError::NotConfigured) => texts.feedback_not_configured,
            Err(err) => {
                log::error!("Could not store feedback from {}: {}", msg.chat.id, err);
                texts.feedback_error
            }
        },
        Err(err) => {
            log::warn!("Rejected feedback from {}: {}", msg.chat.id, err);
            texts.feedback_error
        }
    };
    bot.send_message(msg.chat.id, reply).await?;
    menu::show_menu(&bot, &dialogue, lang).await
}
