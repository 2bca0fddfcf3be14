use std::sync::Arc;

use chrono::Utc;
use teloxide::{
    prelude::*,
    types::{ChatAction, InlineKeyboardButton, InlineKeyboardMarkup},
};
use uuid::Uuid;

use super::locks::{ChatLocks, ChatSlot};
use super::{menu, BotDialogue, HandlerError, HandlerResult, State, MESSAGE_CHUNK};
use crate::chat::{
    prompt::course_directive, ChatSession, Completion, CompletionClient, CompletionError,
    Rejection, RequestMessage, SendOutcome, Usage, COPIED_MARKER_SECS,
};
use crate::content::article::split_for_message;
use crate::i18n::Language;

const COPY_PREFIX: &str = "copy:";

/// Loads the chat session while holding the chat's slot, applies `f` and
/// stores the result. `None` when the dialogue is no longer in chat mode.
pub async fn with_chat_session<R>(
    dialogue: &BotDialogue,
    locks: &ChatLocks,
    f: impl FnOnce(&mut ChatSession, &mut ChatSlot) -> R,
) -> Result<Option<(Language, R)>, HandlerError> {
    let mut slot = locks.lock(dialogue.chat_id()).await;
    let Some(State::Chat { lang, mut session }) = dialogue.get().await? else {
        return Ok(None);
    };
    let out = f(&mut session, &mut *slot);
    dialogue.update(State::Chat { lang, session }).await?;
    Ok(Some((lang, out)))
}

/// Starts a request unless one is already running for this chat.
///
/// A session saved as in flight with no task behind it (a crash, a restart
/// with persistent storage) is resolved as interrupted first.
fn start_request(
    session: &mut ChatSession,
    slot: &mut ChatSlot,
    text: &str,
    directive: &str,
) -> Result<(Uuid, Vec<RequestMessage>), Rejection> {
    if session.is_in_flight() && slot.pending_request.is_none() {
        log::warn!("Resolving a chat request that has no running task");
        session.finish_send(Err(CompletionError::Interrupted));
    }
    let request = session.begin_send(text, directive)?;
    let token = Uuid::new_v4();
    slot.pending_request = Some(token);
    Ok((token, request))
}

pub async fn chat_message(
    bot: Bot,
    dialogue: BotDialogue,
    (lang, _): (Language, ChatSession),
    msg: Message,
    client: Arc<dyn CompletionClient>,
    locks: Arc<ChatLocks>,
) -> HandlerResult {
    let texts = lang.texts();
    let chat_id = msg.chat.id;
    let text = msg.text().unwrap_or_default();
    if text == texts.back_to_menu {
        let _slot = locks.lock(chat_id).await;
        return menu::show_menu(&bot, &dialogue, lang).await;
    }

    let started = with_chat_session(&dialogue, &locks, |session, slot| {
        start_request(session, slot, text, course_directive(lang))
    })
    .await?;

    let (token, request) = match started {
        Some((_, Ok(started))) => started,
        Some((_, Err(Rejection::EmptyInput))) => {
            log::debug!("Ignoring empty chat input from {}", chat_id);
            return Ok(());
        }
        Some((_, Err(Rejection::InFlight))) => {
            bot.send_message(chat_id, texts.chat_busy).await?;
            return Ok(());
        }
        None => {
            log::debug!("Chat {} left chat mode before the message was handled", chat_id);
            return Ok(());
        }
    };

    {
        let bot = bot.clone();
        tokio::spawn(async move {
            let result = client.complete(request).await;
            if let Err(err) = deliver_reply(bot, dialogue, &locks, token, result).await {
                log::error!("Could not deliver chat reply to {}: {}", chat_id, err);
            }
        });
    }

    if let Err(err) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        log::warn!("Could not send typing action to {}: {}", chat_id, err);
    }
    Ok(())
}

/// What a resolved request left in the session, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Reply {
        lang: Language,
        id: Uuid,
        content: String,
        usage: Option<Usage>,
    },
    Failed(Language),
    Dropped,
}

/// Applies the result of request `token` to the current chat session.
///
/// Results of requests that were superseded, or that arrive after the chat
/// left chat mode, are dropped.
pub async fn apply_result(
    dialogue: &BotDialogue,
    locks: &ChatLocks,
    token: Uuid,
    result: Result<Completion, CompletionError>,
) -> Result<Delivery, HandlerError> {
    let mut slot = locks.lock(dialogue.chat_id()).await;
    if slot.pending_request != Some(token) {
        log::info!("Dropping a superseded reply in {}", dialogue.chat_id());
        return Ok(Delivery::Dropped);
    }
    slot.pending_request = None;

    let Some(State::Chat { lang, mut session }) = dialogue.get().await? else {
        log::info!(
            "Chat {} left chat mode before the reply arrived, dropping it",
            dialogue.chat_id()
        );
        return Ok(Delivery::Dropped);
    };
    let delivery = match session.finish_send(result) {
        SendOutcome::Replied(id) => match session.message(id) {
            Some(message) => Delivery::Reply {
                lang,
                id,
                content: message.content.clone(),
                usage: session.usage(),
            },
            None => Delivery::Dropped,
        },
        SendOutcome::Failed => Delivery::Failed(lang),
        SendOutcome::Rejected(_) => Delivery::Dropped,
    };
    dialogue.update(State::Chat { lang, session }).await?;
    Ok(delivery)
}

async fn deliver_reply(
    bot: Bot,
    dialogue: BotDialogue,
    locks: &ChatLocks,
    token: Uuid,
    result: Result<Completion, CompletionError>,
) -> HandlerResult {
    let chat_id = dialogue.chat_id();
    match apply_result(&dialogue, locks, token, result).await? {
        Delivery::Reply {
            lang,
            id,
            content,
            usage,
        } => {
            let mut chunks = split_for_message(&content, MESSAGE_CHUNK);
            if let (Some(last), Some(usage)) = (chunks.last_mut(), usage) {
                last.push_str("\n\n");
                last.push_str(&usage_footer(lang, usage));
            }
            let count = chunks.len();
            for (i, chunk) in chunks.into_iter().enumerate() {
                let request = bot.send_message(chat_id, chunk);
                if i + 1 == count {
                    request.reply_markup(copy_keyboard(lang, id, false)).await?;
                } else {
                    request.await?;
                }
            }
        }
        Delivery::Failed(lang) => {
            bot.send_message(chat_id, lang.texts().chat_error).await?;
        }
        Delivery::Dropped => {}
    }
    Ok(())
}

/// Resends the message text so it can be copied from the client, and flags the
/// button as copied for a moment.
pub async fn copy_callback(
    bot: Bot,
    dialogue: BotDialogue,
    q: CallbackQuery,
    locks: Arc<ChatLocks>,
) -> HandlerResult {
    let Some(id) = q.data.as_deref().and_then(parse_copy_data) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    let copied = with_chat_session(&dialogue, &locks, |session, _| {
        session.copy(id, Utc::now())
    })
    .await?;
    let Some((lang, Some(content))) = copied else {
        log::debug!("Copy requested for unknown message {}", id);
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    bot.answer_callback_query(q.id)
        .text(lang.texts().chat_copied)
        .await?;
    bot.send_message(dialogue.chat_id(), content).await?;

    if let Some(message) = q.message {
        bot.edit_message_reply_markup(message.chat.id, message.id)
            .reply_markup(copy_keyboard(lang, id, true))
            .await?;
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(COPIED_MARKER_SECS as u64)).await;
            let restored = bot
                .edit_message_reply_markup(message.chat.id, message.id)
                .reply_markup(copy_keyboard(lang, id, false))
                .await;
            if let Err(err) = restored {
                log::warn!("Could not restore copy button: {}", err);
            }
        });
    }
    Ok(())
}

pub fn copy_keyboard(lang: Language, id: Uuid, copied: bool) -> InlineKeyboardMarkup {
    let texts = lang.texts();
    let label = if copied {
        format!("✅ {}", texts.chat_copied)
    } else {
        texts.chat_copy.to_string()
    };
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        label,
        format!("{COPY_PREFIX}{id}"),
    )]])
}

pub fn parse_copy_data(data: &str) -> Option<Uuid> {
    data.strip_prefix(COPY_PREFIX)
        .and_then(|id| Uuid::parse_str(id).ok())
}

pub fn usage_footer(lang: Language, usage: Usage) -> String {
    format!(
        "{}: {} ({} + {})",
        lang.texts().chat_usage,
        usage.total_tokens,
        usage.prompt_tokens,
        usage.completion_tokens
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use teloxide::dispatching::dialogue::{InMemStorage, Storage};
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    fn reply(content: &str) -> Result<Completion, CompletionError> {
        Ok(Completion {
            content: content.to_string(),
            usage: None,
        })
    }

    async fn chat_dialogue(session: ChatSession) -> BotDialogue {
        let dialogue = BotDialogue::new(InMemStorage::<State>::new().erase(), ChatId(42));
        dialogue
            .update(State::Chat {
                lang: Language::English,
                session,
            })
            .await
            .unwrap();
        dialogue
    }

    async fn stored_session(dialogue: &BotDialogue) -> ChatSession {
        match dialogue.get().await.unwrap() {
            Some(State::Chat { session, .. }) => session,
            other => panic!("unexpected state {other:?}"),
        }
    }

    /// One answered exchange plus a second question still awaiting its reply.
    async fn session_awaiting_reply(locks: &ChatLocks) -> (BotDialogue, Uuid, Uuid) {
        let mut session = ChatSession::new();
        session.begin_send("first", "rules").unwrap();
        let SendOutcome::Replied(first_reply) = session.finish_send(reply("first answer")) else {
            panic!("first exchange failed");
        };
        let dialogue = chat_dialogue(session).await;

        let started = with_chat_session(&dialogue, locks, |session, slot| {
            start_request(session, slot, "second", "rules")
        })
        .await
        .unwrap();
        let Some((_, Ok((token, _)))) = started else {
            panic!("second request did not start");
        };
        (dialogue, token, first_reply)
    }

    #[tokio::test]
    async fn reply_and_copy_do_not_lose_each_other() {
        let locks = Arc::new(ChatLocks::new());
        let (dialogue, token, first_reply) = session_awaiting_reply(&locks).await;

        // A copy handler that already holds the slot makes the reply wait.
        let copy_slot = locks.lock(dialogue.chat_id()).await;
        let reply_task = {
            let (dialogue, locks) = (dialogue.clone(), locks.clone());
            tokio::spawn(async move {
                apply_result(&dialogue, &locks, token, reply("second answer")).await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!reply_task.is_finished());
        assert!(stored_session(&dialogue).await.is_in_flight());
        drop(copy_slot);

        let copied = with_chat_session(&dialogue, &locks, |session, _| {
            session.copy(first_reply, Utc::now())
        });
        let (copied, delivered) = tokio::join!(copied, reply_task);
        assert_eq!(
            copied.unwrap(),
            Some((Language::English, Some("first answer".to_string())))
        );
        assert!(matches!(
            delivered.unwrap().unwrap(),
            Delivery::Reply { ref content, .. } if content == "second answer"
        ));

        let mut session = stored_session(&dialogue).await;
        assert_eq!(session.messages().len(), 4);
        assert!(!session.is_in_flight());
        assert!(session.begin_send("third", "rules").is_ok());
    }

    #[tokio::test]
    async fn clear_then_reply_resolves_in_flight() {
        let locks = ChatLocks::new();
        let (dialogue, token, _) = session_awaiting_reply(&locks).await;

        with_chat_session(&dialogue, &locks, |session, _| session.clear())
            .await
            .unwrap();
        apply_result(&dialogue, &locks, token, reply("late"))
            .await
            .unwrap();

        let session = stored_session(&dialogue).await;
        assert!(!session.is_in_flight());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, "late");
    }

    #[tokio::test]
    async fn superseded_reply_is_dropped() {
        let locks = ChatLocks::new();
        let (dialogue, token, _) = session_awaiting_reply(&locks).await;
        locks.lock(dialogue.chat_id()).await.pending_request = Some(Uuid::new_v4());

        let delivery = apply_result(&dialogue, &locks, token, reply("stale"))
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::Dropped);
        assert!(stored_session(&dialogue).await.is_in_flight());
    }

    #[tokio::test]
    async fn reply_after_leaving_chat_is_dropped() {
        let locks = ChatLocks::new();
        let (dialogue, token, _) = session_awaiting_reply(&locks).await;
        dialogue
            .update(State::Menu {
                lang: Language::English,
            })
            .await
            .unwrap();

        let delivery = apply_result(&dialogue, &locks, token, reply("late"))
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::Dropped);
        assert!(matches!(dialogue.get().await.unwrap(), Some(State::Menu { .. })));
        assert_eq!(locks.lock(dialogue.chat_id()).await.pending_request, None);
    }

    #[test]
    fn orphaned_in_flight_session_is_resolved() {
        let mut session = ChatSession::new();
        session.begin_send("asked before restart", "rules").unwrap();
        let mut slot = ChatSlot::default();

        let (token, request) = start_request(&mut session, &mut slot, "again", "rules").unwrap();
        assert_eq!(slot.pending_request, Some(token));
        assert_eq!(request.len(), 3);
        assert_eq!(session.messages().len(), 2);
        assert!(session.is_in_flight());
    }

    #[test]
    fn running_request_still_rejects() {
        let mut session = ChatSession::new();
        let mut slot = ChatSlot::default();
        start_request(&mut session, &mut slot, "first", "rules").unwrap();

        assert_eq!(
            start_request(&mut session, &mut slot, "second", "rules").map(|_| ()),
            Err(Rejection::InFlight)
        );
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn copy_data_round_trips() {
        let id = Uuid::new_v4();
        let markup = copy_keyboard(Language::English, id, false);
        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.text, "📋 Copy");
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => {
                assert_eq!(parse_copy_data(data), Some(id))
            }
            other => panic!("unexpected button kind {other:?}"),
        }
    }

    #[test]
    fn copied_button_changes_label() {
        let markup = copy_keyboard(Language::Vietnamese, Uuid::new_v4(), true);
        assert_eq!(markup.inline_keyboard[0][0].text, "✅ Đã sao chép");
    }

    #[test]
    fn malformed_copy_data_is_ignored() {
        assert_eq!(parse_copy_data("copy:not-a-uuid"), None);
        assert_eq!(parse_copy_data("paste:00000000-0000-0000-0000-000000000000"), None);
    }

    #[test]
    fn footer_lists_token_counts() {
        let usage = Usage {
            prompt_tokens: 120,
            completion_tokens: 30,
            total_tokens: 150,
        };
        assert_eq!(usage_footer(Language::English, usage), "Tokens: 150 (120 + 30)");
    }
}
