//! Main chat loop orchestration.
//!
//! Opens a view scope, asks the bot for its welcome message, then sends
//! each line through the store. A background task prints the bot's replies
//! as they are appended. Closing the loop cancels the scope, which drops any
//! reply still pending.

use std::io::Write;

use anyhow::Result;
use console::style;
use rustyline_async::SharedWriter;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use automazap_core::reply::START_CONVERSATION;
use automazap_core::store::BotStore;
use automazap_types::bot::{Bot, BotId, UpdateBotRequest};
use automazap_types::event::AppEvent;
use automazap_types::message::Message;
use automazap_types::user::UserId;

use crate::cli::notice::format_notice;
use crate::cli::resolve_bot;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

fn format_reply(bot_name: &str, message: &Message) -> String {
    format!(
        "  {} {}",
        style(format!("{bot_name} >")).cyan().bold(),
        message.content
    )
}

/// Whether `message` is a reply to this chat's user from this chat's bot.
fn is_reply_for(message: &Message, bot_id: &BotId, user_id: &UserId) -> bool {
    !message.is_user_message && &message.bot_id == bot_id && &message.user_id == user_id
}

/// What the printer shows for `event`, if anything.
fn render(event: &AppEvent, bot_name: &str, bot_id: &BotId, user_id: &UserId) -> Option<String> {
    match event {
        AppEvent::MessageAppended { message } if is_reply_for(message, bot_id, user_id) => {
            Some(format_reply(bot_name, message))
        }
        AppEvent::Notice(notice) => Some(format_notice(notice)),
        _ => None,
    }
}

/// Print replies and notices for this chat until `view` is cancelled. Events
/// already queued at cancellation are still printed.
fn spawn_reply_printer(
    mut rx: broadcast::Receiver<AppEvent>,
    mut out: SharedWriter,
    store: BotStore,
    bot: &Bot,
    user_id: UserId,
    view: CancellationToken,
) -> JoinHandle<()> {
    let bot_id = bot.id;
    let mut bot_name = bot.name.clone();
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = view.cancelled() => {
                    while let Ok(event) = rx.try_recv() {
                        if let Some(line) = render(&event, &bot_name, &bot_id, &user_id) {
                            let _ = writeln!(out, "{line}");
                        }
                    }
                    break;
                }
                event = rx.recv() => event,
            };
            match event {
                Ok(AppEvent::BotUpdated { bot_id: updated }) if updated == bot_id => {
                    if let Some(current) = store.get_bot(&bot_id).await {
                        bot_name = current.name;
                    }
                }
                Ok(event) => {
                    if let Some(line) = render(&event, &bot_name, &bot_id, &user_id) {
                        let _ = writeln!(out, "{line}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Reply printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Apply a settings change from the chat. Outcome notices arrive through
/// the printer.
async fn update_bot(state: &AppState, bot_id: &BotId, update: UpdateBotRequest) {
    state.store.update_bot(bot_id, update).await;
}

fn print_history(out: &mut impl Write, bot: &Bot, messages: &[Message]) -> std::io::Result<()> {
    writeln!(out)?;
    for message in messages.iter().filter(|m| m.content != START_CONVERSATION) {
        let who = if message.is_user_message {
            style("You".to_string()).green()
        } else {
            style(bot.name.clone()).cyan()
        };
        writeln!(
            out,
            "  {} {} {}",
            style(message.timestamp.format("%H:%M:%S")).dim(),
            who.bold(),
            message.content
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_stats(out: &mut impl Write, bot: &Bot) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {}  {} messages, {} users",
        style(&bot.name).cyan().bold(),
        bot.stats.messages,
        bot.stats.users
    )?;
    writeln!(out)?;
    Ok(())
}

/// Run the interactive chat loop with a bot.
pub async fn run_chat_loop(state: &AppState, bot: Option<&str>, user: &str) -> Result<()> {
    let bot = resolve_bot(state, bot).await?;
    let user_id = UserId::from(user);

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, mut out) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;
    print_welcome_banner(&mut out, &bot, user)?;

    let view = CancellationToken::new();
    let printer = spawn_reply_printer(
        state.events.subscribe(),
        out.clone(),
        state.store.clone(),
        &bot,
        user_id.clone(),
        view.clone(),
    );
    info!(bot_id = %bot.id, user_id = %user_id, "Chat opened");

    state
        .store
        .send_message_in(&view, &bot.id, START_CONVERSATION, &user_id)
        .await?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                writeln!(out, "\n  {}", style("Session ended.").dim())?;
                break;
            }
            InputEvent::Interrupted => {
                writeln!(out, "\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
            }
            InputEvent::Message(text) if text.is_empty() => {}
            InputEvent::Message(text) => {
                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(&mut out)?,
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => {
                            writeln!(out, "\n  {}", style("Session ended.").dim())?;
                            break;
                        }
                        ChatCommand::History => {
                            let current = state.store.get_bot(&bot.id).await.unwrap_or_else(|| bot.clone());
                            let messages = state.store.get_messages(&bot.id, Some(&user_id)).await;
                            print_history(&mut out, &current, &messages)?;
                        }
                        ChatCommand::Stats => match state.store.get_bot(&bot.id).await {
                            Some(current) => print_stats(&mut out, &current)?,
                            None => writeln!(out, "  {}", style("Bot não encontrado!").red())?,
                        },
                        ChatCommand::Toggle => {
                            state.store.toggle_bot_status(&bot.id).await;
                        }
                        ChatCommand::Rename(name) => {
                            let update = UpdateBotRequest {
                                name: Some(name),
                                ..Default::default()
                            };
                            update_bot(state, &bot.id, update).await;
                        }
                        ChatCommand::Welcome(welcome_message) => {
                            let update = UpdateBotRequest {
                                welcome_message: Some(welcome_message),
                                ..Default::default()
                            };
                            update_bot(state, &bot.id, update).await;
                        }
                        ChatCommand::Speed(speed) => {
                            let update = UpdateBotRequest {
                                response_time: Some(speed),
                                ..Default::default()
                            };
                            update_bot(state, &bot.id, update).await;
                        }
                        ChatCommand::Personality(personality) => {
                            let update = UpdateBotRequest {
                                personality: Some(personality),
                                ..Default::default()
                            };
                            update_bot(state, &bot.id, update).await;
                        }
                        ChatCommand::Delete => {
                            if state.store.delete_bot(&bot.id).await {
                                writeln!(out, "\n  {}", style("Session ended.").dim())?;
                                break;
                            }
                        }
                        ChatCommand::Usage(usage) => {
                            writeln!(
                                out,
                                "  {} Usage: {}",
                                style("?").yellow().bold(),
                                style(usage).cyan()
                            )?;
                        }
                        ChatCommand::Unknown(name) => {
                            writeln!(
                                out,
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            )?;
                        }
                    }
                    continue;
                }

                if let Err(e) = state.store.send_message_in(&view, &bot.id, &text, &user_id).await {
                    writeln!(out, "  {} {e}", style("✗").red().bold())?;
                }
            }
        }
    }

    view.cancel();
    let _ = printer.await;
    chat_input.flush();
    info!(bot_id = %bot.id, user_id = %user_id, "Chat closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use automazap_types::event::Notice;

    #[test]
    fn replies_are_matched_by_bot_and_user() {
        let bot = BotId::new();
        let user = UserId::from("u1");

        let reply = Message::new(bot, user.clone(), "oi".to_string(), false);
        assert!(is_reply_for(&reply, &bot, &user));

        let own = Message::new(bot, user.clone(), "oi".to_string(), true);
        assert!(!is_reply_for(&own, &bot, &user));

        let other_user = Message::new(bot, UserId::from("u2"), "oi".to_string(), false);
        assert!(!is_reply_for(&other_user, &bot, &user));
    }

    #[test]
    fn printer_shows_replies_and_notices_only() {
        let bot = BotId::new();
        let user = UserId::from("u1");

        let reply = AppEvent::MessageAppended {
            message: Message::new(bot, user.clone(), "olá".to_string(), false),
        };
        let line = render(&reply, "Luna", &bot, &user).unwrap();
        assert!(line.contains("Luna"));
        assert!(line.contains("olá"));

        let notice = AppEvent::Notice(Notice::success("Bot atualizado com sucesso!"));
        assert!(render(&notice, "Luna", &bot, &user).unwrap().contains("Bot atualizado"));

        let own = AppEvent::MessageAppended {
            message: Message::new(bot, user.clone(), "oi".to_string(), true),
        };
        assert!(render(&own, "Luna", &bot, &user).is_none());
        assert!(render(&AppEvent::BotUpdated { bot_id: bot }, "Luna", &bot, &user).is_none());
    }
}
