//! Command handlers for gist_bot.
use std::time::Duration;

use anyhow::Result;
use gist_core::helpers::bot_commands::Command;
use gist_core::recap::handler::RecapOutcome;
use gist_core::summarizer::formatter::RandomMarkers;
use rand::SeedableRng;
use rand::rngs::StdRng;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use teloxide::utils::command::BotCommands;
use tokio::time::sleep;

use crate::dependencies::BotDependencies;

const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

const REPLY_HINT: &str = "Please reply to a message with the /summarize command to get a brief summary of the messages sent after it.";
const NO_MESSAGES: &str = "No messages found to summarize. Most likely bot was just added to the chat.";
const GROUP_ONLY: &str = "This command can only be used in a group.";
const NOBODY_SEEN: &str = "Nobody has written here yet, so there is no one to ping.";
const PING_FAILED: &str = "Something went wrong while trying to ping users.";

/// Split a message into chunks that fit within Telegram's message limit.
///
/// Splits on line boundaries only, so every chunk keeps its HTML tags balanced
/// as long as no tag spans lines.
pub fn split_message(text: &str) -> Vec<String> {
    if text.len() <= TELEGRAM_MESSAGE_LIMIT {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current_chunk = String::new();

    for line in text.lines() {
        if current_chunk.len() + line.len() + 1 > TELEGRAM_MESSAGE_LIMIT && !current_chunk.is_empty() {
            chunks.push(current_chunk.trim().to_string());
            current_chunk.clear();
        }

        if line.len() > TELEGRAM_MESSAGE_LIMIT {
            // a single oversized line is cut at char boundaries
            let mut piece = String::new();
            for ch in line.chars() {
                if piece.len() + ch.len_utf8() > TELEGRAM_MESSAGE_LIMIT {
                    chunks.push(std::mem::take(&mut piece));
                }
                piece.push(ch);
            }
            current_chunk = piece;
            continue;
        }

        if !current_chunk.is_empty() {
            current_chunk.push('\n');
        }
        current_chunk.push_str(line);
    }

    if !current_chunk.trim().is_empty() {
        chunks.push(current_chunk.trim().to_string());
    }

    chunks
}

/// Send a potentially long HTML message, splitting it into multiple messages if necessary
async fn send_long_message(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    for (i, chunk) in split_message(text).iter().enumerate() {
        if i > 0 {
            // Small delay between messages to avoid rate limiting
            sleep(Duration::from_millis(100)).await;
        }

        bot.send_message(chat_id, chunk)
            .parse_mode(ParseMode::Html)
            .await?;
    }

    Ok(())
}

pub async fn handle_summarize(bot: Bot, msg: Message, bot_deps: BotDependencies) -> Result<()> {
    if msg.chat.is_private() {
        bot.send_message(msg.chat.id, GROUP_ONLY).await?;
        return Ok(());
    }

    let Some(anchor) = msg.reply_to_message() else {
        bot.send_message(msg.chat.id, REPLY_HINT).await?;
        return Ok(());
    };

    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;

    let mut markers = RandomMarkers::new(StdRng::from_entropy());
    match bot_deps
        .recap
        .summarize_since(msg.chat.id.0, anchor.id.0, &mut markers)
        .await
    {
        Ok(RecapOutcome::Summary(summary)) => {
            send_long_message(&bot, msg.chat.id, &summary).await?;
        }
        Ok(RecapOutcome::NoMessages) => {
            bot.send_message(msg.chat.id, NO_MESSAGES).await?;
        }
        Err(e) => {
            log::error!(
                "Error while trying to summarize chat {} after message {}: {}",
                msg.chat.id.0,
                anchor.id.0,
                e
            );
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
    }

    Ok(())
}

pub async fn handle_ping(bot: Bot, msg: Message, bot_deps: BotDependencies) -> Result<()> {
    if msg.chat.is_private() {
        bot.send_message(msg.chat.id, GROUP_ONLY).await?;
        return Ok(());
    }

    let mut markers = RandomMarkers::new(StdRng::from_entropy());
    match bot_deps.recap.mentions(msg.chat.id.0, &mut markers).await {
        Ok(Some(mentions)) => {
            send_long_message(&bot, msg.chat.id, &mentions).await?;
        }
        Ok(None) => {
            bot.send_message(msg.chat.id, NOBODY_SEEN).await?;
        }
        Err(e) => {
            log::error!("Error while trying to ping users in chat {}: {}", msg.chat.id.0, e);
            bot.send_message(msg.chat.id, PING_FAILED).await?;
        }
    }

    Ok(())
}

pub async fn handle_help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gist_core::summarizer::formatter::format_mentions;
    use std::collections::BTreeSet;

    #[test]
    fn test_short_message_is_single_chunk() {
        let chunks = split_message("<b>🔥Intro🔥</b>\n- Point A");
        assert_eq!(chunks, vec!["<b>🔥Intro🔥</b>\n- Point A".to_string()]);
    }

    #[test]
    fn test_long_message_splits_on_lines() {
        let line = format!("- {}", "a".repeat(98));
        let text = vec![line.as_str(); 100].join("\n");

        let chunks = split_message(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= TELEGRAM_MESSAGE_LIMIT);
            assert!(chunk.lines().all(|l| l == line));
        }
        let total: usize = chunks.iter().map(|c| c.lines().count()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_large_ping_splits_between_mentions() {
        let participants: BTreeSet<u64> = (0..120).map(|i| 5_000_000_000 + i).collect();
        let mut markers = RandomMarkers::new(StdRng::seed_from_u64(3));
        let mentions = format_mentions(&participants, &mut markers);

        let chunks = split_message(&mentions);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= TELEGRAM_MESSAGE_LIMIT);
            assert_eq!(chunk.matches("<a ").count(), chunk.matches("</a>").count());
            assert!(chunk.starts_with("<a href=\"tg://user?id="));
            assert!(chunk.ends_with("</a>"));
        }
        let total: usize = chunks.iter().map(|c| c.matches("</a>").count()).sum();
        assert_eq!(total, 120);
    }

    #[test]
    fn test_oversized_line_is_cut() {
        let text = "ж".repeat(3000);

        let chunks = split_message(&text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() <= TELEGRAM_MESSAGE_LIMIT));
        assert_eq!(chunks.concat(), text);
    }
}
