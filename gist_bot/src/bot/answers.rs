use anyhow::Result;
use gist_core::helpers::bot_commands::Command;
use teloxide::{Bot, types::Message};

use super::handler::{handle_help, handle_ping, handle_summarize};
use crate::dependencies::BotDependencies;

pub async fn answers(
    bot: Bot,
    msg: Message,
    cmd: Command,
    bot_deps: BotDependencies,
) -> Result<()> {
    match cmd {
        Command::Summarize => handle_summarize(bot, msg, bot_deps).await?,
        Command::Ping => handle_ping(bot, msg, bot_deps).await?,
        Command::Help => handle_help(bot, msg).await?,
    };
    Ok(())
}
