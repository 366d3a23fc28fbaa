use anyhow::Result;
use gist_core::helpers::bot_commands::Command;
use teloxide::{
    dispatching::{DpHandlerDescription, HandlerExt, UpdateFilterExt},
    dptree::{self, Handler},
    types::{Message, Update},
};

use crate::{
    bot::answers::answers, dependencies::BotDependencies,
    message_history::handler::record_message,
};

async fn record(msg: Message, edited: bool, bot_deps: BotDependencies) -> Result<()> {
    // A failed write must not take the dispatcher down with it.
    if let Err(e) = record_message(&msg, edited, &bot_deps.store).await {
        log::error!(
            "Failed to record message {} in chat {}: {}",
            msg.id.0,
            msg.chat.id.0,
            e
        );
    }
    Ok(())
}

fn is_plain_text(msg: &Message) -> bool {
    msg.text().is_some_and(|text| !text.starts_with('/'))
}

pub fn handler_tree() -> Handler<'static, Result<()>, DpHandlerDescription> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(answers),
                )
                .branch(
                    // Plain group texts go to the history, commands never do
                    dptree::filter(|msg: Message| is_plain_text(&msg)).endpoint(
                        |msg: Message, bot_deps: BotDependencies| async move {
                            record(msg, false, bot_deps).await
                        },
                    ),
                ),
        )
        .branch(
            Update::filter_edited_message()
                .filter(|msg: Message| is_plain_text(&msg))
                .endpoint(|msg: Message, bot_deps: BotDependencies| async move {
                    record(msg, true, bot_deps).await
                }),
        )
}
