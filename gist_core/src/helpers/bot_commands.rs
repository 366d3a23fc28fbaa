use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Reply to a message to summarize everything sent after it.")]
    Summarize,
    #[command(description = "Mention everyone who has written in this chat.")]
    Ping,
    #[command(description = "Display this text.")]
    Help,
}
