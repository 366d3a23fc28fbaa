use rand::Rng;
use rand::seq::SliceRandom;
use teloxide::utils::html::escape;

use super::dto::Chapter;

pub const SUMMARY_TAG: &str = "<tg-spoiler>#summary</tg-spoiler>";

/// Emoji that Telegram accepts as message reactions.
pub const REACTION_EMOJIS: &[&str] = &[
    "👍", "👎", "❤", "🔥", "🥰", "👏", "😁", "🤔", "🤯", "😱", "🤬", "😢", "🎉", "🤩", "🤮",
    "💩", "🙏", "👌", "🕊", "🤡", "🥱", "🥴", "😍", "🐳", "❤‍🔥", "🌚", "🌭", "💯", "🤣",
    "⚡", "🍌", "🏆", "💔", "🤨", "😐", "🍓", "🍾", "💋", "🖕", "😈", "😴", "😭", "🤓",
    "👻", "👨‍💻", "👀", "🎃", "🙈", "😇", "😨", "🤝", "✍", "🤗", "🫡", "🎅", "🎄", "☃",
    "💅", "🤪", "🗿", "🆒", "💘", "🙉", "🦄", "😘", "💊", "🙊", "😎", "👾", "🤷‍♂", "🤷",
    "🤷‍♀", "😡",
];

/// Supplies the decoration placed around each chapter title.
pub trait MarkerSource {
    fn next_marker(&mut self) -> String;
}

/// Picks a reaction emoji at random for every call.
pub struct RandomMarkers<R> {
    rng: R,
}

impl<R: Rng> RandomMarkers<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> MarkerSource for RandomMarkers<R> {
    fn next_marker(&mut self) -> String {
        REACTION_EMOJIS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or("🔥")
            .to_string()
    }
}

/// Renders chapters as Telegram HTML.
pub fn format_chapters(chapters: &[Chapter], markers: &mut dyn MarkerSource) -> String {
    let mut text = String::new();

    for chapter in chapters {
        let marker = markers.next_marker();
        text.push_str(&format!("<b>{marker}{}{marker}</b>\n", escape(&chapter.content)));
        for thesis in &chapter.theses {
            text.push_str(&format!("- {}\n", escape(&thesis.content)));
        }
        text.push('\n');
    }

    text.push_str(SUMMARY_TAG);
    text
}

/// One `tg://user` link per participant, each labelled with its own emoji.
/// Links go on separate lines so long lists split cleanly between them.
pub fn format_mentions<'a, I>(participants: I, markers: &mut dyn MarkerSource) -> String
where
    I: IntoIterator<Item = &'a u64>,
{
    participants
        .into_iter()
        .map(|user_id| {
            format!(
                "<a href=\"tg://user?id={}\">{}</a>",
                user_id,
                markers.next_marker()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
