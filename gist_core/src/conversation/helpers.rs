use super::dto::MessageEntry;

/// Renders messages as `sender: text` lines, the input format of the summarizer.
pub fn build_transcript(messages: &[MessageEntry]) -> String {
    messages.iter().fold(String::new(), |mut acc, m| {
        acc.push_str(&m.sender);
        acc.push_str(": ");
        acc.push_str(&m.text);
        acc.push('\n');
        acc
    })
}
