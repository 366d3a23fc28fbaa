pub mod conversation;
pub mod error;
pub mod helpers;
pub mod recap;
pub mod summarizer;
