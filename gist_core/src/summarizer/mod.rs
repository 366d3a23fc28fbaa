pub mod dto;
pub mod formatter;
pub mod handler;
pub mod transport;
