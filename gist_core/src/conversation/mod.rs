pub mod backend;
pub mod dto;
pub mod helpers;
pub mod storage;
