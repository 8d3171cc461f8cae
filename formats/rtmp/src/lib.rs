pub mod bitio;
pub mod chunk;
pub mod commands;
pub mod data;
pub mod handshake;
pub mod message;
pub mod protocol_control;
pub mod user_control;
