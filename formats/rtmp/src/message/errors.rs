use std::io;

use thiserror::Error;

use crate::{chunk::errors::ChunkMessageError, commands::errors::CommandMessageError};

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("control message decode failed: {0}")]
    Control(#[from] ChunkMessageError),
    #[error("amf command decode failed: {0}")]
    Command(#[from] CommandMessageError),
}

pub type MessageResult<T> = Result<T, MessageError>;
