use std::io;

use amf_formats::errors::{AmfReadError, AmfWriteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandMessageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("amf decode failed: {0}")]
    AmfRead(#[from] AmfReadError),
    #[error("amf encode failed: {0}")]
    AmfWrite(#[from] AmfWriteError),
    #[error("unexpected amf argument: {0}")]
    UnexpectedAmfType(String),
}

pub type CommandMessageResult<T> = Result<T, CommandMessageError>;
