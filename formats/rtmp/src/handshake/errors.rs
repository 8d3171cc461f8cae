use std::io;

use thiserror::Error;

use crate::bitio::errors::BitIoError;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("bit stream read failed: {0}")]
    BitIo(#[from] BitIoError),
}

impl HandshakeError {
    pub fn is_stream_closed(&self) -> bool {
        matches!(self, HandshakeError::BitIo(err) if err.is_stream_closed())
    }
}

pub type HandshakeResult<T> = Result<T, HandshakeError>;
