use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BitIoError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("stream closed by peer")]
    StreamClosed,
}

impl BitIoError {
    pub fn is_stream_closed(&self) -> bool {
        matches!(self, BitIoError::StreamClosed)
    }
}

pub type BitIoResult<T> = Result<T, BitIoError>;
