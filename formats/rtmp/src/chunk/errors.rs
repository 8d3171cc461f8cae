use std::io;

use thiserror::Error;

use crate::bitio::errors::BitIoError;

use super::Csid;

#[derive(Debug, Error)]
pub enum ChunkMessageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("bit stream read failed: {0}")]
    BitIo(#[from] BitIoError),
    #[error("invalid chunk stream id: {0}")]
    InvalidCsid(Csid),
    #[error("chunk with fmt {fmt} arrived on csid {csid} before any type 0 chunk")]
    NeedContext { csid: Csid, fmt: u8 },
    #[error("chunk payload overflows message length: {received} > {expected}")]
    PayloadOverflow { received: usize, expected: usize },
    #[error("unknown message type: {0}")]
    UnknownMessageType(u8),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ChunkMessageError {
    pub fn is_stream_closed(&self) -> bool {
        matches!(self, ChunkMessageError::BitIo(err) if err.is_stream_closed())
    }
}

pub type ChunkMessageResult<T> = Result<T, ChunkMessageError>;
