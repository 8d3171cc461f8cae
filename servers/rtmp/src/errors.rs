use std::io;

use rtmp_formats::{
    chunk::errors::ChunkMessageError, commands::errors::CommandMessageError,
    handshake::errors::HandshakeError, message::errors::MessageError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtmpServerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("handshake failed: {0}")]
    HandshakeFailed(#[from] HandshakeError),
    #[error("chunk message read failed: {0}")]
    ChunkMessageReadFailed(#[from] ChunkMessageError),
    #[error("message decode failed: {0}")]
    MessageDecodeFailed(#[from] MessageError),
    #[error("command encode failed: {0}")]
    CommandEncodeFailed(#[from] CommandMessageError),
    #[error("unknown tunnel session: {0}")]
    UnknownTunnelSession(String),
}

impl RtmpServerError {
    /// A clean peer disconnect, the expected way every session ends.
    pub fn is_stream_closed(&self) -> bool {
        match self {
            RtmpServerError::HandshakeFailed(err) => err.is_stream_closed(),
            RtmpServerError::ChunkMessageReadFailed(err) => err.is_stream_closed(),
            _ => false,
        }
    }
}

pub type RtmpServerResult<T> = Result<T, RtmpServerError>;
