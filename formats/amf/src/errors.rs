use std::{io, string};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmfReadError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid utf8 data: {0}")]
    InvalidUtf8(#[from] string::FromUtf8Error),
    #[error("unsupported amf value marker: {marker}")]
    Unsupported { marker: u8 },
    #[error("malformed object property terminator, marker: {marker}")]
    UnexpectedPropertyEnd { marker: u8 },
}

pub type AmfReadResult<T> = Result<T, AmfReadError>;

#[derive(Error, Debug)]
pub enum AmfWriteError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("string too long for a short string: {length}")]
    StringTooLong { length: usize },
}

pub type AmfWriteResult<T> = Result<T, AmfWriteError>;
