use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlvError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type FlvResult<T> = Result<T, FlvError>;
