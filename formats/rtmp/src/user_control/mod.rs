use std::io;

use tokio_util::bytes::Bytes;

use crate::chunk::errors::ChunkMessageResult;

pub mod consts;
pub mod reader;
pub mod writer;

///! @see: 7.1.7. User Control Message Events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserControlEvent {
    StreamBegin {
        stream_id: u32,
    },
    StreamEof {
        stream_id: u32,
    },
    StreamDry {
        stream_id: u32,
    },
    SetBufferLength {
        stream_id: u32,
        // buffer length in milliseconds
        buffer_length: u32,
    },
    StreamIsRecorded {
        stream_id: u32,
    },
    PingRequest {
        timestamp: u32,
    },
    PingResponse {
        timestamp: u32,
    },
    /// Events outside the supported set pass through untouched, the handler
    /// decides what to make of them.
    Unknown {
        event_type: u16,
        payload: Bytes,
    },
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserControlEventType {
    StreamBegin = 0,
    StreamEof = 1,
    StreamDry = 2,
    SetBufferLength = 3,
    StreamIsRecorded = 4,
    PingRequest = 6,
    PingResponse = 7,
}

impl From<UserControlEventType> for u16 {
    fn from(value: UserControlEventType) -> Self {
        value as u16
    }
}

impl UserControlEvent {
    pub fn read_from<R>(inner: R) -> ChunkMessageResult<UserControlEvent>
    where
        R: io::Read,
    {
        reader::Reader::new(inner).read()
    }

    pub fn write_to<W>(&self, inner: W) -> ChunkMessageResult<()>
    where
        W: io::Write,
    {
        writer::Writer::new(inner).write(self)
    }
}
