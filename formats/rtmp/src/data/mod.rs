use std::io;

use amf_formats::Value;

use crate::commands::errors::CommandMessageResult;

pub mod reader;
pub mod writer;

/// Command name ffmpeg and friends wrap stream metadata in.
pub const SET_DATA_FRAME: &str = "@setDataFrame";

/// An AMF0 data message (message type 0x12).
#[derive(Debug, Clone)]
pub enum DataMessage {
    MetaData(MetaData),
    /// Data commands outside the supported set, kept by name for the
    /// handler to inspect.
    Unknown { command_name: String },
}

/// The `@setDataFrame` payload: an event name (usually "onMetaData") and
/// the stream properties the encoder announced.
#[derive(Debug, Clone)]
pub struct MetaData {
    pub event_name: String,
    pub entries: Vec<(String, Value)>,
}

impl DataMessage {
    pub fn read_from<R>(inner: R) -> CommandMessageResult<DataMessage>
    where
        R: io::Read,
    {
        reader::Reader::new(inner).read()
    }
}
