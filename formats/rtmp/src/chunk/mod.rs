use tokio_util::bytes::Bytes;

pub mod consts;
pub mod errors;
pub mod reader;
pub mod writer;

pub type Csid = u32;

///! @see: 5.3.1. Chunk Format
/// +--------------+----------------+--------------------+--------------+
/// | Basic Header | Message Header | Extended Timestamp |  Chunk Data  |
/// +--------------+----------------+--------------------+--------------+
/// |                                                    |
/// |<------------------- Chunk Header ----------------->|
///                             Chunk Format
///
/// One chunk as it crossed the wire, header compression already resolved
/// against the previous chunk of the same chunk stream.
#[derive(Debug, Clone)]
pub struct RawChunk {
    /// 2-bit header compression level, 0 absolute through 3 fully inherited
    pub fmt: u8,
    pub csid: Csid,
    /// resolved absolute timestamp
    pub timestamp: u32,
    /// total length of the logical message this chunk belongs to
    pub message_length: u32,
    pub message_type_id: u8,
    pub message_stream_id: u32,
    pub payload: Bytes,
    /// 0-based fragment index within the message
    pub sequence: u32,
    /// this chunk completes its message
    pub is_eof: bool,
}

/// One logical RTMP message, reassembled from one or more chunks.
#[derive(Debug, Clone)]
pub struct ChunkMessage {
    pub csid: Csid,
    pub timestamp: u32,
    pub message_length: u32,
    pub message_type_id: u8,
    pub message_stream_id: u32,
    pub payload: Bytes,
}

impl ChunkMessage {
    pub fn new(
        csid: Csid,
        timestamp: u32,
        message_type_id: u8,
        message_stream_id: u32,
        payload: Bytes,
    ) -> Self {
        Self {
            csid,
            timestamp,
            message_length: payload.len() as u32,
            message_type_id,
            message_stream_id,
            payload,
        }
    }
}
