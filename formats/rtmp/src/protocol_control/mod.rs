use std::io;

use crate::chunk::errors::{ChunkMessageError, ChunkMessageResult};

pub mod consts;
pub mod reader;
pub mod writer;

///! @see: 5.4.1. Set Chunk Size (1)
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |0|                     chunk size (31 bits)                    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///         Payload for the "Set Chunk Size" protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetChunkSize {
    pub chunk_size: u32, // 31 bits
}

///! @see: 5.4.2. Abort Message (2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortMessage {
    pub chunk_stream_id: u32,
}

///! @see: 5.4.3. Acknowledgement (3)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub sequence_number: u32,
}

///! @see: 5.4.4. Window Acknowledgement Size (5)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowAckSize {
    pub size: u32,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPeerBandwidthLimitType {
    // The peer SHOULD limit its output bandwidth to the indicated window size.
    Hard = 0,
    // The peer SHOULD limit its output bandwidth to this window
    // or the limit already in effect, whichever is smaller.
    Soft = 1,
    // If the previous limit type was Hard, treat this message as Hard,
    // otherwise ignore it.
    Dynamic = 2,
}

impl From<SetPeerBandwidthLimitType> for u8 {
    fn from(value: SetPeerBandwidthLimitType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for SetPeerBandwidthLimitType {
    type Error = ChunkMessageError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SetPeerBandwidthLimitType::Hard),
            1 => Ok(SetPeerBandwidthLimitType::Soft),
            2 => Ok(SetPeerBandwidthLimitType::Dynamic),
            _ => Err(ChunkMessageError::InvalidMessage(format!(
                "invalid set peer bandwidth message, the limit type is unknown: {}",
                value
            ))),
        }
    }
}

///! @see: 5.4.5. Set Peer Bandwidth (6)
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  Acknowledgement Window size                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Limit Type   |
/// +-+-+-+-+-+-+-+-+
///       Payload for the "Set Peer Bandwidth" protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPeerBandwidth {
    pub size: u32,
    pub limit_type: SetPeerBandwidthLimitType,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolControlMessageType {
    SetChunkSize = 1,
    Abort = 2,
    Acknowledgement = 3,
    WindowAckSize = 5,
    SetPeerBandwidth = 6,
}

impl From<ProtocolControlMessageType> for u8 {
    fn from(value: ProtocolControlMessageType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for ProtocolControlMessageType {
    type Error = ChunkMessageError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ProtocolControlMessageType::SetChunkSize),
            2 => Ok(ProtocolControlMessageType::Abort),
            3 => Ok(ProtocolControlMessageType::Acknowledgement),
            5 => Ok(ProtocolControlMessageType::WindowAckSize),
            6 => Ok(ProtocolControlMessageType::SetPeerBandwidth),
            _ => Err(ChunkMessageError::UnknownMessageType(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolControlMessage {
    SetChunkSize(SetChunkSize),
    Abort(AbortMessage),
    Ack(Acknowledgement),
    WindowAckSize(WindowAckSize),
    SetPeerBandwidth(SetPeerBandwidth),
}

impl ProtocolControlMessage {
    pub fn message_type(&self) -> ProtocolControlMessageType {
        match self {
            ProtocolControlMessage::SetChunkSize(_) => ProtocolControlMessageType::SetChunkSize,
            ProtocolControlMessage::Abort(_) => ProtocolControlMessageType::Abort,
            ProtocolControlMessage::Ack(_) => ProtocolControlMessageType::Acknowledgement,
            ProtocolControlMessage::WindowAckSize(_) => ProtocolControlMessageType::WindowAckSize,
            ProtocolControlMessage::SetPeerBandwidth(_) => {
                ProtocolControlMessageType::SetPeerBandwidth
            }
        }
    }

    pub fn read_from<R>(
        inner: R,
        message_type: ProtocolControlMessageType,
    ) -> ChunkMessageResult<ProtocolControlMessage>
    where
        R: io::Read,
    {
        reader::Reader::new(inner).read(message_type)
    }

    pub fn write_to<W>(&self, inner: W) -> ChunkMessageResult<()>
    where
        W: io::Write,
    {
        writer::Writer::new(inner).write(self)
    }
}
