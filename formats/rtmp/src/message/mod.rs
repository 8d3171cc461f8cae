use tokio_util::bytes::Bytes;

use crate::{
    chunk::{ChunkMessage, Csid},
    commands::CommandMessage,
    data::DataMessage,
    protocol_control::ProtocolControlMessage,
    user_control::{UserControlEvent, consts::USER_CONTROL_MESSAGE_TYPE},
};

pub mod errors;
pub mod reader;
pub mod writer;

use errors::MessageResult;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmpMessageType {
    SetChunkSize = 1,
    Abort = 2,
    Acknowledgement = 3,
    UserControl = 4,
    WindowAckSize = 5,
    SetPeerBandwidth = 6,
    Audio = 8,
    Video = 9,
    Amf0Data = 18,
    Amf0Command = 20,
}

impl From<RtmpMessageType> for u8 {
    fn from(value: RtmpMessageType) -> Self {
        value as u8
    }
}

#[derive(Debug, Clone)]
pub struct AudioMessage {
    pub payload: Bytes,
}

impl AudioMessage {
    /// The leading codec-control byte: sound format, rate, size, channels.
    pub fn codec_control(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    pub fn body(&self) -> &[u8] {
        if self.payload.is_empty() {
            &[]
        } else {
            &self.payload[1..]
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoMessage {
    pub payload: Bytes,
}

/// One decoded RTMP message, the dispatch result of a reassembled
/// [`ChunkMessage`]'s type id.
#[derive(Debug, Clone)]
pub enum RtmpMessageBody {
    ProtocolControl(ProtocolControlMessage),
    UserControl(UserControlEvent),
    Command(CommandMessage),
    Data(DataMessage),
    Audio(AudioMessage),
    Video(VideoMessage),
    /// Message type ids outside the supported set, the handler decides.
    Unknown { type_id: u8, payload: Bytes },
}

impl RtmpMessageBody {
    pub fn read_from(message: &ChunkMessage) -> MessageResult<RtmpMessageBody> {
        reader::read(message)
    }

    pub fn message_type_id(&self) -> u8 {
        match self {
            RtmpMessageBody::ProtocolControl(message) => message.message_type().into(),
            RtmpMessageBody::UserControl(_) => USER_CONTROL_MESSAGE_TYPE,
            RtmpMessageBody::Command(_) => RtmpMessageType::Amf0Command.into(),
            RtmpMessageBody::Data(_) => RtmpMessageType::Amf0Data.into(),
            RtmpMessageBody::Audio(_) => RtmpMessageType::Audio.into(),
            RtmpMessageBody::Video(_) => RtmpMessageType::Video.into(),
            RtmpMessageBody::Unknown { type_id, .. } => *type_id,
        }
    }

    /// Serializes the body and wraps it into a [`ChunkMessage`] ready for
    /// the chunk writer.
    pub fn to_chunk_message(
        &self,
        csid: Csid,
        timestamp: u32,
        message_stream_id: u32,
    ) -> MessageResult<ChunkMessage> {
        let mut payload = Vec::new();
        self.write_to(&mut payload)?;
        Ok(ChunkMessage::new(
            csid,
            timestamp,
            self.message_type_id(),
            message_stream_id,
            Bytes::from(payload),
        ))
    }
}
