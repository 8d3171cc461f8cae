use crate::{
    chunk::ChunkMessage,
    commands::CommandMessage,
    data::DataMessage,
    protocol_control::{ProtocolControlMessage, ProtocolControlMessageType},
    user_control::UserControlEvent,
};

use super::{AudioMessage, RtmpMessageBody, VideoMessage, errors::MessageResult};

/// Dispatches a reassembled message by its type id into a typed body.
pub fn read(message: &ChunkMessage) -> MessageResult<RtmpMessageBody> {
    let payload = &message.payload;
    let body = match message.message_type_id {
        0x01 | 0x02 | 0x03 | 0x05 | 0x06 => {
            // by construction every id here converts
            let message_type = ProtocolControlMessageType::try_from(message.message_type_id)?;
            RtmpMessageBody::ProtocolControl(ProtocolControlMessage::read_from(
                &payload[..],
                message_type,
            )?)
        }
        0x04 => RtmpMessageBody::UserControl(UserControlEvent::read_from(&payload[..])?),
        0x08 => RtmpMessageBody::Audio(AudioMessage {
            payload: payload.clone(),
        }),
        0x09 => RtmpMessageBody::Video(VideoMessage {
            payload: payload.clone(),
        }),
        0x12 => RtmpMessageBody::Data(DataMessage::read_from(&payload[..])?),
        0x14 => RtmpMessageBody::Command(CommandMessage::read_from(&payload[..])?),
        type_id => RtmpMessageBody::Unknown {
            type_id,
            payload: payload.clone(),
        },
    };
    Ok(body)
}
