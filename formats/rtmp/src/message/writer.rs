use std::io;

use crate::commands;

use super::{RtmpMessageBody, errors::MessageResult};

impl RtmpMessageBody {
    /// Serializes the body into message payload bytes, chunk framing is the
    /// chunk writer's job.
    pub fn write_to<W>(&self, mut writer: W) -> MessageResult<()>
    where
        W: io::Write,
    {
        match self {
            RtmpMessageBody::ProtocolControl(message) => message.write_to(&mut writer)?,
            RtmpMessageBody::UserControl(event) => event.write_to(&mut writer)?,
            RtmpMessageBody::Command(command) => {
                commands::writer::Writer::new(&mut writer).write(command)?
            }
            RtmpMessageBody::Data(data) => data.write_to(&mut writer)?,
            RtmpMessageBody::Audio(message) => writer.write_all(&message.payload)?,
            RtmpMessageBody::Video(message) => writer.write_all(&message.payload)?,
            RtmpMessageBody::Unknown { payload, .. } => writer.write_all(payload)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::bytes::Bytes;

    use crate::{
        chunk::ChunkMessage,
        message::{RtmpMessageBody, RtmpMessageType},
        protocol_control::{ProtocolControlMessage, SetChunkSize},
        user_control::UserControlEvent,
    };

    #[test]
    fn control_body_round_trip() {
        let body = RtmpMessageBody::ProtocolControl(ProtocolControlMessage::SetChunkSize(
            SetChunkSize { chunk_size: 4096 },
        ));
        let message = body.to_chunk_message(2, 0, 0).unwrap();
        assert_eq!(message.message_type_id, 0x01);
        assert_eq!(message.message_length, 4);

        let decoded = RtmpMessageBody::read_from(&message).unwrap();
        assert!(matches!(
            decoded,
            RtmpMessageBody::ProtocolControl(ProtocolControlMessage::SetChunkSize(SetChunkSize {
                chunk_size: 4096
            }))
        ));
    }

    #[test]
    fn user_control_dispatch() {
        let body = RtmpMessageBody::UserControl(UserControlEvent::StreamBegin { stream_id: 1 });
        let message = body.to_chunk_message(2, 0, 0).unwrap();
        assert_eq!(message.message_type_id, 0x04);

        let decoded = RtmpMessageBody::read_from(&message).unwrap();
        assert!(matches!(
            decoded,
            RtmpMessageBody::UserControl(UserControlEvent::StreamBegin { stream_id: 1 })
        ));
    }

    #[test]
    fn media_passes_through() {
        let message = ChunkMessage::new(
            6,
            40,
            RtmpMessageType::Video.into(),
            1,
            Bytes::from_static(b"\x17keyframe"),
        );
        match RtmpMessageBody::read_from(&message).unwrap() {
            RtmpMessageBody::Video(video) => assert_eq!(&video.payload[..], b"\x17keyframe"),
            other => panic!("expect video, got {:?}", other),
        }
    }

    #[test]
    fn audio_codec_control_byte() {
        let message = ChunkMessage::new(
            4,
            0,
            RtmpMessageType::Audio.into(),
            1,
            Bytes::from_static(&[0xAF, 0x01, 0x02]),
        );
        match RtmpMessageBody::read_from(&message).unwrap() {
            RtmpMessageBody::Audio(audio) => {
                assert_eq!(audio.codec_control(), Some(0xAF));
                assert_eq!(audio.body(), &[0x01, 0x02]);
            }
            other => panic!("expect audio, got {:?}", other),
        }
    }

    #[test]
    fn unknown_type_id_is_preserved() {
        let message = ChunkMessage::new(3, 0, 0x11, 0, Bytes::from_static(b"amf3"));
        match RtmpMessageBody::read_from(&message).unwrap() {
            RtmpMessageBody::Unknown { type_id, payload } => {
                assert_eq!(type_id, 0x11);
                assert_eq!(&payload[..], b"amf3");
            }
            other => panic!("expect unknown, got {:?}", other),
        }
    }
}
