use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use crate::chunk::errors::ChunkMessageResult;

use super::{UserControlEvent, UserControlEventType};

#[derive(Debug)]
pub struct Writer<W> {
    inner: W,
}

impl<W> Writer<W>
where
    W: io::Write,
{
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write(&mut self, event: &UserControlEvent) -> ChunkMessageResult<()> {
        match event {
            UserControlEvent::StreamBegin { stream_id } => {
                self.write_stream_id_event(UserControlEventType::StreamBegin, *stream_id)?;
            }
            UserControlEvent::StreamEof { stream_id } => {
                self.write_stream_id_event(UserControlEventType::StreamEof, *stream_id)?;
            }
            UserControlEvent::StreamDry { stream_id } => {
                self.write_stream_id_event(UserControlEventType::StreamDry, *stream_id)?;
            }
            UserControlEvent::SetBufferLength {
                stream_id,
                buffer_length,
            } => {
                self.inner
                    .write_u16::<BigEndian>(UserControlEventType::SetBufferLength.into())?;
                self.inner.write_u32::<BigEndian>(*stream_id)?;
                self.inner.write_u32::<BigEndian>(*buffer_length)?;
            }
            UserControlEvent::StreamIsRecorded { stream_id } => {
                self.write_stream_id_event(UserControlEventType::StreamIsRecorded, *stream_id)?;
            }
            UserControlEvent::PingRequest { timestamp } => {
                self.write_stream_id_event(UserControlEventType::PingRequest, *timestamp)?;
            }
            UserControlEvent::PingResponse { timestamp } => {
                self.write_stream_id_event(UserControlEventType::PingResponse, *timestamp)?;
            }
            UserControlEvent::Unknown {
                event_type,
                payload,
            } => {
                self.inner.write_u16::<BigEndian>(*event_type)?;
                self.inner.write_all(payload)?;
            }
        }
        Ok(())
    }

    fn write_stream_id_event(
        &mut self,
        event_type: UserControlEventType,
        value: u32,
    ) -> ChunkMessageResult<()> {
        self.inner.write_u16::<BigEndian>(event_type.into())?;
        self.inner.write_u32::<BigEndian>(value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::user_control::UserControlEvent;

    #[test]
    fn stream_begin_encoding() {
        let mut buf = Vec::new();
        UserControlEvent::StreamBegin { stream_id: 1 }
            .write_to(&mut buf)
            .unwrap();
        assert_eq!(buf, [0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn round_trips() {
        for event in [
            UserControlEvent::StreamBegin { stream_id: 0 },
            UserControlEvent::StreamEof { stream_id: 1 },
            UserControlEvent::StreamDry { stream_id: 2 },
            UserControlEvent::SetBufferLength {
                stream_id: 1,
                buffer_length: 3000,
            },
            UserControlEvent::StreamIsRecorded { stream_id: 1 },
            UserControlEvent::PingRequest { timestamp: 99 },
            UserControlEvent::PingResponse { timestamp: 99 },
        ] {
            let mut buf = Vec::new();
            event.write_to(&mut buf).unwrap();
            assert_eq!(UserControlEvent::read_from(&buf[..]).unwrap(), event);
        }
    }

    #[test]
    fn unknown_event_passes_through() {
        let buf = [0x00, 0x20, 0xDE, 0xAD];
        let event = UserControlEvent::read_from(&buf[..]).unwrap();
        assert!(matches!(
            event,
            UserControlEvent::Unknown { event_type: 0x20, .. }
        ));
    }
}
