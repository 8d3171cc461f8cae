use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use tokio_util::bytes::Bytes;

use crate::chunk::errors::ChunkMessageResult;

use super::UserControlEvent;

#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
}

impl<R> Reader<R>
where
    R: io::Read,
{
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read(&mut self) -> ChunkMessageResult<UserControlEvent> {
        let event_type = self.inner.read_u16::<BigEndian>()?;
        let event = match event_type {
            0 => UserControlEvent::StreamBegin {
                stream_id: self.inner.read_u32::<BigEndian>()?,
            },
            1 => UserControlEvent::StreamEof {
                stream_id: self.inner.read_u32::<BigEndian>()?,
            },
            2 => UserControlEvent::StreamDry {
                stream_id: self.inner.read_u32::<BigEndian>()?,
            },
            3 => UserControlEvent::SetBufferLength {
                stream_id: self.inner.read_u32::<BigEndian>()?,
                buffer_length: self.inner.read_u32::<BigEndian>()?,
            },
            4 => UserControlEvent::StreamIsRecorded {
                stream_id: self.inner.read_u32::<BigEndian>()?,
            },
            6 => UserControlEvent::PingRequest {
                timestamp: self.inner.read_u32::<BigEndian>()?,
            },
            7 => UserControlEvent::PingResponse {
                timestamp: self.inner.read_u32::<BigEndian>()?,
            },
            event_type => {
                let mut payload = Vec::new();
                self.inner.read_to_end(&mut payload)?;
                UserControlEvent::Unknown {
                    event_type,
                    payload: Bytes::from(payload),
                }
            }
        };
        Ok(event)
    }
}
