use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use crate::chunk::errors::ChunkMessageResult;

use super::ProtocolControlMessage;

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

    pub fn write(&mut self, message: &ProtocolControlMessage) -> ChunkMessageResult<()> {
        match message {
            ProtocolControlMessage::SetChunkSize(message) => {
                self.inner
                    .write_u32::<BigEndian>(message.chunk_size & 0x7FFF_FFFF)?;
            }
            ProtocolControlMessage::Abort(message) => {
                self.inner.write_u32::<BigEndian>(message.chunk_stream_id)?;
            }
            ProtocolControlMessage::Ack(message) => {
                self.inner.write_u32::<BigEndian>(message.sequence_number)?;
            }
            ProtocolControlMessage::WindowAckSize(message) => {
                self.inner.write_u32::<BigEndian>(message.size)?;
            }
            ProtocolControlMessage::SetPeerBandwidth(message) => {
                self.inner.write_u32::<BigEndian>(message.size)?;
                self.inner.write_u8(message.limit_type.into())?;
            }
        }
        Ok(())
    }
}
