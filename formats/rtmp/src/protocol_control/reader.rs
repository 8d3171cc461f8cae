use std::io;

use byteorder::{BigEndian, ReadBytesExt};

use crate::chunk::errors::ChunkMessageResult;

use super::{
    AbortMessage, Acknowledgement, ProtocolControlMessage, ProtocolControlMessageType,
    SetChunkSize, SetPeerBandwidth, WindowAckSize,
};

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

    pub fn read(
        &mut self,
        message_type: ProtocolControlMessageType,
    ) -> ChunkMessageResult<ProtocolControlMessage> {
        match message_type {
            ProtocolControlMessageType::SetChunkSize => self.read_set_chunk_size(),
            ProtocolControlMessageType::Abort => self.read_abort(),
            ProtocolControlMessageType::Acknowledgement => self.read_acknowledgement(),
            ProtocolControlMessageType::WindowAckSize => self.read_window_ack_size(),
            ProtocolControlMessageType::SetPeerBandwidth => self.read_set_peer_bandwidth(),
        }
    }

    fn read_set_chunk_size(&mut self) -> ChunkMessageResult<ProtocolControlMessage> {
        let chunk_size = self.inner.read_u32::<BigEndian>()? & 0x7FFF_FFFF;
        Ok(ProtocolControlMessage::SetChunkSize(SetChunkSize {
            chunk_size,
        }))
    }

    fn read_abort(&mut self) -> ChunkMessageResult<ProtocolControlMessage> {
        let chunk_stream_id = self.inner.read_u32::<BigEndian>()?;
        Ok(ProtocolControlMessage::Abort(AbortMessage {
            chunk_stream_id,
        }))
    }

    fn read_acknowledgement(&mut self) -> ChunkMessageResult<ProtocolControlMessage> {
        let sequence_number = self.inner.read_u32::<BigEndian>()?;
        Ok(ProtocolControlMessage::Ack(Acknowledgement {
            sequence_number,
        }))
    }

    fn read_window_ack_size(&mut self) -> ChunkMessageResult<ProtocolControlMessage> {
        let size = self.inner.read_u32::<BigEndian>()?;
        Ok(ProtocolControlMessage::WindowAckSize(WindowAckSize { size }))
    }

    fn read_set_peer_bandwidth(&mut self) -> ChunkMessageResult<ProtocolControlMessage> {
        let size = self.inner.read_u32::<BigEndian>()?;
        let limit_type = self.inner.read_u8()?.try_into()?;
        Ok(ProtocolControlMessage::SetPeerBandwidth(SetPeerBandwidth {
            size,
            limit_type,
        }))
    }
}
