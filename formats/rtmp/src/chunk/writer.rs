use std::cmp::min;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{
    ChunkMessage, Csid,
    consts::{DEFAULT_CHUNK_SIZE, MAX_CSID, MAX_TIMESTAMP, MIN_CSID},
    errors::{ChunkMessageError, ChunkMessageResult},
};

#[derive(Debug, Clone)]
struct PreviousChunk {
    csid: Csid,
    timestamp: u32,
    message_length: u32,
    message_type_id: u8,
    message_stream_id: u32,
}

/// Outbound side of the chunk stream. Messages are serialized into an
/// internal buffer; `flush_to` is the drain point that makes them observable
/// on the wire.
#[derive(Debug)]
pub struct Writer {
    buffer: Vec<u8>,
    previous: Option<PreviousChunk>,
    chunk_size: usize,
    bytes_written: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            previous: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            bytes_written: 0,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Raises the outbound split size. The caller still has to announce the
    /// change with a SetChunkSize message, written before this takes effect.
    pub fn set_chunk_size(&mut self, size: usize) -> usize {
        let old_size = self.chunk_size;
        self.chunk_size = size;
        old_size
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Bytes serialized but not yet drained.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Serializes one logical message as a header-compressed chunk sequence:
    /// the first fragment carries the selected header type, every further
    /// fragment is a type 3 continuation with the basic header repeated.
    pub fn write_message(&mut self, message: &ChunkMessage) -> ChunkMessageResult<()> {
        let start = self.buffer.len();
        let fmt = self.select_fmt(message);
        let extended = self.write_first_header(fmt, message)?;

        let payload = &message.payload;
        let mut offset = min(self.chunk_size, payload.len());
        self.buffer.extend_from_slice(&payload[..offset]);

        while offset < payload.len() {
            self.write_basic_header(3, message.csid)?;
            if extended {
                WriteBytesExt::write_u32::<BigEndian>(&mut self.buffer, message.timestamp)?;
            }
            let end = min(offset + self.chunk_size, payload.len());
            self.buffer.extend_from_slice(&payload[offset..end]);
            offset = end;
        }

        self.previous = Some(PreviousChunk {
            csid: message.csid,
            timestamp: message.timestamp,
            message_length: message.message_length,
            message_type_id: message.message_type_id,
            message_stream_id: message.message_stream_id,
        });
        self.bytes_written += self.buffer.len() - start;
        Ok(())
    }

    /// Drains the buffer into the socket. Resets the header compression
    /// context so the first message after a drain is self-describing.
    pub async fn flush_to<W>(&mut self, writer: &mut W) -> ChunkMessageResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.buffer).await?;
        writer.flush().await?;
        self.buffer.clear();
        self.previous = None;
        Ok(())
    }

    fn select_fmt(&self, message: &ChunkMessage) -> u8 {
        match &self.previous {
            None => 0,
            // the first chunk on a chunk stream has no context to compress
            // against, it must be self-describing
            Some(previous) if previous.csid != message.csid => 0,
            Some(previous) if previous.message_stream_id == message.message_stream_id => {
                if previous.message_length == message.message_length
                    && previous.message_type_id == message.message_type_id
                {
                    2
                } else {
                    1
                }
            }
            Some(_) => 0,
        }
    }

    /// Returns whether the extended timestamp field is in play, continuation
    /// chunks must then repeat it.
    fn write_first_header(&mut self, fmt: u8, message: &ChunkMessage) -> ChunkMessageResult<bool> {
        self.write_basic_header(fmt, message.csid)?;
        match fmt {
            0 => {
                let extended = message.timestamp >= MAX_TIMESTAMP;
                self.buffer
                    .write_u24::<BigEndian>(message.timestamp.min(MAX_TIMESTAMP))?;
                self.buffer.write_u24::<BigEndian>(message.message_length)?;
                WriteBytesExt::write_u8(&mut self.buffer, message.message_type_id)?;
                WriteBytesExt::write_u32::<LittleEndian>(
                    &mut self.buffer,
                    message.message_stream_id,
                )?;
                if extended {
                    WriteBytesExt::write_u32::<BigEndian>(&mut self.buffer, message.timestamp)?;
                }
                Ok(extended)
            }
            1 => {
                let delta = self.previous_delta(message);
                let extended = delta >= MAX_TIMESTAMP;
                self.buffer.write_u24::<BigEndian>(delta.min(MAX_TIMESTAMP))?;
                self.buffer.write_u24::<BigEndian>(message.message_length)?;
                WriteBytesExt::write_u8(&mut self.buffer, message.message_type_id)?;
                if extended {
                    WriteBytesExt::write_u32::<BigEndian>(&mut self.buffer, delta)?;
                }
                Ok(extended)
            }
            2 => {
                let delta = self.previous_delta(message);
                let extended = delta >= MAX_TIMESTAMP;
                self.buffer.write_u24::<BigEndian>(delta.min(MAX_TIMESTAMP))?;
                if extended {
                    WriteBytesExt::write_u32::<BigEndian>(&mut self.buffer, delta)?;
                }
                Ok(extended)
            }
            fmt => Err(ChunkMessageError::InvalidMessage(format!(
                "unexpected outbound fmt: {}",
                fmt
            ))),
        }
    }

    fn previous_delta(&self, message: &ChunkMessage) -> u32 {
        match &self.previous {
            Some(previous) => message.timestamp.saturating_sub(previous.timestamp),
            None => 0,
        }
    }

    fn write_basic_header(&mut self, fmt: u8, csid: Csid) -> ChunkMessageResult<()> {
        if !(MIN_CSID..=MAX_CSID).contains(&csid) {
            return Err(ChunkMessageError::InvalidCsid(csid));
        }
        if csid < 64 {
            WriteBytesExt::write_u8(&mut self.buffer, (fmt << 6) | csid as u8)?;
        } else if csid < 320 {
            WriteBytesExt::write_u8(&mut self.buffer, fmt << 6)?;
            WriteBytesExt::write_u8(&mut self.buffer, (csid - 64) as u8)?;
        } else {
            WriteBytesExt::write_u8(&mut self.buffer, (fmt << 6) | 1)?;
            WriteBytesExt::write_u8(&mut self.buffer, ((csid - 64) & 0xFF) as u8)?;
            WriteBytesExt::write_u8(&mut self.buffer, ((csid - 64) >> 8) as u8)?;
        }
        Ok(())
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::bytes::Bytes;

    use crate::bitio::BitStreamReader;
    use crate::chunk::reader::Reader;

    use super::*;

    fn message(csid: Csid, timestamp: u32, type_id: u8, stream_id: u32, payload: &[u8]) -> ChunkMessage {
        ChunkMessage::new(
            csid,
            timestamp,
            type_id,
            stream_id,
            Bytes::copy_from_slice(payload),
        )
    }

    #[test]
    fn first_message_is_type0() {
        let mut writer = Writer::new();
        writer
            .write_message(&message(3, 0, 0x14, 0, b"abc"))
            .unwrap();
        let wire = writer.pending();
        assert_eq!(wire[0] >> 6, 0);
        assert_eq!(wire[0] & 0x3F, 3);
        assert_eq!(wire.len(), 1 + 11 + 3);
    }

    #[test]
    fn same_stream_upgrades_header_type() {
        let mut writer = Writer::new();
        writer
            .write_message(&message(3, 0, 0x14, 0, b"aaaa"))
            .unwrap();
        let first_len = writer.pending().len();

        // same stream id, different length: type 1
        writer
            .write_message(&message(3, 10, 0x14, 0, b"bb"))
            .unwrap();
        let wire = writer.pending();
        assert_eq!(wire[first_len] >> 6, 1);

        // same stream id, length and type: type 2
        let second_len = wire.len();
        writer
            .write_message(&message(3, 20, 0x14, 0, b"cc"))
            .unwrap();
        assert_eq!(writer.pending()[second_len] >> 6, 2);
    }

    #[test]
    fn new_chunk_stream_is_self_describing() {
        // control replies on csid 2 followed by a command on csid 3, both
        // msid 0: the csid change must not inherit the control context
        let mut writer = Writer::new();
        writer
            .write_message(&message(2, 0, 0x05, 0, b"\x00\x4C\x4B\x40"))
            .unwrap();
        let first_len = writer.pending().len();
        writer
            .write_message(&message(3, 0, 0x14, 0, b"result"))
            .unwrap();
        let wire = writer.pending();
        assert_eq!(wire[first_len] >> 6, 0);
        assert_eq!(wire[first_len] & 0x3F, 3);
    }

    #[test]
    fn different_stream_id_falls_back_to_type0() {
        let mut writer = Writer::new();
        writer
            .write_message(&message(3, 0, 0x14, 0, b"aaaa"))
            .unwrap();
        let first_len = writer.pending().len();
        writer
            .write_message(&message(3, 0, 0x14, 1, b"bb"))
            .unwrap();
        assert_eq!(writer.pending()[first_len] >> 6, 0);
    }

    #[test]
    fn fragments_are_type3_and_bounded() {
        let payload: Vec<u8> = (0..300u32).map(|i| i as u8).collect();
        let mut writer = Writer::new();
        writer
            .write_message(&message(4, 0, 0x09, 1, &payload))
            .unwrap();
        let wire = writer.pending();

        // basic+message header, 128 bytes, then two type 3 continuations
        assert_eq!(wire.len(), 1 + 11 + 128 + 1 + 128 + 1 + 44);
        assert_eq!(wire[0] >> 6, 0);
        assert_eq!(wire[1 + 11 + 128] >> 6, 3);
        assert_eq!(wire[1 + 11 + 128] & 0x3F, 4);
        assert_eq!(wire[1 + 11 + 128 + 1 + 128] >> 6, 3);
    }

    #[tokio::test]
    async fn writer_output_round_trips_through_reader() {
        let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let mut writer = Writer::new();
        writer.set_chunk_size(4096);
        writer
            .write_message(&message(6, 42, 0x09, 1, &payload))
            .unwrap();
        writer
            .write_message(&message(6, 64, 0x08, 1, b"audio"))
            .unwrap();

        let mut reader = Reader::new();
        reader.set_chunk_size(4096);
        let mut bits = BitStreamReader::new(writer.pending());
        let video = reader.read_message(&mut bits).await.unwrap();
        assert_eq!(&video.payload[..], &payload[..]);
        assert_eq!(video.timestamp, 42);
        let audio = reader.read_message(&mut bits).await.unwrap();
        assert_eq!(&audio.payload[..], b"audio");
        assert_eq!(audio.timestamp, 64);
    }

    #[tokio::test]
    async fn extended_timestamp_round_trips() {
        let mut writer = Writer::new();
        writer
            .write_message(&message(3, 0x0100_0000, 0x09, 1, b"late"))
            .unwrap();
        let mut reader = Reader::new();
        let mut bits = BitStreamReader::new(writer.pending());
        let message = reader.read_message(&mut bits).await.unwrap();
        assert_eq!(message.timestamp, 0x0100_0000);
    }

    #[tokio::test]
    async fn drain_resets_compression_context() {
        let mut writer = Writer::new();
        writer
            .write_message(&message(3, 0, 0x14, 0, b"first"))
            .unwrap();
        let (mut sink, _keep) = tokio::io::duplex(1024);
        writer.flush_to(&mut sink).await.unwrap();
        assert!(writer.pending().is_empty());

        writer
            .write_message(&message(3, 0, 0x14, 0, b"second"))
            .unwrap();
        assert_eq!(writer.pending()[0] >> 6, 0);
    }

    #[test]
    fn csid_out_of_range_is_rejected() {
        let mut writer = Writer::new();
        let err = writer
            .write_message(&message(1, 0, 0x14, 0, b"x"))
            .unwrap_err();
        assert!(matches!(err, ChunkMessageError::InvalidCsid(1)));
    }
}
