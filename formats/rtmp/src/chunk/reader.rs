use std::collections::HashMap;

use tokio::io::AsyncRead;
use tokio_util::bytes::BytesMut;

use crate::bitio::BitStreamReader;

use super::{
    ChunkMessage, Csid, RawChunk,
    consts::{DEFAULT_CHUNK_SIZE, MAX_TIMESTAMP},
    errors::{ChunkMessageError, ChunkMessageResult},
};

/// Header fields remembered per chunk stream, the decompression context for
/// type 1/2/3 headers.
#[derive(Debug, Default)]
struct ReadContext {
    timestamp: u32,
    timestamp_delta: u32,
    message_length: u32,
    message_type_id: u8,
    message_stream_id: u32,
    extended_timestamp_enabled: bool,
    sequence: u32,
    is_eof: bool,
}

#[derive(Debug, Default)]
struct PartialMessage {
    payload: BytesMut,
    timestamp: u32,
}

/// Inbound side of the chunk stream: raw chunk decoding plus per-csid
/// reassembly of fragmented messages.
#[derive(Debug)]
pub struct Reader {
    context: HashMap<Csid, ReadContext>,
    inflight: HashMap<Csid, PartialMessage>,
    chunk_size: usize,
}

impl Reader {
    pub fn new() -> Self {
        Self {
            context: HashMap::new(),
            inflight: HashMap::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Applies a peer SetChunkSize, returns the previous size.
    pub fn set_chunk_size(&mut self, size: usize) -> usize {
        let old_size = self.chunk_size;
        self.chunk_size = size;
        old_size
    }

    /// Drops the partial message on a chunk stream (AbortMessage).
    pub fn abort(&mut self, csid: Csid) {
        self.inflight.remove(&csid);
        if let Some(ctx) = self.context.get_mut(&csid) {
            ctx.is_eof = true;
        }
    }

    /// Reads raw chunks until one completes a logical message. Chunk streams
    /// may interleave arbitrarily; messages surface in the order their final
    /// fragment arrives.
    pub async fn read_message<R>(
        &mut self,
        bits: &mut BitStreamReader<R>,
    ) -> ChunkMessageResult<ChunkMessage>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            let raw = self.read_raw_chunk(bits).await?;
            if let Some(message) = self.assemble(raw)? {
                return Ok(message);
            }
        }
    }

    /// Decodes one chunk off the wire, resolving inherited header fields
    /// from the csid's context.
    pub async fn read_raw_chunk<R>(
        &mut self,
        bits: &mut BitStreamReader<R>,
    ) -> ChunkMessageResult<RawChunk>
    where
        R: AsyncRead + Unpin,
    {
        let (fmt, csid) = Self::read_basic_header(bits).await?;

        let (timestamp, message_length, message_type_id, message_stream_id, sequence) = match fmt {
            0 => {
                let timestamp_field = bits.read_u24().await?;
                let message_length = bits.read_u24().await?;
                let message_type_id = bits.read_u8().await?;
                let message_stream_id = bits.read_u32_le().await?;
                let extended = timestamp_field >= MAX_TIMESTAMP;
                let timestamp = if extended {
                    bits.read_u32().await?
                } else {
                    timestamp_field
                };

                let ctx = self.context.entry(csid).or_default();
                ctx.timestamp = timestamp;
                ctx.timestamp_delta = 0;
                ctx.message_length = message_length;
                ctx.message_type_id = message_type_id;
                ctx.message_stream_id = message_stream_id;
                ctx.extended_timestamp_enabled = extended;

                (timestamp, message_length, message_type_id, message_stream_id, 0)
            }
            1 => {
                let ctx = self
                    .context
                    .get_mut(&csid)
                    .ok_or(ChunkMessageError::NeedContext { csid, fmt })?;
                let delta_field = bits.read_u24().await?;
                let message_length = bits.read_u24().await?;
                let message_type_id = bits.read_u8().await?;
                let extended = delta_field >= MAX_TIMESTAMP;
                let delta = if extended {
                    bits.read_u32().await?
                } else {
                    delta_field
                };

                let timestamp = ctx.timestamp.wrapping_add(delta);
                let sequence = if ctx.is_eof { 0 } else { ctx.sequence + 1 };
                ctx.timestamp = timestamp;
                ctx.timestamp_delta = delta;
                ctx.message_length = message_length;
                ctx.message_type_id = message_type_id;
                ctx.extended_timestamp_enabled = extended;

                (timestamp, message_length, message_type_id, ctx.message_stream_id, sequence)
            }
            2 => {
                let ctx = self
                    .context
                    .get_mut(&csid)
                    .ok_or(ChunkMessageError::NeedContext { csid, fmt })?;
                let delta_field = bits.read_u24().await?;
                let extended = delta_field >= MAX_TIMESTAMP;
                let delta = if extended {
                    bits.read_u32().await?
                } else {
                    delta_field
                };

                let timestamp = ctx.timestamp.wrapping_add(delta);
                let sequence = if ctx.is_eof { 0 } else { ctx.sequence + 1 };
                ctx.timestamp = timestamp;
                ctx.timestamp_delta = delta;
                ctx.extended_timestamp_enabled = extended;

                (
                    timestamp,
                    ctx.message_length,
                    ctx.message_type_id,
                    ctx.message_stream_id,
                    sequence,
                )
            }
            3 => {
                let ctx = self
                    .context
                    .get_mut(&csid)
                    .ok_or(ChunkMessageError::NeedContext { csid, fmt })?;
                let starting_new = ctx.is_eof;
                let timestamp = if ctx.extended_timestamp_enabled {
                    // the extended field repeats the full message timestamp
                    let extended = bits.read_u32().await?;
                    if starting_new { extended } else { ctx.timestamp }
                } else if starting_new {
                    // a fresh message on a bare type 3 re-applies the stored delta
                    ctx.timestamp.wrapping_add(ctx.timestamp_delta)
                } else {
                    ctx.timestamp
                };
                let sequence = if starting_new { 0 } else { ctx.sequence + 1 };
                ctx.timestamp = timestamp;

                (
                    timestamp,
                    ctx.message_length,
                    ctx.message_type_id,
                    ctx.message_stream_id,
                    sequence,
                )
            }
            fmt => {
                // a 2-bit field, the branch is unreachable
                return Err(ChunkMessageError::InvalidMessage(format!(
                    "unexpected fmt: {}",
                    fmt
                )));
            }
        };

        let already_read = self.chunk_size as u64 * sequence as u64;
        if already_read > message_length as u64 {
            return Err(ChunkMessageError::PayloadOverflow {
                received: already_read as usize,
                expected: message_length as usize,
            });
        }
        let payload_len = self.chunk_size.min((message_length as u64 - already_read) as usize);
        let is_eof = message_length as u64 - already_read - payload_len as u64 == 0;
        let payload = bits.read_bytes(payload_len).await?;

        let ctx = self
            .context
            .get_mut(&csid)
            .ok_or(ChunkMessageError::NeedContext { csid, fmt })?;
        ctx.sequence = sequence;
        ctx.is_eof = is_eof;

        Ok(RawChunk {
            fmt,
            csid,
            timestamp,
            message_length,
            message_type_id,
            message_stream_id,
            payload,
            sequence,
            is_eof,
        })
    }

    async fn read_basic_header<R>(bits: &mut BitStreamReader<R>) -> ChunkMessageResult<(u8, Csid)>
    where
        R: AsyncRead + Unpin,
    {
        let fmt = bits.read_bits(2).await? as u8;
        let csid_field = bits.read_bits(6).await? as u32;
        let csid = match csid_field {
            0 => bits.read_u8().await? as u32 + 64,
            1 => {
                let b0 = bits.read_u8().await? as u32;
                let b1 = bits.read_u8().await? as u32;
                b0 + b1 * 256 + 64
            }
            csid => csid,
        };
        Ok((fmt, csid))
    }

    fn assemble(&mut self, raw: RawChunk) -> ChunkMessageResult<Option<ChunkMessage>> {
        let entry = self.inflight.entry(raw.csid).or_default();
        if raw.sequence == 0 {
            entry.payload.clear();
            entry.timestamp = raw.timestamp;
        }
        entry.payload.extend_from_slice(&raw.payload);
        if entry.payload.len() > raw.message_length as usize {
            return Err(ChunkMessageError::PayloadOverflow {
                received: entry.payload.len(),
                expected: raw.message_length as usize,
            });
        }

        if !raw.is_eof {
            return Ok(None);
        }

        let complete = self
            .inflight
            .remove(&raw.csid)
            .unwrap_or_default();
        Ok(Some(ChunkMessage {
            csid: raw.csid,
            timestamp: complete.timestamp,
            message_length: raw.message_length,
            message_type_id: raw.message_type_id,
            message_stream_id: raw.message_stream_id,
            payload: complete.payload.freeze(),
        }))
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}
