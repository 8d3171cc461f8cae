use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::bytes::{Buf, BufMut, Bytes, BytesMut};

use super::errors::{BitIoError, BitIoResult};

/// Refill granularity, one socket read pulls at most this many bytes.
pub const REFILL_SIZE: usize = 4096;

/// Big-endian bit reader over an async byte source.
///
/// Maintains an internal byte buffer plus a bit cursor into its first byte.
/// When a read needs more bits than are buffered, bytes are pulled from the
/// source in chunks of up to [`REFILL_SIZE`]; a refill that yields zero
/// bytes fails with [`BitIoError::StreamClosed`].
#[derive(Debug)]
pub struct BitStreamReader<R> {
    inner: R,
    buffer: BytesMut,
    bit_offset: usize,
    total_bytes_read: u64,
}

impl<R> BitStreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(REFILL_SIZE),
            bit_offset: 0,
            total_bytes_read: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Bytes pulled from the source so far, the acknowledgement counter.
    pub fn total_bytes_read(&self) -> u64 {
        self.total_bytes_read
    }

    fn bits_available(&self) -> usize {
        self.buffer.len() * 8 - self.bit_offset
    }
}

impl<R> BitStreamReader<R>
where
    R: AsyncRead + Unpin,
{
    async fn fill(&mut self, bits_needed: usize) -> BitIoResult<()> {
        while self.bits_available() < bits_needed {
            let read = self
                .inner
                .read_buf(&mut (&mut self.buffer).limit(REFILL_SIZE))
                .await?;
            if read == 0 {
                return Err(BitIoError::StreamClosed);
            }
            self.total_bytes_read += read as u64;
        }
        Ok(())
    }

    /// Reads `count` bits (at most 64) as a big-endian unsigned value.
    pub async fn read_bits(&mut self, count: u32) -> BitIoResult<u64> {
        debug_assert!(count <= 64);
        self.fill(count as usize).await?;

        let mut value: u64 = 0;
        let mut remaining = count;
        while remaining > 0 {
            let available = 8 - self.bit_offset as u32;
            let take = remaining.min(available);
            let shift = available - take;
            let mask = ((1u16 << take) - 1) as u8;
            let bits = (self.buffer[0] >> shift) & mask;
            value = (value << take) | bits as u64;
            self.bit_offset += take as usize;
            if self.bit_offset == 8 {
                self.buffer.advance(1);
                self.bit_offset = 0;
            }
            remaining -= take;
        }
        Ok(value)
    }

    pub async fn read_u8(&mut self) -> BitIoResult<u8> {
        Ok(self.read_bits(8).await? as u8)
    }

    pub async fn read_u16(&mut self) -> BitIoResult<u16> {
        Ok(self.read_bits(16).await? as u16)
    }

    pub async fn read_u24(&mut self) -> BitIoResult<u32> {
        Ok(self.read_bits(24).await? as u32)
    }

    pub async fn read_u32(&mut self) -> BitIoResult<u32> {
        Ok(self.read_bits(32).await? as u32)
    }

    /// RTMP message stream ids are the lone little-endian field.
    pub async fn read_u32_le(&mut self) -> BitIoResult<u32> {
        Ok((self.read_bits(32).await? as u32).swap_bytes())
    }

    pub async fn read_f64(&mut self) -> BitIoResult<f64> {
        Ok(f64::from_bits(self.read_bits(64).await?))
    }

    /// Bulk byte read. Byte-aligned positions take the buffer fast path.
    pub async fn read_bytes(&mut self, len: usize) -> BitIoResult<Bytes> {
        if self.bit_offset == 0 {
            self.fill(len * 8).await?;
            return Ok(self.buffer.split_to(len).freeze());
        }
        let mut out = BytesMut::with_capacity(len);
        for _ in 0..len {
            out.put_u8(self.read_u8().await?);
        }
        Ok(out.freeze())
    }
}
