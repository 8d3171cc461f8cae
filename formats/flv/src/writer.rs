use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use crate::{
    errors::FlvResult,
    header::FlvHeader,
    tag::{FlvTagHeader, FlvTagType, TAG_HEADER_SIZE},
};

/// Stateless apart from the previous-tag-size chain: emits the 13-byte file
/// preamble, then `(tag header, payload, previous tag size)` triples.
#[derive(Debug)]
pub struct FlvWriter {
    previous_tag_size: u32,
}

impl FlvWriter {
    pub fn new() -> Self {
        Self {
            previous_tag_size: 0,
        }
    }

    pub fn write_header<W>(&mut self, writer: &mut W, has_audio: bool, has_video: bool) -> FlvResult<()>
    where
        W: io::Write,
    {
        FlvHeader::new(has_audio, has_video).write_to(writer)?;
        writer.write_u32::<BigEndian>(self.previous_tag_size)?;
        Ok(())
    }

    pub fn write_tag<W>(
        &mut self,
        writer: &mut W,
        timestamp: u32,
        payload: &[u8],
        tag_type: FlvTagType,
    ) -> FlvResult<()>
    where
        W: io::Write,
    {
        FlvTagHeader {
            tag_type,
            data_size: payload.len() as u32,
            timestamp,
        }
        .write_to(writer)?;
        writer.write_all(payload)?;
        self.previous_tag_size = TAG_HEADER_SIZE + payload.len() as u32;
        writer.write_u32::<BigEndian>(self.previous_tag_size)?;
        Ok(())
    }
}

impl Default for FlvWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// An FLV sink over any `io::Write`, header written on construction. The
/// usual consumer of `(timestamp, payload, media type)` tuples coming off a
/// published stream.
#[derive(Debug)]
pub struct FlvFileWriter<W> {
    inner: W,
    writer: FlvWriter,
}

impl<W> FlvFileWriter<W>
where
    W: io::Write,
{
    pub fn new(mut inner: W) -> FlvResult<Self> {
        let mut writer = FlvWriter::new();
        writer.write_header(&mut inner, true, true)?;
        Ok(Self { inner, writer })
    }

    pub fn write(
        &mut self,
        timestamp: u32,
        payload: &[u8],
        tag_type: FlvTagType,
    ) -> FlvResult<()> {
        self.writer
            .write_tag(&mut self.inner, timestamp, payload, tag_type)?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_thirteen_bytes() {
        let mut buf = Vec::new();
        FlvWriter::new().write_header(&mut buf, true, true).unwrap();
        assert_eq!(
            buf,
            [b'F', b'L', b'V', 1, 5, 0, 0, 0, 9, 0, 0, 0, 0]
        );
    }

    #[test]
    fn video_only_flag() {
        let mut buf = Vec::new();
        FlvWriter::new()
            .write_header(&mut buf, false, true)
            .unwrap();
        assert_eq!(buf[4], 1);
    }

    #[test]
    fn tag_framing_and_previous_size_chain() {
        let mut buf = Vec::new();
        let mut writer = FlvWriter::new();
        writer
            .write_tag(&mut buf, 0x0102_0304, b"abcd", FlvTagType::Video)
            .unwrap();

        assert_eq!(buf[0], 9);
        assert_eq!(&buf[1..4], &[0, 0, 4]); // data size
        assert_eq!(&buf[4..7], &[0x02, 0x03, 0x04]); // timestamp low bits
        assert_eq!(buf[7], 0x01); // timestamp extension
        assert_eq!(&buf[8..11], &[0, 0, 0]); // stream id
        assert_eq!(&buf[11..15], b"abcd");
        assert_eq!(&buf[15..19], &(11u32 + 4).to_be_bytes());

        // the next tag closes the chain with its own size
        buf.clear();
        writer
            .write_tag(&mut buf, 40, &[0xAF, 0x00], FlvTagType::Audio)
            .unwrap();
        assert_eq!(buf[0], 8);
        assert_eq!(&buf[13..17], &(11u32 + 2).to_be_bytes());
    }

    #[test]
    fn file_writer_emits_header_first() {
        let sink = Vec::new();
        let mut file = FlvFileWriter::new(sink).unwrap();
        file.write(0, b"\x12\x00", FlvTagType::Script).unwrap();
        let bytes = file.into_inner();
        assert_eq!(&bytes[..3], b"FLV");
        assert_eq!(bytes[13], 18);
        assert_eq!(bytes.len(), 13 + 11 + 2 + 4);
    }
}
