use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use crate::errors::FlvError;

use super::FlvTagHeader;

impl<W: io::Write> WriteTo<W> for FlvTagHeader {
    type Error = FlvError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u8(self.tag_type.into())?;
        writer.write_u24::<BigEndian>(self.data_size)?;
        // timestamp splits into low 24 bits plus an extension byte
        writer.write_u24::<BigEndian>(self.timestamp & 0x00FF_FFFF)?;
        writer.write_u8(((self.timestamp >> 24) & 0xFF) as u8)?;
        // stream id, always 0
        writer.write_u24::<BigEndian>(0)?;
        Ok(())
    }
}
