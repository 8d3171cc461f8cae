use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use crate::errors::FlvError;

use super::FlvHeader;

impl<W: io::Write> WriteTo<W> for FlvHeader {
    type Error = FlvError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_all(b"FLV")?;
        writer.write_u8(self.version)?;

        let mut flags: u8 = 0;
        flags |= (self.has_audio as u8) << 2;
        flags |= self.has_video as u8;
        writer.write_u8(flags)?;

        writer.write_u32::<BigEndian>(self.data_offset)?;
        Ok(())
    }
}
