use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use super::{C0S0Packet, C1S1Packet, C2S2Packet, errors::HandshakeError};

impl<W: io::Write> WriteTo<W> for C0S0Packet {
    type Error = HandshakeError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u8(self.version)?;
        Ok(())
    }
}

impl<W: io::Write> WriteTo<W> for C1S1Packet {
    type Error = HandshakeError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u32::<BigEndian>(self.time)?;
        writer.write_u32::<BigEndian>(self.zero)?;
        writer.write_all(&self.random_bytes)?;
        Ok(())
    }
}

impl<W: io::Write> WriteTo<W> for C2S2Packet {
    type Error = HandshakeError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write_u32::<BigEndian>(self.time1)?;
        writer.write_u32::<BigEndian>(self.time2)?;
        writer.write_all(&self.random_echo)?;
        Ok(())
    }
}
