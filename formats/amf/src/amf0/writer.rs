use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use crate::errors::{AmfWriteError, AmfWriteResult};

use super::{Value, amf0_marker};

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

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write(&mut self, value: &Value) -> AmfWriteResult<()> {
        WriteTo::write_to(value, &mut self.inner)
    }
}

impl<W: io::Write> WriteTo<W> for Value {
    type Error = AmfWriteError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        match self {
            Value::Number(v) => Self::write_number(writer, *v),
            Value::Boolean(v) => Self::write_boolean(writer, *v),
            Value::String(v) => Self::write_string(writer, v),
            Value::Object(entries) => Self::write_object(writer, entries),
            Value::Null => Self::write_null(writer),
            Value::EcmaArray(entries) => Self::write_ecma_array(writer, entries),
        }
    }
}

impl Value {
    pub fn write_number<W: io::Write>(writer: &mut W, v: f64) -> AmfWriteResult<()> {
        writer.write_u8(amf0_marker::NUMBER)?;
        writer.write_f64::<BigEndian>(v)?;
        Ok(())
    }

    pub fn write_boolean<W: io::Write>(writer: &mut W, v: bool) -> AmfWriteResult<()> {
        writer.write_u8(amf0_marker::BOOLEAN)?;
        writer.write_u8(v as u8)?;
        Ok(())
    }

    fn write_short_string_inner<W: io::Write>(writer: &mut W, v: &str) -> AmfWriteResult<()> {
        if v.len() >= 0xFFFF {
            return Err(AmfWriteError::StringTooLong { length: v.len() });
        }
        writer.write_u16::<BigEndian>(v.len() as u16)?;
        writer.write_all(v.as_bytes())?;
        Ok(())
    }

    pub fn write_string<W: io::Write>(writer: &mut W, v: &str) -> AmfWriteResult<()> {
        writer.write_u8(amf0_marker::STRING)?;
        Self::write_short_string_inner(writer, v)?;
        Ok(())
    }

    fn write_key_value_pairs_inner<W: io::Write>(
        writer: &mut W,
        entries: &[(String, Value)],
    ) -> AmfWriteResult<()> {
        for (key, value) in entries {
            Self::write_short_string_inner(writer, key)?;
            WriteTo::write_to(value, writer)?;
        }
        writer.write_u16::<BigEndian>(0)?;
        writer.write_u8(amf0_marker::OBJECT_END)?;
        Ok(())
    }

    pub fn write_object<W: io::Write>(
        writer: &mut W,
        entries: &[(String, Value)],
    ) -> AmfWriteResult<()> {
        writer.write_u8(amf0_marker::OBJECT)?;
        Self::write_key_value_pairs_inner(writer, entries)?;
        Ok(())
    }

    pub fn write_null<W: io::Write>(writer: &mut W) -> AmfWriteResult<()> {
        writer.write_u8(amf0_marker::NULL)?;
        Ok(())
    }

    pub fn write_ecma_array<W: io::Write>(
        writer: &mut W,
        entries: &[(String, Value)],
    ) -> AmfWriteResult<()> {
        writer.write_u8(amf0_marker::ECMA_ARRAY)?;
        writer.write_u32::<BigEndian>(entries.len() as u32)?;
        Self::write_key_value_pairs_inner(writer, entries)?;
        Ok(())
    }
}
