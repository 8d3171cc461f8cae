use std::io;

use byteorder::{BigEndian, ReadBytesExt};

use crate::errors::{AmfReadError, AmfReadResult};

use super::{Value, amf0_marker};

#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
}

impl<R> Reader<R> {
    /// Unwraps this `Reader`, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Get the mutable reference to the underlying reader.
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R> Reader<R>
where
    R: io::Read,
{
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads the next value, `Ok(None)` once the stream is exhausted.
    pub fn read(&mut self) -> AmfReadResult<Option<Value>> {
        let marker = match self.inner.read_u8() {
            Ok(marker) => marker,
            Err(_) => return Ok(None),
        };
        let value = match marker {
            amf0_marker::NUMBER => self.read_number(),
            amf0_marker::BOOLEAN => self.read_boolean(),
            amf0_marker::STRING => self.read_string(),
            amf0_marker::OBJECT => self.read_object(),
            amf0_marker::NULL => Ok(Value::Null),
            amf0_marker::ECMA_ARRAY => self.read_ecma_array(),
            marker => Err(AmfReadError::Unsupported { marker }),
        }?;
        Ok(Some(value))
    }

    /// Reads every remaining value, the shape of a command argument list.
    pub fn read_all(&mut self) -> AmfReadResult<Vec<Value>> {
        let mut result = Vec::new();
        while let Some(value) = self.read()? {
            result.push(value);
        }
        Ok(result)
    }

    fn read_number(&mut self) -> AmfReadResult<Value> {
        let number = self.inner.read_f64::<BigEndian>()?;
        Ok(Value::Number(number))
    }

    fn read_boolean(&mut self) -> AmfReadResult<Value> {
        let byte = self.inner.read_u8()?;
        Ok(Value::Boolean(byte != 0))
    }

    fn read_utf8_inner(&mut self, len: usize) -> AmfReadResult<String> {
        let mut buffer = vec![0; len];
        self.inner.read_exact(&mut buffer)?;
        let result = String::from_utf8(buffer)?;
        Ok(result)
    }

    fn read_string(&mut self) -> AmfReadResult<Value> {
        let len = self.inner.read_u16::<BigEndian>()?;
        self.read_utf8_inner(len as usize).map(Value::String)
    }

    fn read_key_value_pairs_inner(&mut self) -> AmfReadResult<Vec<(String, Value)>> {
        let mut result: Vec<(String, Value)> = Vec::new();
        loop {
            let len = self.inner.read_u16::<BigEndian>()?;
            if len == 0 {
                // an empty key must be followed by the object-end marker
                let marker = self.inner.read_u8()?;
                if marker == amf0_marker::OBJECT_END {
                    break;
                }
                return Err(AmfReadError::UnexpectedPropertyEnd { marker });
            }
            let key = self.read_utf8_inner(len as usize)?;
            match self.read()? {
                Some(value) => result.push((key, value)),
                None => {
                    return Err(AmfReadError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "unexpected eof while reading object properties",
                    )));
                }
            }
        }
        Ok(result)
    }

    fn read_object(&mut self) -> AmfReadResult<Value> {
        let pairs = self.read_key_value_pairs_inner()?;
        Ok(Value::Object(pairs))
    }

    fn read_ecma_array(&mut self) -> AmfReadResult<Value> {
        // the associative count is advisory, the terminator is authoritative
        let _count = self.inner.read_u32::<BigEndian>()?;
        let pairs = self.read_key_value_pairs_inner()?;
        Ok(Value::EcmaArray(pairs))
    }
}
