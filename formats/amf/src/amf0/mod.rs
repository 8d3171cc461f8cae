///! @see: [Action Message Format -- AMF 0](https://rtmp.veriskope.com/pdf/amf0-file-format-specification.pdf)
use std::io;

use crate::errors::{AmfReadResult, AmfWriteResult};

mod reader;
mod writer;
#[cfg(test)]
mod writer_test;

pub use self::reader::Reader;
pub use self::writer::Writer;

/// @see: 2.1 Types Overview
pub mod amf0_marker {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const OBJECT: u8 = 0x03;
    pub const NULL: u8 = 0x05;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
}

/// The AMF0 value subset RTMP command and data messages use.
/// Object and ecma-array entries keep insertion order so encodings stay
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// @see: 2.2 Number Type
    Number(f64),
    /// @see: 2.3 Boolean Type
    Boolean(bool),
    /// @see: 2.4 String Type
    String(String),
    /// @see: 2.5 Object Type
    Object(Vec<(String, Value)>),
    /// @see: 2.7 null Type
    Null,
    /// @see: 2.10 ECMA Array Type
    EcmaArray(Vec<(String, Value)>),
}

impl Value {
    pub fn read_from<R>(reader: R) -> AmfReadResult<Option<Self>>
    where
        R: io::Read,
    {
        Reader::new(reader).read()
    }

    pub fn write_to<W>(&self, writer: &mut W) -> AmfWriteResult<()>
    where
        W: io::Write,
    {
        Writer::new(writer).write(self)
    }

    pub fn try_as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn try_as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn try_as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Key-value view over object-like values.
    pub fn try_as_pairs(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(entries) | Value::EcmaArray(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    pub fn try_into_pairs(self) -> Result<Vec<(String, Value)>, Self> {
        match self {
            Value::Object(entries) | Value::EcmaArray(entries) => Ok(entries),
            other => Err(other),
        }
    }
}
