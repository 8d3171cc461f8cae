use std::io;

use amf_formats::{Value, amf0};

use crate::commands::errors::{CommandMessageError, CommandMessageResult};

use super::{DataMessage, MetaData, SET_DATA_FRAME};

#[derive(Debug)]
pub struct Reader<R> {
    inner: amf0::Reader<R>,
}

impl<R> Reader<R>
where
    R: io::Read,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner: amf0::Reader::new(inner),
        }
    }

    pub fn read(&mut self) -> CommandMessageResult<DataMessage> {
        let command_name = match self.inner.read()? {
            Some(Value::String(name)) => name,
            other => {
                return Err(CommandMessageError::UnexpectedAmfType(format!(
                    "expect a data command name string, got {:?}",
                    other
                )));
            }
        };
        if command_name != SET_DATA_FRAME {
            return Ok(DataMessage::Unknown { command_name });
        }

        let event_name = match self.inner.read()? {
            Some(Value::String(name)) => name,
            other => {
                return Err(CommandMessageError::UnexpectedAmfType(format!(
                    "expect a metadata event name string, got {:?}",
                    other
                )));
            }
        };
        let entries = match self.inner.read()? {
            Some(Value::EcmaArray(entries)) | Some(Value::Object(entries)) => entries,
            other => {
                return Err(CommandMessageError::UnexpectedAmfType(format!(
                    "expect a metadata body, got {:?}",
                    other
                )));
            }
        };
        Ok(DataMessage::MetaData(MetaData {
            event_name,
            entries,
        }))
    }
}
