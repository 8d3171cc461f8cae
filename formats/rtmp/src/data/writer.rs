use std::io;

use amf_formats::Value;

use crate::commands::errors::CommandMessageResult;

use super::{DataMessage, MetaData, SET_DATA_FRAME};

impl MetaData {
    /// Re-encodes the metadata the way an FLV script tag carries it: the
    /// event name followed by the property array, without the
    /// `@setDataFrame` wrapper.
    pub fn to_flv_body(&self) -> CommandMessageResult<Vec<u8>> {
        let mut bytes = Vec::new();
        Value::write_string(&mut bytes, &self.event_name)?;
        Value::write_ecma_array(&mut bytes, &self.entries)?;
        Ok(bytes)
    }
}

impl DataMessage {
    pub fn write_to<W>(&self, mut writer: W) -> CommandMessageResult<()>
    where
        W: io::Write,
    {
        match self {
            DataMessage::MetaData(meta) => {
                Value::write_string(&mut writer, SET_DATA_FRAME)?;
                Value::write_string(&mut writer, &meta.event_name)?;
                Value::write_ecma_array(&mut writer, &meta.entries)?;
            }
            DataMessage::Unknown { command_name } => {
                Value::write_string(&mut writer, command_name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use amf_formats::Value;

    use crate::data::{DataMessage, MetaData};

    #[test]
    fn set_data_frame_round_trip() {
        let meta = MetaData {
            event_name: "onMetaData".to_string(),
            entries: vec![
                ("width".to_string(), Value::Number(1280.0)),
                ("height".to_string(), Value::Number(720.0)),
            ],
        };
        let mut buf = Vec::new();
        DataMessage::MetaData(meta).write_to(&mut buf).unwrap();

        match DataMessage::read_from(&buf[..]).unwrap() {
            DataMessage::MetaData(decoded) => {
                assert_eq!(decoded.event_name, "onMetaData");
                assert_eq!(decoded.entries[0].0, "width");
                assert_eq!(decoded.entries[1].1.try_as_f64(), Some(720.0));
            }
            other => panic!("expect metadata, got {:?}", other),
        }
    }

    #[test]
    fn flv_body_drops_the_wrapper() {
        let meta = MetaData {
            event_name: "onMetaData".to_string(),
            entries: vec![("duration".to_string(), Value::Number(0.0))],
        };
        let body = meta.to_flv_body().unwrap();
        // starts with the event name string, not @setDataFrame
        assert_eq!(body[0], 0x02);
        assert_eq!(&body[3..13], b"onMetaData");
        assert!(body.ends_with(&[0x00, 0x00, 0x09]));
    }

    #[test]
    fn unknown_data_command() {
        let mut buf = Vec::new();
        Value::write_string(&mut buf, "onTextData").unwrap();
        match DataMessage::read_from(&buf[..]).unwrap() {
            DataMessage::Unknown { command_name } => assert_eq!(command_name, "onTextData"),
            other => panic!("expect unknown data, got {:?}", other),
        }
    }
}
