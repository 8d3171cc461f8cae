use std::io;

use amf_formats::Value;

use super::{
    CloseStreamCommand, CommandMessage, ConnectCommand, CreateStreamCommand, DeleteStreamCommand,
    NetConnectionCommand, NetStreamCommand, PublishCommand, UnknownCommand,
    consts::{c2s_command_names, s2c_command_names},
    errors::CommandMessageResult,
};

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

    pub fn write(&mut self, command: &CommandMessage) -> CommandMessageResult<()> {
        match command {
            CommandMessage::NetConnection(NetConnectionCommand::Connect(command)) => {
                self.write_connect_request(command)
            }
            CommandMessage::NetConnection(NetConnectionCommand::CreateStream(command)) => {
                self.write_create_stream_request(command)
            }
            CommandMessage::NetStream(NetStreamCommand::Publish(command)) => {
                self.write_publish_request(command)
            }
            CommandMessage::NetStream(NetStreamCommand::CloseStream(command)) => {
                self.write_close_stream_request(command)
            }
            CommandMessage::NetStream(NetStreamCommand::DeleteStream(command)) => {
                self.write_delete_stream_request(command)
            }
            CommandMessage::Unknown(command) => self.write_unknown(command),
        }
    }

    pub fn write_connect_request(&mut self, command: &ConnectCommand) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, c2s_command_names::CONNECT)?;
        Value::write_number(&mut self.inner, command.transaction_id)?;
        Value::write_object(&mut self.inner, &command.command_object)?;
        if let Some(arguments) = &command.optional_user_arguments {
            arguments.write_to(&mut self.inner)?;
        }
        Ok(())
    }

    pub fn write_create_stream_request(
        &mut self,
        command: &CreateStreamCommand,
    ) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, c2s_command_names::CREATE_STREAM)?;
        Value::write_number(&mut self.inner, command.transaction_id)?;
        command.command_object.write_to(&mut self.inner)?;
        Ok(())
    }

    pub fn write_publish_request(&mut self, command: &PublishCommand) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, c2s_command_names::PUBLISH)?;
        Value::write_number(&mut self.inner, command.transaction_id)?;
        Value::write_null(&mut self.inner)?;
        Value::write_string(&mut self.inner, &command.publishing_name)?;
        Value::write_string(&mut self.inner, &command.publishing_type)?;
        Ok(())
    }

    pub fn write_close_stream_request(
        &mut self,
        command: &CloseStreamCommand,
    ) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, c2s_command_names::CLOSE_STREAM)?;
        Value::write_number(&mut self.inner, command.transaction_id)?;
        Value::write_null(&mut self.inner)?;
        Ok(())
    }

    pub fn write_delete_stream_request(
        &mut self,
        command: &DeleteStreamCommand,
    ) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, c2s_command_names::DELETE_STREAM)?;
        Value::write_number(&mut self.inner, command.transaction_id)?;
        Value::write_null(&mut self.inner)?;
        Value::write_number(&mut self.inner, command.stream_id)?;
        Ok(())
    }

    fn write_unknown(&mut self, command: &UnknownCommand) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, &command.command_name)?;
        if let Some(transaction_id) = command.transaction_id {
            Value::write_number(&mut self.inner, transaction_id)?;
        }
        for argument in &command.arguments {
            argument.write_to(&mut self.inner)?;
        }
        Ok(())
    }

    /// The `_result` a connect is answered with.
    pub fn write_connect_result(
        &mut self,
        transaction_id: f64,
        fms_ver: &str,
        capabilities: f64,
        level: &str,
        code: &str,
        description: &str,
    ) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, s2c_command_names::RESULT)?;
        Value::write_number(&mut self.inner, transaction_id)?;
        Value::write_object(
            &mut self.inner,
            &[
                ("fmsVer".to_string(), Value::String(fms_ver.to_string())),
                ("capabilities".to_string(), Value::Number(capabilities)),
            ],
        )?;
        Value::write_object(
            &mut self.inner,
            &[
                ("level".to_string(), Value::String(level.to_string())),
                ("code".to_string(), Value::String(code.to_string())),
                (
                    "description".to_string(),
                    Value::String(description.to_string()),
                ),
                ("objectEncoding".to_string(), Value::Number(0.0)),
            ],
        )?;
        Ok(())
    }

    /// The `_result` a createStream is answered with, carrying the allocated
    /// stream id.
    pub fn write_create_stream_result(
        &mut self,
        transaction_id: f64,
        stream_id: f64,
    ) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, s2c_command_names::RESULT)?;
        Value::write_number(&mut self.inner, transaction_id)?;
        Value::write_null(&mut self.inner)?;
        Value::write_number(&mut self.inner, stream_id)?;
        Ok(())
    }

    pub fn write_on_status(
        &mut self,
        level: &str,
        code: &str,
        description: &str,
    ) -> CommandMessageResult<()> {
        Value::write_string(&mut self.inner, s2c_command_names::ON_STATUS)?;
        Value::write_number(&mut self.inner, 0.0)?;
        Value::write_null(&mut self.inner)?;
        Value::write_object(
            &mut self.inner,
            &[
                ("level".to_string(), Value::String(level.to_string())),
                ("code".to_string(), Value::String(code.to_string())),
                (
                    "description".to_string(),
                    Value::String(description.to_string()),
                ),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use amf_formats::{Value, amf0};

    use crate::commands::{
        CommandMessage, ConnectCommand, NetConnectionCommand, NetStreamCommand, PublishCommand,
    };

    use super::Writer;

    #[test]
    fn connect_round_trip() {
        let command = ConnectCommand {
            transaction_id: 1.0,
            command_object: vec![
                ("app".to_string(), Value::String("live".to_string())),
                (
                    "tcUrl".to_string(),
                    Value::String("rtmp://localhost/live".to_string()),
                ),
            ],
            optional_user_arguments: None,
        };
        let mut buf = Vec::new();
        Writer::new(&mut buf).write_connect_request(&command).unwrap();

        let decoded = CommandMessage::read_from(&buf[..]).unwrap();
        match decoded {
            CommandMessage::NetConnection(NetConnectionCommand::Connect(decoded)) => {
                assert_eq!(decoded.transaction_id, 1.0);
                assert_eq!(decoded.app(), Some("live"));
                assert_eq!(decoded.tc_url(), Some("rtmp://localhost/live"));
            }
            other => panic!("expect a connect command, got {:?}", other),
        }
    }

    #[test]
    fn publish_round_trip() {
        let command = PublishCommand {
            transaction_id: 0.0,
            publishing_name: "streamX".to_string(),
            publishing_type: "live".to_string(),
        };
        let mut buf = Vec::new();
        Writer::new(&mut buf).write_publish_request(&command).unwrap();

        let decoded = CommandMessage::read_from(&buf[..]).unwrap();
        match decoded {
            CommandMessage::NetStream(NetStreamCommand::Publish(decoded)) => {
                assert_eq!(decoded.publishing_name, "streamX");
                assert_eq!(decoded.publishing_type, "live");
            }
            other => panic!("expect a publish command, got {:?}", other),
        }
    }

    #[test]
    fn unknown_command_keeps_its_name() {
        let mut buf = Vec::new();
        Value::write_string(&mut buf, "releaseStream").unwrap();
        Value::write_number(&mut buf, 2.0).unwrap();
        Value::write_null(&mut buf).unwrap();
        Value::write_string(&mut buf, "streamX").unwrap();

        let decoded = CommandMessage::read_from(&buf[..]).unwrap();
        match decoded {
            CommandMessage::Unknown(command) => {
                assert_eq!(command.command_name, "releaseStream");
                assert_eq!(command.transaction_id, Some(2.0));
                assert_eq!(command.arguments.len(), 2);
            }
            other => panic!("expect an unknown command, got {:?}", other),
        }
    }

    #[test]
    fn create_stream_result_shape() {
        let mut buf = Vec::new();
        Writer::new(&mut buf)
            .write_create_stream_result(2.0, 1.0)
            .unwrap();
        let values = amf0::Reader::new(&buf[..]).read_all().unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[0].try_as_str(), Some("_result"));
        assert_eq!(values[1].try_as_f64(), Some(2.0));
        assert_eq!(values[2], Value::Null);
        assert_eq!(values[3].try_as_f64(), Some(1.0));
    }

    #[test]
    fn connect_result_shape() {
        let mut buf = Vec::new();
        Writer::new(&mut buf)
            .write_connect_result(
                1.0,
                "FMS/3,0,123",
                31.0,
                "status",
                "NetConnection.Connect.Success",
                "Connection succeeds",
            )
            .unwrap();
        let values = amf0::Reader::new(&buf[..]).read_all().unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[0].try_as_str(), Some("_result"));
        assert_eq!(values[1].try_as_f64(), Some(1.0));
        let properties = values[2].try_as_pairs().unwrap();
        assert_eq!(properties[0].1.try_as_str(), Some("FMS/3,0,123"));
        assert_eq!(properties[1].1.try_as_f64(), Some(31.0));
        let information = values[3].try_as_pairs().unwrap();
        assert_eq!(
            information[1].1.try_as_str(),
            Some("NetConnection.Connect.Success")
        );
    }
}
