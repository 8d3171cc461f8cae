use std::io;

use amf_formats::{Value, amf0};

use super::{
    CloseStreamCommand, CommandMessage, ConnectCommand, CreateStreamCommand, DeleteStreamCommand,
    NetConnectionCommand, NetStreamCommand, PublishCommand, UnknownCommand,
    consts::c2s_command_names,
    errors::{CommandMessageError, CommandMessageResult},
};

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

    pub fn read(&mut self) -> CommandMessageResult<CommandMessage> {
        let command_name = self.read_string("command name")?;
        match command_name.as_str() {
            c2s_command_names::CONNECT => Ok(CommandMessage::NetConnection(
                NetConnectionCommand::Connect(self.read_connect()?),
            )),
            c2s_command_names::CREATE_STREAM => Ok(CommandMessage::NetConnection(
                NetConnectionCommand::CreateStream(self.read_create_stream()?),
            )),
            c2s_command_names::PUBLISH => Ok(CommandMessage::NetStream(
                NetStreamCommand::Publish(self.read_publish()?),
            )),
            c2s_command_names::CLOSE_STREAM => Ok(CommandMessage::NetStream(
                NetStreamCommand::CloseStream(self.read_close_stream()?),
            )),
            c2s_command_names::DELETE_STREAM => Ok(CommandMessage::NetStream(
                NetStreamCommand::DeleteStream(self.read_delete_stream()?),
            )),
            _ => Ok(CommandMessage::Unknown(self.read_unknown(command_name)?)),
        }
    }

    fn read_connect(&mut self) -> CommandMessageResult<ConnectCommand> {
        let transaction_id = self.read_number("transaction id")?;
        if transaction_id != 1.0 {
            tracing::warn!(
                "connect transaction_id should be 1, got {} instead",
                transaction_id
            );
        }
        let command_object = self.read_object_pairs("command object")?;
        let optional_user_arguments = self.inner.read()?;
        Ok(ConnectCommand {
            transaction_id,
            command_object,
            optional_user_arguments,
        })
    }

    fn read_create_stream(&mut self) -> CommandMessageResult<CreateStreamCommand> {
        let transaction_id = self.read_number("transaction id")?;
        let command_object = self.read_value("command object")?;
        Ok(CreateStreamCommand {
            transaction_id,
            command_object,
        })
    }

    fn read_publish(&mut self) -> CommandMessageResult<PublishCommand> {
        let transaction_id = self.read_number("transaction id")?;
        // the command object slot of NetStream commands is always null
        let _command_object = self.read_value("command object")?;
        let publishing_name = self.read_string("publishing name")?;
        let publishing_type = self.read_string("publishing type")?;
        Ok(PublishCommand {
            transaction_id,
            publishing_name,
            publishing_type,
        })
    }

    fn read_close_stream(&mut self) -> CommandMessageResult<CloseStreamCommand> {
        let transaction_id = self.read_number("transaction id")?;
        let _command_object = self.inner.read()?;
        Ok(CloseStreamCommand { transaction_id })
    }

    fn read_delete_stream(&mut self) -> CommandMessageResult<DeleteStreamCommand> {
        let transaction_id = self.read_number("transaction id")?;
        let _command_object = self.read_value("command object")?;
        let stream_id = self.read_number("stream id")?;
        Ok(DeleteStreamCommand {
            transaction_id,
            stream_id,
        })
    }

    fn read_unknown(&mut self, command_name: String) -> CommandMessageResult<UnknownCommand> {
        let mut arguments = Vec::new();
        let transaction_id = match self.inner.read()? {
            Some(Value::Number(transaction_id)) => Some(transaction_id),
            Some(other) => {
                arguments.push(other);
                None
            }
            None => None,
        };
        arguments.extend(self.inner.read_all()?);
        Ok(UnknownCommand {
            command_name,
            transaction_id,
            arguments,
        })
    }

    fn read_value(&mut self, what: &str) -> CommandMessageResult<Value> {
        self.inner.read()?.ok_or_else(|| {
            CommandMessageError::UnexpectedAmfType(format!("expect {}, got end of payload", what))
        })
    }

    fn read_string(&mut self, what: &str) -> CommandMessageResult<String> {
        match self.read_value(what)? {
            Value::String(value) => Ok(value),
            other => Err(CommandMessageError::UnexpectedAmfType(format!(
                "expect {} to be a string, got {:?}",
                what, other
            ))),
        }
    }

    fn read_number(&mut self, what: &str) -> CommandMessageResult<f64> {
        match self.read_value(what)? {
            Value::Number(value) => Ok(value),
            other => Err(CommandMessageError::UnexpectedAmfType(format!(
                "expect {} to be a number, got {:?}",
                what, other
            ))),
        }
    }

    fn read_object_pairs(&mut self, what: &str) -> CommandMessageResult<Vec<(String, Value)>> {
        match self.read_value(what)? {
            Value::Object(entries) | Value::EcmaArray(entries) => Ok(entries),
            Value::Null => Ok(Vec::new()),
            other => Err(CommandMessageError::UnexpectedAmfType(format!(
                "expect {} to be an object, got {:?}",
                what, other
            ))),
        }
    }
}
