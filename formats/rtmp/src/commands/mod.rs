use std::io;

use amf_formats::Value;

use errors::CommandMessageResult;

pub mod consts;
pub mod errors;
pub mod reader;
pub mod writer;

///! @see: 7.2.1.1. connect
#[derive(Debug, Clone)]
pub struct ConnectCommand {
    pub transaction_id: f64, // always 1
    pub command_object: Vec<(String, Value)>,
    pub optional_user_arguments: Option<Value>,
}

impl ConnectCommand {
    fn field(&self, key: &str) -> Option<&Value> {
        self.command_object
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn app(&self) -> Option<&str> {
        self.field("app").and_then(Value::try_as_str)
    }

    pub fn tc_url(&self) -> Option<&str> {
        self.field("tcUrl").and_then(Value::try_as_str)
    }

    pub fn flash_version(&self) -> Option<&str> {
        self.field("flashver").and_then(Value::try_as_str)
    }

    pub fn object_encoding(&self) -> Option<f64> {
        self.field("objectEncoding").and_then(Value::try_as_f64)
    }
}

///! @see: 7.2.1.3. createStream
#[derive(Debug, Clone)]
pub struct CreateStreamCommand {
    pub transaction_id: f64,
    pub command_object: Value,
}

///! @see: 7.2.2.6. publish
#[derive(Debug, Clone)]
pub struct PublishCommand {
    pub transaction_id: f64, // 0
    pub publishing_name: String,
    pub publishing_type: String, // "live", "record", "append"
}

#[derive(Debug, Clone)]
pub struct CloseStreamCommand {
    pub transaction_id: f64,
}

///! @see: 7.2.2.3. deleteStream
#[derive(Debug, Clone)]
pub struct DeleteStreamCommand {
    pub transaction_id: f64,
    pub stream_id: f64,
}

/// A syntactically valid command the session has no dedicated shape for
/// (ffmpeg's releaseStream and FCPublish land here).
#[derive(Debug, Clone)]
pub struct UnknownCommand {
    pub command_name: String,
    pub transaction_id: Option<f64>,
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone)]
pub enum NetConnectionCommand {
    Connect(ConnectCommand),
    CreateStream(CreateStreamCommand),
}

#[derive(Debug, Clone)]
pub enum NetStreamCommand {
    Publish(PublishCommand),
    CloseStream(CloseStreamCommand),
    DeleteStream(DeleteStreamCommand),
}

#[derive(Debug, Clone)]
pub enum CommandMessage {
    NetConnection(NetConnectionCommand),
    NetStream(NetStreamCommand),
    Unknown(UnknownCommand),
}

impl CommandMessage {
    pub fn read_from<R>(inner: R) -> CommandMessageResult<CommandMessage>
    where
        R: io::Read,
    {
        reader::Reader::new(inner).read()
    }

    pub fn command_name(&self) -> &str {
        match self {
            CommandMessage::NetConnection(NetConnectionCommand::Connect(_)) => {
                consts::c2s_command_names::CONNECT
            }
            CommandMessage::NetConnection(NetConnectionCommand::CreateStream(_)) => {
                consts::c2s_command_names::CREATE_STREAM
            }
            CommandMessage::NetStream(NetStreamCommand::Publish(_)) => {
                consts::c2s_command_names::PUBLISH
            }
            CommandMessage::NetStream(NetStreamCommand::CloseStream(_)) => {
                consts::c2s_command_names::CLOSE_STREAM
            }
            CommandMessage::NetStream(NetStreamCommand::DeleteStream(_)) => {
                consts::c2s_command_names::DELETE_STREAM
            }
            CommandMessage::Unknown(command) => command.command_name.as_str(),
        }
    }
}
