// @see: 7.2.1. NetConnection Commands, 7.2.2. NetStream Commands
pub mod c2s_command_names {
    pub const CONNECT: &str = "connect";
    pub const CALL: &str = "call";
    pub const CLOSE: &str = "close";
    pub const CREATE_STREAM: &str = "createStream";
    pub const PLAY: &str = "play";
    pub const PLAY2: &str = "play2";
    pub const DELETE_STREAM: &str = "deleteStream";
    pub const CLOSE_STREAM: &str = "closeStream";
    pub const RECEIVE_AUDIO: &str = "receiveAudio";
    pub const RECEIVE_VIDEO: &str = "receiveVideo";
    pub const PUBLISH: &str = "publish";
    pub const SEEK: &str = "seek";
    pub const PAUSE: &str = "pause";
}

pub mod s2c_command_names {
    pub const RESULT: &str = "_result";
    pub const ERROR: &str = "_error";
    pub const ON_STATUS: &str = "onStatus";
}

/// Names the NetConnection dispatcher owns.
pub const NET_CONNECTION_COMMANDS: [&str; 4] = [
    c2s_command_names::CONNECT,
    c2s_command_names::CALL,
    c2s_command_names::CLOSE,
    c2s_command_names::CREATE_STREAM,
];

/// Names the NetStream dispatcher owns.
pub const NET_STREAM_COMMANDS: [&str; 10] = [
    c2s_command_names::PLAY,
    c2s_command_names::PLAY2,
    c2s_command_names::DELETE_STREAM,
    c2s_command_names::CLOSE_STREAM,
    c2s_command_names::RECEIVE_AUDIO,
    c2s_command_names::RECEIVE_VIDEO,
    c2s_command_names::PUBLISH,
    c2s_command_names::SEEK,
    c2s_command_names::PAUSE,
    s2c_command_names::ON_STATUS,
];
