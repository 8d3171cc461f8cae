pub const FMS_VER: &str = "FMS/3,0,123";
pub const FMS_CAPABILITIES: f64 = 31.0;

/// Acknowledgement window offered to the peer on connect.
pub const WINDOW_ACK_SIZE: u32 = 5_000_000;

/// Outbound chunk size announced right after connect.
pub const DEFAULT_OUT_CHUNK_SIZE: u32 = 8192;

/// The lone stream id handed out by createStream.
pub const PUBLISH_STREAM_ID: u32 = 1;

pub mod response_code {
    pub const NET_CONNECTION_CONNECT_SUCCESS: &str = "NetConnection.Connect.Success";
    pub const NET_STREAM_PUBLISH_START: &str = "NetStream.Publish.Start";
}

pub mod response_level {
    pub const STATUS: &str = "status";
}

pub mod response_description {
    pub const CONNECT_SUCCESS: &str = "Connection succeeds";
    pub const PUBLISH_START: &str = "Start publishing";
}
