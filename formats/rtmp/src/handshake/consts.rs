pub const RTMP_HANDSHAKE_SIZE: usize = 1536;
pub const RANDOM_ECHO_SIZE: usize = 1528;
