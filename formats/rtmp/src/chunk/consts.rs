pub const MAX_TIMESTAMP: u32 = 0xFFFFFF;
pub const DEFAULT_CHUNK_SIZE: usize = 128;

pub const MIN_CSID: u32 = 2;
pub const MAX_CSID: u32 = 65599;

pub mod csid {
    use crate::{
        protocol_control::consts::PROTOCOL_CONTROL_CSID, user_control::consts::USER_CONTROL_CSID,
    };

    pub const PROTOCOL_CONTROL: u32 = PROTOCOL_CONTROL_CSID;
    pub const USER_CONTROL: u32 = USER_CONTROL_CSID;
    pub const COMMAND: u32 = 0x03;
}
