pub const PROTOCOL_CONTROL_CSID: u32 = 2;
