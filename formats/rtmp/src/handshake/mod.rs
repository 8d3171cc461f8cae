pub mod consts;
pub mod errors;
pub mod reader;
pub mod server;
pub mod writer;

use consts::RANDOM_ECHO_SIZE;

/// +-------------+                +-------------+
/// |    Client   | TCP/IP Network |    Server   |
/// +-------------+       |        +-------------+
///        |              |               |
///  Uninitialized        |         Uninitialized
///        |      C0      |               |
///        |------------->|        C0     |
///        |              |-------------->|
///        |      C1      |               |
///        |------------->|        S0     |
///        |              |<--------------|
///        |              |        S1     |
///  Version sent         |<--------------|
///        |      S0      |               |
///        |<-------------|               |
///        |      S1      |               |
///        |<-------------|         Version sent
///        |              |        C1     |
///        |              |-------------->|
///        |      C2      |               |
///        |------------->|        S2     |
///        |              |<--------------|
///     Ack sent          |            Ack Sent
///        |      S2      |               |
///        |<-------------|               |
///        |              |        C2     |
///        |              |-------------->|
///   Handshake Done      |          Handshake Done
///        |              |               |
///     Pictorial Representation of Handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeServerState {
    Uninitialized,
    C0c1Received,
    S0s1s2Sent,
    Done,
}

#[derive(Debug, Clone, Copy)]
pub struct C0S0Packet {
    pub version: u8,
}

pub struct C1S1Packet {
    pub time: u32,
    pub zero: u32,
    pub random_bytes: [u8; RANDOM_ECHO_SIZE],
}

pub struct C2S2Packet {
    pub time1: u32,
    pub time2: u32,
    pub random_echo: [u8; RANDOM_ECHO_SIZE],
}
