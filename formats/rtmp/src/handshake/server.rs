use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use utils::traits::writer::WriteTo;

use crate::bitio::BitStreamReader;

use super::{
    C0S0Packet, C1S1Packet, C2S2Packet, HandshakeServerState,
    consts::{RANDOM_ECHO_SIZE, RTMP_HANDSHAKE_SIZE},
    errors::HandshakeResult,
};

/// Server side of the plain 1537-byte handshake: S1 carries fresh random
/// bytes, S2 echoes the client's C1 time and random block.
#[derive(Debug)]
pub struct HandshakeServer {
    state: HandshakeServerState,
}

impl HandshakeServer {
    pub fn new() -> Self {
        Self {
            state: HandshakeServerState::Uninitialized,
        }
    }

    pub fn state(&self) -> &HandshakeServerState {
        &self.state
    }

    pub async fn handshake<R, W>(
        &mut self,
        bits: &mut BitStreamReader<R>,
        writer: &mut W,
    ) -> HandshakeResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut client_version = 0;
        let mut client_c1: Option<C1S1Packet> = None;
        loop {
            tracing::trace!("handshake with state: {:?}", self.state);
            match self.state {
                HandshakeServerState::Uninitialized => {
                    let c0 = C0S0Packet::read_from(bits).await?;
                    client_version = c0.version;
                    client_c1 = Some(C1S1Packet::read_from(bits).await?);
                    self.state = HandshakeServerState::C0c1Received;
                }
                HandshakeServerState::C0c1Received => {
                    let c1 = client_c1.take().expect("c0c1 state implies a stored c1");
                    let mut response = Vec::with_capacity(1 + 2 * RTMP_HANDSHAKE_SIZE);

                    C0S0Packet {
                        version: client_version,
                    }
                    .write_to(&mut response)?;

                    let mut random_bytes = [0u8; RANDOM_ECHO_SIZE];
                    utils::random::random_fill(&mut random_bytes);
                    C1S1Packet {
                        time: 0,
                        zero: 0,
                        random_bytes,
                    }
                    .write_to(&mut response)?;

                    C2S2Packet {
                        time1: c1.time,
                        time2: c1.time,
                        random_echo: c1.random_bytes,
                    }
                    .write_to(&mut response)?;

                    writer.write_all(&response).await?;
                    writer.flush().await?;
                    self.state = HandshakeServerState::S0s1s2Sent;
                }
                HandshakeServerState::S0s1s2Sent => {
                    let _ = C2S2Packet::read_from(bits).await?;
                    self.state = HandshakeServerState::Done;
                }
                HandshakeServerState::Done => break,
            }
        }
        Ok(())
    }
}

impl Default for HandshakeServer {
    fn default() -> Self {
        Self::new()
    }
}
