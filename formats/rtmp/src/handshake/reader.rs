use tokio::io::AsyncRead;

use crate::bitio::BitStreamReader;

use super::{
    C0S0Packet, C1S1Packet, C2S2Packet, consts::RANDOM_ECHO_SIZE, errors::HandshakeResult,
};

impl C0S0Packet {
    pub async fn read_from<R>(bits: &mut BitStreamReader<R>) -> HandshakeResult<C0S0Packet>
    where
        R: AsyncRead + Unpin,
    {
        let version = bits.read_u8().await?;
        Ok(C0S0Packet { version })
    }
}

impl C1S1Packet {
    pub async fn read_from<R>(bits: &mut BitStreamReader<R>) -> HandshakeResult<C1S1Packet>
    where
        R: AsyncRead + Unpin,
    {
        let time = bits.read_u32().await?;
        let zero = bits.read_u32().await?;
        let random = bits.read_bytes(RANDOM_ECHO_SIZE).await?;
        let mut random_bytes = [0u8; RANDOM_ECHO_SIZE];
        random_bytes.copy_from_slice(&random);
        Ok(C1S1Packet {
            time,
            zero,
            random_bytes,
        })
    }
}

impl C2S2Packet {
    pub async fn read_from<R>(bits: &mut BitStreamReader<R>) -> HandshakeResult<C2S2Packet>
    where
        R: AsyncRead + Unpin,
    {
        let time1 = bits.read_u32().await?;
        let time2 = bits.read_u32().await?;
        let random = bits.read_bytes(RANDOM_ECHO_SIZE).await?;
        let mut random_echo = [0u8; RANDOM_ECHO_SIZE];
        random_echo.copy_from_slice(&random);
        Ok(C2S2Packet {
            time1,
            time2,
            random_echo,
        })
    }
}
