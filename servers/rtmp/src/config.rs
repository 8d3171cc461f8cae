#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RtmpServerConfig {
    pub address: String,
    pub port: u16,
    /// outbound chunk size announced right after connect
    pub chunk_size: u32,
}

impl Default for RtmpServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 1935,
            chunk_size: crate::consts::DEFAULT_OUT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RtmpSessionConfig {
    pub chunk_size: u32,
}

impl Default for RtmpSessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::consts::DEFAULT_OUT_CHUNK_SIZE,
        }
    }
}

impl From<&RtmpServerConfig> for RtmpSessionConfig {
    fn from(config: &RtmpServerConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
        }
    }
}
