use std::{fs, io::BufWriter, path::PathBuf};

use clap::Parser;
use flv_formats::{FlvFileWriter, FlvTagType, errors::FlvResult};
use rtmp_formats::{
    commands::PublishCommand,
    data::MetaData,
    message::{AudioMessage, VideoMessage},
};
use rtmp_server::{
    config::RtmpServerConfig, errors::RtmpServerError, handler::SessionHandler,
    server::RtmpServer,
};
use tokio::signal;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ingest_server", about = "RTMP ingest server dumping published streams to FLV")]
struct Cli {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0")]
    address: String,

    /// Listen port
    #[arg(long, default_value_t = 1935)]
    port: u16,

    /// Directory FLV recordings land in
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Optional TOML config file, overrides the flags above
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct AppConfig {
    address: String,
    port: u16,
    output_dir: PathBuf,
    chunk_size: u32,
}

impl AppConfig {
    fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        let defaults = AppConfig {
            address: cli.address.clone(),
            port: cli.port,
            output_dir: cli.output_dir.clone(),
            chunk_size: rtmp_server::consts::DEFAULT_OUT_CHUNK_SIZE,
        };
        let Some(path) = &cli.config else {
            return Ok(defaults);
        };
        config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .add_source(config::Environment::with_prefix("INGEST"))
            .set_default("address", defaults.address.clone())?
            .set_default("port", defaults.port as i64)?
            .set_default(
                "output_dir",
                defaults.output_dir.to_string_lossy().to_string(),
            )?
            .set_default("chunk_size", defaults.chunk_size as i64)?
            .build()?
            .try_deserialize()
    }
}

/// Writes every published stream to `<output_dir>/<publishing_name>.flv`,
/// metadata as a script tag, audio and video passed through.
struct FlvDumpHandler {
    output_dir: PathBuf,
    flv: Option<FlvFileWriter<BufWriter<fs::File>>>,
}

impl FlvDumpHandler {
    fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            flv: None,
        }
    }

    fn open_output(&mut self, publishing_name: &str) -> FlvResult<()> {
        let file_name: String = publishing_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        let path = self.output_dir.join(format!("{}.flv", file_name));
        let file = fs::File::create(&path)?;
        self.flv = Some(FlvFileWriter::new(BufWriter::new(file))?);
        tracing::info!("recording to {}", path.display());
        Ok(())
    }
}

impl SessionHandler for FlvDumpHandler {
    async fn on_ns_publish(&mut self, command: &PublishCommand) {
        if let Err(err) = self.open_output(&command.publishing_name) {
            tracing::error!(
                "could not open output for {}: {}",
                command.publishing_name,
                err
            );
        }
    }

    async fn on_metadata(&mut self, metadata: &MetaData) {
        let Some(flv) = &mut self.flv else { return };
        match metadata.to_flv_body() {
            Ok(body) => {
                if let Err(err) = flv.write(0, &body, FlvTagType::Script) {
                    tracing::error!("metadata write failed: {}", err);
                }
            }
            Err(err) => tracing::error!("metadata encode failed: {}", err),
        }
    }

    async fn on_audio_message(&mut self, message: &AudioMessage, timestamp: u32) {
        let Some(flv) = &mut self.flv else { return };
        if let Err(err) = flv.write(timestamp, &message.payload, FlvTagType::Audio) {
            tracing::error!("audio write failed: {}", err);
        }
    }

    async fn on_video_message(&mut self, message: &VideoMessage, timestamp: u32) {
        let Some(flv) = &mut self.flv else { return };
        if let Err(err) = flv.write(timestamp, &message.payload, FlvTagType::Video) {
            tracing::error!("video write failed: {}", err);
        }
    }

    async fn on_stream_closed(&mut self, _error: &RtmpServerError) {
        tracing::info!("publisher disconnected");
    }

    async fn cleanup(&mut self) {
        // dropping the writer flushes the BufWriter
        self.flv = None;
    }
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .compact()
        .with_target(true)
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::dispatcher::set_global_default(tracing::Dispatch::new(subscriber))
        .expect("subscriber set once at startup");

    let cli = Cli::parse();
    let app_config = match AppConfig::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("config load failed: {}", err);
            std::process::exit(1);
        }
    };

    let server_config = RtmpServerConfig {
        address: app_config.address.clone(),
        port: app_config.port,
        chunk_size: app_config.chunk_size,
    };
    let output_dir = app_config.output_dir.clone();
    if let Err(err) = fs::create_dir_all(&output_dir) {
        tracing::error!("could not create {}: {}", output_dir.display(), err);
        std::process::exit(1);
    }

    let mut server = RtmpServer::new(server_config, move || {
        FlvDumpHandler::new(output_dir.clone())
    })
    .on_started(|| tracing::info!("ingest server started"))
    .on_stopped(|| tracing::info!("ingest server stopped"));

    if let Err(err) = server.start().await {
        tracing::error!("server start failed: {}", err);
        std::process::exit(1);
    }

    let _ = signal::ctrl_c().await;
    tracing::info!("shutting down");
    server.stop();
    server.wait_closed().await;
}
