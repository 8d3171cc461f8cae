use std::sync::Arc;

use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{RtmpServerConfig, RtmpSessionConfig},
    errors::RtmpServerResult,
    handler::SessionHandler,
    session::RtmpSession,
};

type LifecycleCallback = Arc<dyn Fn() + Send + Sync>;

/// TCP listener front of the ingest server. Every accepted connection gets
/// its own session task with a fresh handler from the factory; session
/// failures never cross sessions or stop the accept loop.
pub struct RtmpServer<F, H>
where
    F: Fn() -> H + Send + Sync + 'static,
    H: SessionHandler + 'static,
{
    config: RtmpServerConfig,
    handler_factory: Arc<F>,
    cancel: CancellationToken,
    accept_task: Option<JoinHandle<()>>,
    on_started: Option<LifecycleCallback>,
    on_stopped: Option<LifecycleCallback>,
}

impl<F, H> RtmpServer<F, H>
where
    F: Fn() -> H + Send + Sync + 'static,
    H: SessionHandler + 'static,
{
    pub fn new(config: RtmpServerConfig, handler_factory: F) -> Self {
        Self {
            config,
            handler_factory: Arc::new(handler_factory),
            cancel: CancellationToken::new(),
            accept_task: None,
            on_started: None,
            on_stopped: None,
        }
    }

    pub fn on_started(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_started = Some(Arc::new(callback));
        self
    }

    pub fn on_stopped(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_stopped = Some(Arc::new(callback));
        self
    }

    /// Binds the listener and spawns the accept loop.
    pub async fn start(&mut self) -> RtmpServerResult<()> {
        let listener =
            TcpListener::bind((self.config.address.as_str(), self.config.port)).await?;
        tracing::info!("rtmp server listening on {}", listener.local_addr()?);
        if let Some(callback) = &self.on_started {
            callback();
        }

        let cancel = self.cancel.clone();
        let handler_factory = self.handler_factory.clone();
        let session_config = RtmpSessionConfig::from(&self.config);
        let on_stopped = self.on_stopped.clone();

        self.accept_task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    accepted = listener.accept() => {
                        match accepted {
                            Ok((stream, peer_addr)) => {
                                tracing::info!("got new rtmp connection, peer: {}", peer_addr);
                                let handler = (handler_factory)();
                                let mut session =
                                    RtmpSession::new(stream, handler, session_config.clone());
                                tokio::spawn(async move {
                                    match session.run().await {
                                        Ok(()) => tracing::info!(
                                            "rtmp session closed, peer: {}",
                                            peer_addr
                                        ),
                                        Err(err) => tracing::error!(
                                            "rtmp session failed, peer: {}: {}",
                                            peer_addr,
                                            err
                                        ),
                                    }
                                });
                            }
                            Err(err) => {
                                tracing::error!("accept failed: {}", err);
                            }
                        }
                    }
                }
            }
            tracing::info!("rtmp server stopped");
            if let Some(callback) = on_stopped {
                callback();
            }
        }));
        Ok(())
    }

    /// Requests the accept loop to stop; in-flight sessions keep running.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Waits for the accept loop to terminate.
    pub async fn wait_closed(&mut self) {
        if let Some(task) = self.accept_task.take() {
            let _ = task.await;
        }
    }
}
