use std::{
    collections::HashMap,
    io,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use tokio::{
    io::{AsyncRead, AsyncWrite, ReadBuf},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::bytes::{Buf, Bytes};
use uuid::Uuid;

use crate::{
    config::RtmpSessionConfig,
    errors::{RtmpServerError, RtmpServerResult},
    handler::SessionHandler,
    session::RtmpSession,
};

/// Response header values an HTTP binding must use.
pub const CONTENT_TYPE: &str = "application/x-fcs";
pub const CACHE_CONTROL: &str = "no-cache";

const DELAY_STEP: u8 = 10;

/// The session end of the tunnel: reads come from the byte channel the
/// POST bodies are fed into, writes land in a shared buffer the next poll
/// drains. A plain [`RtmpSession`] runs over this unchanged.
pub struct TunnelTransport {
    incoming: mpsc::UnboundedReceiver<Bytes>,
    pending: Bytes,
    outgoing: Arc<Mutex<Vec<u8>>>,
}

impl AsyncRead for TunnelTransport {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.pending.is_empty() {
            match self.incoming.poll_recv(cx) {
                Poll::Ready(Some(bytes)) => self.pending = bytes,
                // channel closed: EOF, the session sees a clean disconnect
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }
        let take = self.pending.len().min(buf.remaining());
        buf.put_slice(&self.pending[..take]);
        self.pending.advance(take);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for TunnelTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut outgoing = self
            .outgoing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        outgoing.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

struct TunnelSession {
    feed: mpsc::UnboundedSender<Bytes>,
    outgoing: Arc<Mutex<Vec<u8>>>,
    delay: u8,
    task: JoinHandle<()>,
}

impl TunnelSession {
    /// Builds a poll response: the one-byte delay hint, then whatever the
    /// session produced. The hint starts at 0, grows by 10 per empty poll,
    /// saturates at 255 and resets whenever payload goes out.
    async fn poll_output(&mut self) -> Vec<u8> {
        let mut response = vec![self.delay];
        self.delay = self.delay.saturating_add(DELAY_STEP);
        loop {
            tokio::task::yield_now().await;
            let drained = {
                let mut outgoing = self
                    .outgoing
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                std::mem::take(&mut *outgoing)
            };
            if drained.is_empty() {
                break;
            }
            response.extend_from_slice(&drained);
            self.delay = 0;
        }
        response
    }
}

/// HTTP-tunneled RTMP, framework-agnostic: the four POST endpoints
/// (`/open/<seg>`, `/send/<sid>/<seg>`, `/idle/<sid>/<seg>`,
/// `/close/<sid>/<seg>`) map 1:1 onto the methods here. Each tunnel runs a
/// full session task over a [`TunnelTransport`].
pub struct RtmptServer<F, H>
where
    F: Fn() -> H + Send + Sync,
    H: SessionHandler + 'static,
{
    sessions: HashMap<String, TunnelSession>,
    handler_factory: F,
    session_config: RtmpSessionConfig,
}

impl<F, H> RtmptServer<F, H>
where
    F: Fn() -> H + Send + Sync,
    H: SessionHandler + 'static,
{
    pub fn new(session_config: RtmpSessionConfig, handler_factory: F) -> Self {
        Self {
            sessions: HashMap::new(),
            handler_factory,
            session_config,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Mints a session id and spawns the session task behind it.
    pub fn open(&mut self) -> String {
        let session_id = Uuid::now_v7().simple().to_string();
        let (feed, incoming) = mpsc::unbounded_channel();
        let outgoing = Arc::new(Mutex::new(Vec::new()));
        let transport = TunnelTransport {
            incoming,
            pending: Bytes::new(),
            outgoing: outgoing.clone(),
        };

        let handler = (self.handler_factory)();
        let mut session = RtmpSession::new(transport, handler, self.session_config.clone());
        let task = tokio::spawn(async move {
            let _ = session.run().await;
        });

        tracing::debug!("rtmpt session opened: {}", session_id);
        self.sessions.insert(
            session_id.clone(),
            TunnelSession {
                feed,
                outgoing,
                delay: 0,
                task,
            },
        );
        session_id
    }

    /// Feeds a POST body into the session and returns pending output.
    pub async fn send(&mut self, session_id: &str, body: &[u8]) -> RtmpServerResult<Vec<u8>> {
        let session = self.session_mut(session_id)?;
        if !body.is_empty() {
            // a send failure means the session task already finished, the
            // poll below still drains whatever it left behind
            let _ = session.feed.send(Bytes::copy_from_slice(body));
        }
        Ok(session.poll_output().await)
    }

    /// Drains server-to-client bytes without feeding anything.
    pub async fn idle(&mut self, session_id: &str) -> RtmpServerResult<Vec<u8>> {
        let session = self.session_mut(session_id)?;
        Ok(session.poll_output().await)
    }

    /// Tears the session down, returning the final pending output.
    pub async fn close(&mut self, session_id: &str) -> RtmpServerResult<Vec<u8>> {
        let mut session = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| RtmpServerError::UnknownTunnelSession(session_id.to_string()))?;
        let response = session.poll_output().await;
        // dropping the feed half closes the channel, the session unwinds
        // through its stream-closed path
        drop(session.feed);
        let _ = session.task;
        tracing::debug!("rtmpt session closed: {}", session_id);
        Ok(response)
    }

    fn session_mut(&mut self, session_id: &str) -> RtmpServerResult<&mut TunnelSession> {
        self.sessions
            .get_mut(session_id)
            .ok_or_else(|| RtmpServerError::UnknownTunnelSession(session_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::handler::DefaultSessionHandler;

    use super::*;

    #[tokio::test]
    async fn unknown_session_is_rejected() {
        let mut server = RtmptServer::new(RtmpSessionConfig::default(), || DefaultSessionHandler);
        let err = server.idle("nope").await.unwrap_err();
        assert!(matches!(err, RtmpServerError::UnknownTunnelSession(_)));
    }

    #[tokio::test]
    async fn polling_delay_grows_and_saturates() {
        let mut server = RtmptServer::new(RtmpSessionConfig::default(), || DefaultSessionHandler);
        let sid = server.open();

        let mut hints = Vec::new();
        for _ in 0..30 {
            let response = server.idle(&sid).await.unwrap();
            assert_eq!(response.len(), 1, "no payload expected before any input");
            hints.push(response[0]);
        }
        assert_eq!(&hints[..4], &[0, 10, 20, 30]);
        assert_eq!(*hints.last().unwrap(), 255);
    }

    #[tokio::test]
    async fn handshake_over_the_tunnel_resets_delay() {
        let mut server = RtmptServer::new(RtmpSessionConfig::default(), || DefaultSessionHandler);
        let sid = server.open();

        // age the delay with empty polls
        for _ in 0..3 {
            server.idle(&sid).await.unwrap();
        }

        // C0 + C1
        let mut c0c1 = vec![0x03];
        c0c1.extend_from_slice(&[0u8; 8]);
        c0c1.extend_from_slice(&[0xAA; 1528]);
        let mut collected = server.send(&sid, &c0c1).await.unwrap()[1..].to_vec();

        // the session task needs scheduling time, poll until S0S1S2 arrives
        for _ in 0..100 {
            if collected.len() >= 1 + 2 * 1536 {
                break;
            }
            let response = server.idle(&sid).await.unwrap();
            collected.extend_from_slice(&response[1..]);
        }
        assert_eq!(collected.len(), 1 + 2 * 1536);
        assert_eq!(collected[0], 0x03);

        // a poll right after data flowed reports delay 0 again
        let response = server.idle(&sid).await.unwrap();
        assert_eq!(response[0], 0);

        server.close(&sid).await.unwrap();
        assert_eq!(server.session_count(), 0);
    }
}
