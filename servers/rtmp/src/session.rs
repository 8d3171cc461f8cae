use rtmp_formats::{
    bitio::BitStreamReader,
    chunk::{self, ChunkMessage, consts::csid},
    commands::{CommandMessage, NetConnectionCommand, NetStreamCommand, PublishCommand},
    data::DataMessage,
    handshake,
    message::{RtmpMessageBody, RtmpMessageType, errors::MessageError},
    protocol_control::{
        Acknowledgement, ProtocolControlMessage, SetChunkSize, SetPeerBandwidth,
        SetPeerBandwidthLimitType, WindowAckSize,
    },
    user_control::UserControlEvent,
};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio_util::bytes::Bytes;

use crate::{
    config::RtmpSessionConfig,
    consts::{
        FMS_CAPABILITIES, FMS_VER, PUBLISH_STREAM_ID, WINDOW_ACK_SIZE, response_code,
        response_description, response_level,
    },
    errors::RtmpServerResult,
    handler::SessionHandler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Handshaking,
    Connected,
    Streaming,
    Closed,
}

/// One publisher connection: the handshake, the command negotiation, then
/// media until the peer goes away. Generic over the transport so the same
/// machine runs on TCP and on the RTMPT tunnel.
pub struct RtmpSession<IO, H>
where
    IO: AsyncRead + AsyncWrite + Unpin + Send,
    H: SessionHandler,
{
    bit_reader: BitStreamReader<ReadHalf<IO>>,
    write_half: WriteHalf<IO>,
    chunk_reader: chunk::reader::Reader,
    chunk_writer: chunk::writer::Writer,
    state: SessionState,
    handler: H,
    config: RtmpSessionConfig,
    ack_window: Option<u32>,
    last_acknowledged: u64,
    publishing_name: Option<String>,
}

impl<IO, H> RtmpSession<IO, H>
where
    IO: AsyncRead + AsyncWrite + Unpin + Send,
    H: SessionHandler,
{
    pub fn new(io: IO, handler: H, config: RtmpSessionConfig) -> Self {
        let (read_half, write_half) = tokio::io::split(io);
        Self {
            bit_reader: BitStreamReader::new(read_half),
            write_half,
            chunk_reader: chunk::reader::Reader::new(),
            chunk_writer: chunk::writer::Writer::new(),
            state: SessionState::Handshaking,
            handler,
            config,
            ack_window: None,
            last_acknowledged: 0,
            publishing_name: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn publishing_name(&self) -> Option<&str> {
        self.publishing_name.as_deref()
    }

    /// Drives the session to completion. A peer disconnect is a normal end
    /// and returns `Ok`; anything else is logged and surfaced, fatal for
    /// this session only.
    pub async fn run(&mut self) -> RtmpServerResult<()> {
        let err = match self.drive().await {
            Ok(never) => match never {},
            Err(err) => err,
        };
        self.state = SessionState::Closed;
        self.handler.on_stream_closed(&err).await;
        self.handler.cleanup().await;

        if err.is_stream_closed() {
            tracing::debug!("peer disconnected, session ends");
            return Ok(());
        }
        tracing::error!("session failed: {}", err);
        Err(err)
    }

    async fn drive(&mut self) -> RtmpServerResult<std::convert::Infallible> {
        handshake::server::HandshakeServer::new()
            .handshake(&mut self.bit_reader, &mut self.write_half)
            .await?;
        self.state = SessionState::Connected;
        self.handler.on_handshake().await;
        tracing::debug!("handshake done, entering chunk loop");

        loop {
            let message = self
                .chunk_reader
                .read_message(&mut self.bit_reader)
                .await?;
            self.process_message(message).await?;
            self.maybe_acknowledge().await?;
        }
    }

    async fn process_message(&mut self, message: ChunkMessage) -> RtmpServerResult<()> {
        let body = match RtmpMessageBody::read_from(&message) {
            Ok(body) => body,
            Err(MessageError::Io(err)) => {
                // a truncated or malformed payload, not worth the session
                tracing::warn!(
                    "malformed message payload, type_id: {}: {}",
                    message.message_type_id,
                    err
                );
                self.surface_unknown(&message).await;
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(
                    "unsupported message payload, type_id: {}: {}",
                    message.message_type_id,
                    err
                );
                self.surface_unknown(&message).await;
                return Ok(());
            }
        };
        tracing::trace!("got message: {:?}", body);

        match body {
            RtmpMessageBody::ProtocolControl(control) => {
                self.process_protocol_control(control).await?
            }
            RtmpMessageBody::UserControl(event) => self.process_user_control(event).await?,
            RtmpMessageBody::Command(command) => self.process_command(command, &message).await?,
            RtmpMessageBody::Data(DataMessage::MetaData(metadata)) => {
                self.handler.on_metadata(&metadata).await
            }
            RtmpMessageBody::Data(data) => {
                tracing::debug!("unhandled data message: {:?}", data);
                self.handler
                    .on_unknown_message(&RtmpMessageBody::Data(data))
                    .await
            }
            RtmpMessageBody::Audio(audio) => {
                self.handler.on_audio_message(&audio, message.timestamp).await
            }
            RtmpMessageBody::Video(video) => {
                self.handler.on_video_message(&video, message.timestamp).await
            }
            body @ RtmpMessageBody::Unknown { .. } => {
                tracing::debug!("unknown message type: {}", body.message_type_id());
                self.handler.on_unknown_message(&body).await
            }
        }
        Ok(())
    }

    async fn surface_unknown(&mut self, message: &ChunkMessage) {
        self.handler
            .on_unknown_message(&RtmpMessageBody::Unknown {
                type_id: message.message_type_id,
                payload: message.payload.clone(),
            })
            .await;
    }

    async fn process_protocol_control(
        &mut self,
        control: ProtocolControlMessage,
    ) -> RtmpServerResult<()> {
        match control {
            ProtocolControlMessage::SetChunkSize(SetChunkSize { chunk_size }) => {
                let old_size = self.chunk_reader.set_chunk_size(chunk_size as usize);
                tracing::trace!("peer chunk size: {} -> {}", old_size, chunk_size);
                self.handler.on_set_chunk_size(chunk_size).await;
            }
            ProtocolControlMessage::Abort(abort) => {
                tracing::debug!("abort chunk stream: {}", abort.chunk_stream_id);
                self.chunk_reader.abort(abort.chunk_stream_id);
            }
            ProtocolControlMessage::Ack(ack) => {
                tracing::trace!("peer acknowledged {} bytes", ack.sequence_number);
            }
            ProtocolControlMessage::WindowAckSize(WindowAckSize { size }) => {
                self.ack_window = Some(size);
                self.handler.on_window_acknowledgement_size(size).await;
            }
            ProtocolControlMessage::SetPeerBandwidth(bandwidth) => {
                tracing::trace!("peer bandwidth request ignored: {:?}", bandwidth);
            }
        }
        Ok(())
    }

    async fn process_user_control(&mut self, event: UserControlEvent) -> RtmpServerResult<()> {
        match event {
            UserControlEvent::PingRequest { timestamp } => {
                self.write_control(RtmpMessageBody::UserControl(
                    UserControlEvent::PingResponse { timestamp },
                ))?;
                self.drain().await?;
            }
            event => tracing::debug!("user control event: {:?}", event),
        }
        Ok(())
    }

    async fn process_command(
        &mut self,
        command: CommandMessage,
        message: &ChunkMessage,
    ) -> RtmpServerResult<()> {
        match command {
            CommandMessage::NetConnection(NetConnectionCommand::Connect(command)) => {
                self.process_connect(command, message.csid).await
            }
            CommandMessage::NetConnection(NetConnectionCommand::CreateStream(command)) => {
                let mut payload = Vec::new();
                rtmp_formats::commands::writer::Writer::new(&mut payload)
                    .write_create_stream_result(
                        command.transaction_id,
                        PUBLISH_STREAM_ID as f64,
                    )?;
                self.write_command_payload(message.csid, 0, payload)?;
                self.drain().await?;
                tracing::debug!("responded to createStream");
                self.handler.on_nc_create_stream(&command).await;
                Ok(())
            }
            CommandMessage::NetStream(NetStreamCommand::Publish(command)) => {
                self.process_publish(command, message.message_stream_id).await
            }
            CommandMessage::NetStream(NetStreamCommand::CloseStream(command)) => {
                tracing::debug!("closeStream received");
                self.handler.on_ns_close_stream(&command).await;
                Ok(())
            }
            CommandMessage::NetStream(NetStreamCommand::DeleteStream(command)) => {
                tracing::debug!("deleteStream received, stream id {}", command.stream_id);
                self.handler.on_ns_delete_stream(&command).await;
                Ok(())
            }
            CommandMessage::Unknown(ref unknown) => {
                tracing::debug!("unknown command: {}", unknown.command_name);
                self.handler
                    .on_unknown_message(&RtmpMessageBody::Command(command))
                    .await;
                Ok(())
            }
        }
    }

    async fn process_connect(
        &mut self,
        command: rtmp_formats::commands::ConnectCommand,
        command_csid: u32,
    ) -> RtmpServerResult<()> {
        self.write_control(RtmpMessageBody::ProtocolControl(
            ProtocolControlMessage::WindowAckSize(WindowAckSize {
                size: WINDOW_ACK_SIZE,
            }),
        ))?;
        self.write_control(RtmpMessageBody::ProtocolControl(
            ProtocolControlMessage::SetPeerBandwidth(SetPeerBandwidth {
                size: WINDOW_ACK_SIZE,
                limit_type: SetPeerBandwidthLimitType::Dynamic,
            }),
        ))?;
        self.write_control(RtmpMessageBody::UserControl(UserControlEvent::StreamBegin {
            stream_id: 0,
        }))?;
        self.write_control(RtmpMessageBody::ProtocolControl(
            ProtocolControlMessage::SetChunkSize(SetChunkSize {
                chunk_size: self.config.chunk_size,
            }),
        ))?;
        self.chunk_writer.set_chunk_size(self.config.chunk_size as usize);

        let mut payload = Vec::new();
        rtmp_formats::commands::writer::Writer::new(&mut payload).write_connect_result(
            command.transaction_id,
            FMS_VER,
            FMS_CAPABILITIES,
            response_level::STATUS,
            response_code::NET_CONNECTION_CONNECT_SUCCESS,
            response_description::CONNECT_SUCCESS,
        )?;
        self.write_command_payload(command_csid, 0, payload)?;
        self.drain().await?;

        tracing::debug!(
            "responded to connect, app: {:?}, tcUrl: {:?}",
            command.app(),
            command.tc_url()
        );
        self.handler.on_nc_connect(&command).await;
        Ok(())
    }

    async fn process_publish(
        &mut self,
        command: PublishCommand,
        message_stream_id: u32,
    ) -> RtmpServerResult<()> {
        self.write_control(RtmpMessageBody::UserControl(UserControlEvent::StreamBegin {
            stream_id: PUBLISH_STREAM_ID,
        }))?;

        let mut payload = Vec::new();
        rtmp_formats::commands::writer::Writer::new(&mut payload).write_on_status(
            response_level::STATUS,
            response_code::NET_STREAM_PUBLISH_START,
            response_description::PUBLISH_START,
        )?;
        // onStatus goes out on the NetStream command chunk stream, bound to
        // the stream id the publish came in on
        self.write_command_payload(csid::COMMAND, message_stream_id, payload)?;
        self.drain().await?;

        self.state = SessionState::Streaming;
        self.publishing_name = Some(command.publishing_name.clone());
        tracing::info!(
            "publishing starts, name: {}, type: {}",
            command.publishing_name,
            command.publishing_type
        );
        self.handler.on_ns_publish(&command).await;
        Ok(())
    }

    fn write_control(&mut self, body: RtmpMessageBody) -> RtmpServerResult<()> {
        let csid = match &body {
            RtmpMessageBody::UserControl(_) => csid::USER_CONTROL,
            _ => csid::PROTOCOL_CONTROL,
        };
        let message = body.to_chunk_message(csid, 0, 0)?;
        self.chunk_writer.write_message(&message)?;
        Ok(())
    }

    fn write_command_payload(
        &mut self,
        csid: u32,
        message_stream_id: u32,
        payload: Vec<u8>,
    ) -> RtmpServerResult<()> {
        let message = ChunkMessage::new(
            csid,
            0,
            RtmpMessageType::Amf0Command.into(),
            message_stream_id,
            Bytes::from(payload),
        );
        self.chunk_writer.write_message(&message)?;
        Ok(())
    }

    async fn drain(&mut self) -> RtmpServerResult<()> {
        self.chunk_writer.flush_to(&mut self.write_half).await?;
        Ok(())
    }

    /// Emits an Acknowledgement once the unacknowledged byte count crosses
    /// the peer's announced window.
    async fn maybe_acknowledge(&mut self) -> RtmpServerResult<()> {
        let Some(window) = self.ack_window else {
            return Ok(());
        };
        let total = self.bit_reader.total_bytes_read();
        if total - self.last_acknowledged >= window as u64 {
            self.write_control(RtmpMessageBody::ProtocolControl(
                ProtocolControlMessage::Ack(Acknowledgement {
                    sequence_number: total as u32,
                }),
            ))?;
            self.drain().await?;
            self.last_acknowledged = total;
        }
        Ok(())
    }
}
