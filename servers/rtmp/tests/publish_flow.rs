use std::sync::{Arc, Mutex};

use rtmp_formats::{
    bitio::BitStreamReader,
    chunk::{self, ChunkMessage},
    commands::{
        CloseStreamCommand, ConnectCommand, CreateStreamCommand, PublishCommand,
        writer::Writer as CommandWriter,
    },
    data::{DataMessage, MetaData},
    message::{AudioMessage, RtmpMessageBody, RtmpMessageType, VideoMessage},
    protocol_control::{ProtocolControlMessage, SetChunkSize, SetPeerBandwidthLimitType},
    user_control::UserControlEvent,
};
use rtmp_server::{
    config::RtmpSessionConfig,
    errors::RtmpServerError,
    handler::SessionHandler,
    session::{RtmpSession, SessionState},
};
use tokio::io::{AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};
use tokio_util::bytes::Bytes;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Handshake,
    Connect(Option<String>),
    CreateStream,
    Publish(String, String),
    Metadata(String, usize),
    SetChunkSize(u32),
    Audio(u32, usize),
    Video(u32, Vec<u8>),
    CloseStream,
    Closed,
    Cleanup,
}

#[derive(Clone, Default)]
struct RecordingHandler {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingHandler {
    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl SessionHandler for RecordingHandler {
    async fn on_handshake(&mut self) {
        self.push(Event::Handshake);
    }

    async fn on_nc_connect(&mut self, command: &ConnectCommand) {
        self.push(Event::Connect(command.app().map(str::to_string)));
    }

    async fn on_nc_create_stream(&mut self, _command: &CreateStreamCommand) {
        self.push(Event::CreateStream);
    }

    async fn on_ns_publish(&mut self, command: &PublishCommand) {
        self.push(Event::Publish(
            command.publishing_name.clone(),
            command.publishing_type.clone(),
        ));
    }

    async fn on_metadata(&mut self, metadata: &MetaData) {
        self.push(Event::Metadata(
            metadata.event_name.clone(),
            metadata.entries.len(),
        ));
    }

    async fn on_set_chunk_size(&mut self, chunk_size: u32) {
        self.push(Event::SetChunkSize(chunk_size));
    }

    async fn on_audio_message(&mut self, message: &AudioMessage, timestamp: u32) {
        self.push(Event::Audio(timestamp, message.payload.len()));
    }

    async fn on_video_message(&mut self, message: &VideoMessage, timestamp: u32) {
        self.push(Event::Video(timestamp, message.payload.to_vec()));
    }

    async fn on_ns_close_stream(&mut self, _command: &CloseStreamCommand) {
        self.push(Event::CloseStream);
    }

    async fn on_stream_closed(&mut self, _error: &RtmpServerError) {
        self.push(Event::Closed);
    }

    async fn cleanup(&mut self) {
        self.push(Event::Cleanup);
    }
}

struct TestClient {
    bits: BitStreamReader<ReadHalf<DuplexStream>>,
    write_half: WriteHalf<DuplexStream>,
    chunk_reader: chunk::reader::Reader,
    chunk_writer: chunk::writer::Writer,
}

impl TestClient {
    fn new(io: DuplexStream) -> Self {
        let (read_half, write_half) = tokio::io::split(io);
        Self {
            bits: BitStreamReader::new(read_half),
            write_half,
            chunk_reader: chunk::reader::Reader::new(),
            chunk_writer: chunk::writer::Writer::new(),
        }
    }

    async fn handshake(&mut self) {
        let mut c0c1 = vec![0x03];
        c0c1.extend_from_slice(&0u32.to_be_bytes());
        c0c1.extend_from_slice(&0u32.to_be_bytes());
        c0c1.extend_from_slice(&[0xAA; 1528]);
        self.write_half.write_all(&c0c1).await.unwrap();
        self.write_half.flush().await.unwrap();

        let s0 = self.bits.read_u8().await.unwrap();
        assert_eq!(s0, 0x03);
        let s1 = self.bits.read_bytes(1536).await.unwrap();
        let s2 = self.bits.read_bytes(1536).await.unwrap();
        // S2 echoes C1: time1, time2 and the random block
        assert_eq!(&s2[0..4], &[0, 0, 0, 0]);
        assert_eq!(&s2[4..8], &[0, 0, 0, 0]);
        assert_eq!(&s2[8..], &[0xAA; 1528]);

        let mut c2 = Vec::with_capacity(1536);
        c2.extend_from_slice(&s1[0..4]);
        c2.extend_from_slice(&s1[0..4]);
        c2.extend_from_slice(&s1[8..]);
        self.write_half.write_all(&c2).await.unwrap();
        self.write_half.flush().await.unwrap();
    }

    async fn send_message(&mut self, message: &ChunkMessage) {
        self.chunk_writer.write_message(message).unwrap();
        self.chunk_writer.flush_to(&mut self.write_half).await.unwrap();
    }

    async fn send_command(&mut self, csid: u32, message_stream_id: u32, payload: Vec<u8>) {
        let message = ChunkMessage::new(
            csid,
            0,
            RtmpMessageType::Amf0Command.into(),
            message_stream_id,
            Bytes::from(payload),
        );
        self.send_message(&message).await;
    }

    /// Reads the next message, applying SetChunkSize like a real peer.
    async fn read_message(&mut self) -> (ChunkMessage, RtmpMessageBody) {
        let message = self
            .chunk_reader
            .read_message(&mut self.bits)
            .await
            .unwrap();
        let body = RtmpMessageBody::read_from(&message).unwrap();
        if let RtmpMessageBody::ProtocolControl(ProtocolControlMessage::SetChunkSize(
            SetChunkSize { chunk_size },
        )) = &body
        {
            self.chunk_reader.set_chunk_size(*chunk_size as usize);
        }
        (message, body)
    }
}

fn connect_payload() -> Vec<u8> {
    let mut payload = Vec::new();
    CommandWriter::new(&mut payload)
        .write_connect_request(&ConnectCommand {
            transaction_id: 1.0,
            command_object: vec![
                ("app".to_string(), amf_formats::string("live")),
                (
                    "tcUrl".to_string(),
                    amf_formats::string("rtmp://127.0.0.1:1935/live"),
                ),
            ],
            optional_user_arguments: None,
        })
        .unwrap();
    payload
}

#[tokio::test]
async fn full_publish_flow() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let handler = RecordingHandler::default();
    let events = handler.clone();

    let mut session = RtmpSession::new(server_io, handler, RtmpSessionConfig::default());
    let server = tokio::spawn(async move {
        let result = session.run().await;
        (result.is_ok(), session.state(), session.publishing_name().map(str::to_string))
    });

    let mut client = TestClient::new(client_io);
    client.handshake().await;

    // --- connect ---
    client.send_command(3, 0, connect_payload()).await;

    let (message, body) = client.read_message().await;
    assert_eq!(message.csid, 2);
    match body {
        RtmpMessageBody::ProtocolControl(ProtocolControlMessage::WindowAckSize(ack)) => {
            assert_eq!(ack.size, 5_000_000)
        }
        other => panic!("expect WindowAckSize first, got {:?}", other),
    }

    let (_, body) = client.read_message().await;
    match body {
        RtmpMessageBody::ProtocolControl(ProtocolControlMessage::SetPeerBandwidth(bw)) => {
            assert_eq!(bw.size, 5_000_000);
            assert_eq!(bw.limit_type, SetPeerBandwidthLimitType::Dynamic);
        }
        other => panic!("expect SetPeerBandwidth second, got {:?}", other),
    }

    let (_, body) = client.read_message().await;
    assert!(matches!(
        body,
        RtmpMessageBody::UserControl(UserControlEvent::StreamBegin { stream_id: 0 })
    ));

    let (_, body) = client.read_message().await;
    match body {
        RtmpMessageBody::ProtocolControl(ProtocolControlMessage::SetChunkSize(scs)) => {
            assert_eq!(scs.chunk_size, 8192)
        }
        other => panic!("expect SetChunkSize fourth, got {:?}", other),
    }

    let (message, _) = client.read_message().await;
    assert_eq!(message.message_type_id, 0x14);
    let values = amf_formats::amf0::Reader::new(&message.payload[..])
        .read_all()
        .unwrap();
    assert_eq!(values[0].try_as_str(), Some("_result"));
    assert_eq!(values[1].try_as_f64(), Some(1.0));
    let information = values[3].try_as_pairs().unwrap();
    let code = information
        .iter()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.try_as_str().unwrap());
    assert_eq!(code, Some("NetConnection.Connect.Success"));

    // --- createStream ---
    let mut payload = Vec::new();
    CommandWriter::new(&mut payload)
        .write_create_stream_request(&CreateStreamCommand {
            transaction_id: 2.0,
            command_object: amf_formats::null(),
        })
        .unwrap();
    client.send_command(3, 0, payload).await;

    let (message, _) = client.read_message().await;
    let values = amf_formats::amf0::Reader::new(&message.payload[..])
        .read_all()
        .unwrap();
    assert_eq!(values[0].try_as_str(), Some("_result"));
    assert_eq!(values[1].try_as_f64(), Some(2.0));
    assert_eq!(values[2], amf_formats::null());
    assert_eq!(values[3].try_as_f64(), Some(1.0));

    // --- publish ---
    let mut payload = Vec::new();
    CommandWriter::new(&mut payload)
        .write_publish_request(&PublishCommand {
            transaction_id: 0.0,
            publishing_name: "streamX".to_string(),
            publishing_type: "live".to_string(),
        })
        .unwrap();
    client.send_command(8, 1, payload).await;

    let (_, body) = client.read_message().await;
    assert!(matches!(
        body,
        RtmpMessageBody::UserControl(UserControlEvent::StreamBegin { stream_id: 1 })
    ));

    let (message, _) = client.read_message().await;
    assert_eq!(message.message_stream_id, 1);
    let values = amf_formats::amf0::Reader::new(&message.payload[..])
        .read_all()
        .unwrap();
    assert_eq!(values[0].try_as_str(), Some("onStatus"));
    let information = values[3].try_as_pairs().unwrap();
    let code = information
        .iter()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.try_as_str().unwrap());
    assert_eq!(code, Some("NetStream.Publish.Start"));

    // --- metadata ---
    let mut payload = Vec::new();
    DataMessage::MetaData(MetaData {
        event_name: "onMetaData".to_string(),
        entries: vec![
            ("width".to_string(), amf_formats::number(1280.0)),
            ("height".to_string(), amf_formats::number(720.0)),
        ],
    })
    .write_to(&mut payload)
    .unwrap();
    client
        .send_message(&ChunkMessage::new(
            4,
            0,
            RtmpMessageType::Amf0Data.into(),
            1,
            Bytes::from(payload),
        ))
        .await;

    // --- fragmented video at the default 128 byte chunk size ---
    let video: Vec<u8> = (0..300u32).map(|i| i as u8).collect();
    client
        .send_message(&ChunkMessage::new(
            6,
            33,
            RtmpMessageType::Video.into(),
            1,
            Bytes::from(video.clone()),
        ))
        .await;

    // --- SetChunkSize mid-stream, then a large message split 4096 + 904 ---
    client
        .send_message(
            &RtmpMessageBody::ProtocolControl(ProtocolControlMessage::SetChunkSize(
                SetChunkSize { chunk_size: 4096 },
            ))
            .to_chunk_message(2, 0, 0)
            .unwrap(),
        )
        .await;
    client.chunk_writer.set_chunk_size(4096);

    let large_video: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    client
        .send_message(&ChunkMessage::new(
            6,
            66,
            RtmpMessageType::Video.into(),
            1,
            Bytes::from(large_video.clone()),
        ))
        .await;

    let audio = vec![0xAFu8, 0x01, 0x02, 0x03];
    client
        .send_message(&ChunkMessage::new(
            4,
            70,
            RtmpMessageType::Audio.into(),
            1,
            Bytes::from(audio),
        ))
        .await;

    // --- closeStream, no reply expected ---
    let mut payload = Vec::new();
    CommandWriter::new(&mut payload)
        .write_close_stream_request(&CloseStreamCommand { transaction_id: 0.0 })
        .unwrap();
    client.send_command(8, 1, payload).await;

    // disconnect
    drop(client);

    let (clean, state, publishing_name) = server.await.unwrap();
    assert!(clean, "a peer disconnect ends the session cleanly");
    assert_eq!(state, SessionState::Closed);
    assert_eq!(publishing_name.as_deref(), Some("streamX"));

    let recorded = events.events();
    assert_eq!(recorded[0], Event::Handshake);
    assert_eq!(recorded[1], Event::Connect(Some("live".to_string())));
    assert_eq!(recorded[2], Event::CreateStream);
    assert_eq!(
        recorded[3],
        Event::Publish("streamX".to_string(), "live".to_string())
    );
    assert_eq!(recorded[4], Event::Metadata("onMetaData".to_string(), 2));
    assert_eq!(recorded[5], Event::Video(33, video));
    assert_eq!(recorded[6], Event::SetChunkSize(4096));
    assert_eq!(recorded[7], Event::Video(66, large_video));
    assert_eq!(recorded[8], Event::Audio(70, 4));
    assert_eq!(recorded[9], Event::CloseStream);
    assert_eq!(recorded[10], Event::Closed);
    assert_eq!(recorded[11], Event::Cleanup);
}

#[tokio::test]
async fn acknowledgement_emitted_past_the_window() {
    let (client_io, server_io) = tokio::io::duplex(256 * 1024);
    let handler = RecordingHandler::default();

    let mut session = RtmpSession::new(server_io, handler, RtmpSessionConfig::default());
    let server = tokio::spawn(async move { session.run().await.is_ok() });

    let mut client = TestClient::new(client_io);
    client.handshake().await;

    // announce a tiny window so a single media burst crosses it
    client
        .send_message(
            &RtmpMessageBody::ProtocolControl(ProtocolControlMessage::WindowAckSize(
                rtmp_formats::protocol_control::WindowAckSize { size: 4000 },
            ))
            .to_chunk_message(2, 0, 0)
            .unwrap(),
        )
        .await;

    let media: Vec<u8> = vec![0x17; 6000];
    client
        .send_message(&ChunkMessage::new(
            6,
            0,
            RtmpMessageType::Video.into(),
            1,
            Bytes::from(media),
        ))
        .await;

    let (_, body) = client.read_message().await;
    match body {
        RtmpMessageBody::ProtocolControl(ProtocolControlMessage::Ack(ack)) => {
            assert!(ack.sequence_number as u64 >= 4000);
        }
        other => panic!("expect an Acknowledgement, got {:?}", other),
    }

    drop(client);
    assert!(server.await.unwrap());
}
