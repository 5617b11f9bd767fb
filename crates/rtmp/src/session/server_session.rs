use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use rtmpd_amf0::Amf0Value;
use rtmpd_context::{Context, ContextFutExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::define::{DEFAULT_WINDOW_ACK_SIZE, Role, SERVER_CHUNK_SIZE};
use super::errors::SessionError;
use crate::channels::{ChannelData, DataConsumer, UniqueId};
use crate::chunk::{AUDIO_CHUNK_STREAM_ID, COMMAND_CHUNK_STREAM_ID, Chunk, ChunkDecoder, ChunkEncoder, VIDEO_CHUNK_STREAM_ID};
use crate::command_messages::RtmpCommand;
use crate::command_messages::netconnection::{ConnectCommand, NetConnection, NetConnectionCommand};
use crate::command_messages::netstream::{NetStreamCommand, NetStreamWriter};
use crate::handshake::{HandshakeServer, RTMP_HANDSHAKE_SIZE};
use crate::messages::{self, MessageTypeID, RtmpMessageData};
use crate::protocol_control_messages::{
    PeerBandwidthLimitType, ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize,
    ProtocolControlMessageSetPeerBandwidth, ProtocolControlMessageWindowAcknowledgementSize,
};
use crate::recorder::Recorder;
use crate::registry::{PlayError, PublishError, Stream, StreamKey, StreamRegistry};
use crate::user_control_messages::EventMessageStreamBegin;

const READ_BUF_CAPACITY: usize = 8 * 1024;

/// Where (if anywhere) publishes are recorded to disk as FLV files.
pub type RecordingsDir = Option<std::path::PathBuf>;

type WriterTx = mpsc::UnboundedSender<Bytes>;

/// One accepted TCP connection: handshake, chunk (de)multiplexing, command
/// dispatch, and whatever registry state a connect/publish/play sequence
/// creates. Dropped (or cancelled via its [`Context`]) as soon as the
/// underlying I/O ends.
pub struct Session {
    id: UniqueId,
    registry: Arc<StreamRegistry>,
    recordings_dir: RecordingsDir,
    ctx: Context,

    app: String,
    next_stream_id: u32,
    role: Role,
    publish_target: Option<Arc<Stream>>,

    decoder: ChunkDecoder,
    encoder: ChunkEncoder,

    bytes_received: u64,
    bytes_acked: u64,
    read_ack_window: u32,
}

impl Session {
    pub fn new(registry: Arc<StreamRegistry>, recordings_dir: RecordingsDir, ctx: Context) -> Self {
        Self {
            id: UniqueId::new_v4(),
            registry,
            recordings_dir,
            ctx,
            app: String::new(),
            next_stream_id: 0,
            role: Role::Idle,
            publish_target: None,
            decoder: ChunkDecoder::default(),
            encoder: ChunkEncoder::default(),
            bytes_received: 0,
            bytes_acked: 0,
            read_ack_window: DEFAULT_WINDOW_ACK_SIZE,
        }
    }

    /// Drives one connection end to end: handshake, then the chunk read
    /// loop, until the socket closes or the session's context is cancelled.
    pub async fn run<S>(mut self, stream: S) -> Result<(), SessionError>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (mut reader, mut writer) = tokio::io::split(stream);
        self.handshake(&mut reader, &mut writer).await?;

        let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<Bytes>();
        let write_task = tokio::spawn(async move {
            while let Some(buf) = writer_rx.recv().await {
                if writer.write_all(&buf).await.is_err() {
                    break;
                }
            }
        });

        let result = self.read_loop(&mut reader, &writer_tx).await;

        drop(writer_tx);
        let _ = write_task.await;
        self.cleanup();
        result
    }

    async fn handshake<R, W>(&mut self, reader: &mut R, writer: &mut W) -> Result<(), SessionError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut handshake = HandshakeServer::default();

        let mut c0c1 = vec![0u8; 1 + RTMP_HANDSHAKE_SIZE];
        reader.read_exact(&mut c0c1).await?;
        handshake.read_c0_c1(&c0c1)?;

        let mut out = Vec::new();
        handshake.write_s0_s1_s2(&mut out)?;
        writer.write_all(&out).await?;

        let mut c2 = vec![0u8; RTMP_HANDSHAKE_SIZE];
        reader.read_exact(&mut c2).await?;
        handshake.read_c2(&c2)?;

        Ok(())
    }

    async fn read_loop<R>(&mut self, reader: &mut R, writer_tx: &WriterTx) -> Result<(), SessionError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = BytesMut::with_capacity(READ_BUF_CAPACITY);

        loop {
            while let Some(chunk) = self.decoder.read_chunk(&mut buf)? {
                self.bytes_received += chunk_wire_len(&chunk);
                self.maybe_ack(writer_tx)?;
                self.handle_chunk(chunk, writer_tx)?;
            }

            let mut tmp = [0u8; READ_BUF_CAPACITY];
            let read = async { reader.read(&mut tmp).await }.with_context(&self.ctx).await;

            let Some(read) = read else {
                debug!(session = %self.id, "session cancelled");
                return Ok(());
            };

            let n = read?;
            if n == 0 {
                debug!(session = %self.id, "peer closed connection");
                return Ok(());
            }
            buf.extend_from_slice(&tmp[..n]);
        }
    }

    fn maybe_ack(&mut self, writer_tx: &WriterTx) -> Result<(), SessionError> {
        if self.bytes_received.saturating_sub(self.bytes_acked) < self.read_ack_window as u64 {
            return Ok(());
        }
        self.bytes_acked = self.bytes_received;

        let mut buf = Vec::new();
        ProtocolControlMessageAcknowledgement {
            sequence_number: self.bytes_received as u32,
        }
        .write(&self.encoder, &mut buf)?;
        self.emit(writer_tx, buf);
        Ok(())
    }

    fn handle_chunk(&mut self, chunk: Chunk, writer_tx: &WriterTx) -> Result<(), SessionError> {
        let timestamp = chunk.message_header.timestamp;
        let Some(message) = messages::parse(&chunk)? else {
            return Ok(());
        };

        match message {
            RtmpMessageData::SetChunkSize { chunk_size } => {
                self.decoder.update_max_chunk_size(chunk_size as usize);
            }
            RtmpMessageData::WindowAcknowledgementSize { size } => {
                self.read_ack_window = size;
            }
            RtmpMessageData::Acknowledgement { sequence_number } => {
                debug!(session = %self.id, sequence_number, "peer acknowledged bytes");
            }
            RtmpMessageData::Amf0Command {
                command_name,
                transaction_id,
                command_object,
                others,
            } => {
                self.handle_command(&command_name, transaction_id, &command_object, others, writer_tx)?;
            }
            RtmpMessageData::Amf0Data { data } => {
                self.forward_media(ChannelData::Metadata { timestamp, data });
            }
            RtmpMessageData::AudioData { data } => {
                self.forward_media(ChannelData::Audio { timestamp, data });
            }
            RtmpMessageData::VideoData { data } => {
                self.forward_media(ChannelData::Video { timestamp, data });
            }
            RtmpMessageData::SetPeerBandwidth { .. } => {}
        }

        Ok(())
    }

    fn forward_media(&self, data: ChannelData) {
        if let Some(stream) = &self.publish_target {
            stream.publish_data(data);
        }
    }

    fn handle_command(
        &mut self,
        command_name: &str,
        transaction_id: f64,
        command_object: &Amf0Value<'_>,
        others: Vec<Amf0Value<'_>>,
        writer_tx: &WriterTx,
    ) -> Result<(), SessionError> {
        let command = RtmpCommand::from(command_name);

        if let Some(net_connection) = NetConnectionCommand::read(&command, command_object)? {
            return self.handle_net_connection(net_connection, transaction_id, writer_tx);
        }

        match NetStreamCommand::read(&command, &others) {
            Some(net_stream) => self.handle_net_stream(net_stream, transaction_id, writer_tx),
            None => {
                debug!(session = %self.id, command_name, "ignoring unrecognized command");
                Ok(())
            }
        }
    }

    fn handle_net_connection(&mut self, command: NetConnectionCommand, transaction_id: f64, writer_tx: &WriterTx) -> Result<(), SessionError> {
        match command {
            NetConnectionCommand::Connect(ConnectCommand { app }) => {
                self.app = app;
                info!(session = %self.id, app = %self.app, "client connected");

                let mut buf = Vec::new();
                ProtocolControlMessageWindowAcknowledgementSize {
                    acknowledgement_window_size: DEFAULT_WINDOW_ACK_SIZE,
                }
                .write(&self.encoder, &mut buf)?;
                ProtocolControlMessageSetPeerBandwidth {
                    window_size: DEFAULT_WINDOW_ACK_SIZE,
                    limit_type: PeerBandwidthLimitType::Dynamic,
                }
                .write(&self.encoder, &mut buf)?;

                self.encoder.set_chunk_size(SERVER_CHUNK_SIZE);
                ProtocolControlMessageSetChunkSize {
                    chunk_size: SERVER_CHUNK_SIZE as u32,
                }
                .write(&self.encoder, &mut buf)?;

                NetConnection::write_connect_success(
                    &mut buf,
                    &self.encoder,
                    transaction_id,
                    "FMS/3,5,7,7009",
                    31.0,
                    "NetConnection.Connect.Success",
                    "Connection succeeded.",
                )?;

                self.emit(writer_tx, buf);
                Ok(())
            }
            NetConnectionCommand::CreateStream => {
                self.next_stream_id += 1;
                let mut buf = Vec::new();
                NetConnection::write_create_stream_response(&mut buf, &self.encoder, transaction_id, self.next_stream_id as f64)?;
                self.emit(writer_tx, buf);
                Ok(())
            }
            NetConnectionCommand::Call | NetConnectionCommand::Close => Ok(()),
        }
    }

    fn handle_net_stream(&mut self, command: NetStreamCommand, transaction_id: f64, writer_tx: &WriterTx) -> Result<(), SessionError> {
        match command {
            NetStreamCommand::Publish { stream_name } => self.handle_publish(stream_name, transaction_id, writer_tx),
            NetStreamCommand::Play { stream_name } => self.handle_play(stream_name, transaction_id, writer_tx),
            NetStreamCommand::DeleteStream { .. } | NetStreamCommand::CloseStream => {
                self.leave_current_role();
                Ok(())
            }
            NetStreamCommand::Nop => {
                let mut buf = Vec::new();
                NetStreamWriter::write_result_number(&mut buf, &self.encoder, transaction_id, 0.0)?;
                self.emit(writer_tx, buf);
                Ok(())
            }
        }
    }

    fn handle_publish(&mut self, stream_name: String, transaction_id: f64, writer_tx: &WriterTx) -> Result<(), SessionError> {
        let key = StreamKey::new(self.app.clone(), stream_name.clone());
        let stream_id = self.next_stream_id;

        let mut buf = Vec::new();
        match self.registry.publish(&key, self.id) {
            Ok(stream) => {
                info!(session = %self.id, stream = %key, "publish started");
                self.role = Role::Publishing(key.clone());
                self.publish_target = Some(stream.clone());

                if let Some(dir) = self.recordings_dir.clone() {
                    self.spawn_recorder(dir, &key, &stream);
                }

                EventMessageStreamBegin { stream_id }.write(&self.encoder, &mut buf)?;
                NetStreamWriter::write_on_status(
                    &mut buf,
                    &self.encoder,
                    transaction_id,
                    "status",
                    "NetStream.Publish.Start",
                    &format!("Publishing {stream_name}."),
                )?;
            }
            Err(PublishError::AlreadyPublishing) => {
                NetStreamWriter::write_on_status(
                    &mut buf,
                    &self.encoder,
                    transaction_id,
                    "error",
                    "NetStream.Publish.BadName",
                    "Stream already has a publisher.",
                )?;
            }
        }

        self.emit(writer_tx, buf);
        Ok(())
    }

    fn spawn_recorder(&self, dir: std::path::PathBuf, key: &StreamKey, stream: &Arc<Stream>) {
        let (tx, rx) = crate::channels::subscriber_channel();
        stream.set_recorder(Some(tx));
        let path = dir.join(format!("{}-{}.flv", key.app, key.name));
        tokio::spawn(async move {
            match Recorder::create(&path).await {
                Ok(recorder) => recorder.run(rx).await,
                Err(err) => warn!(error = %err, path = %path.display(), "failed to start recording"),
            }
        });
    }

    fn handle_play(&mut self, stream_name: String, transaction_id: f64, writer_tx: &WriterTx) -> Result<(), SessionError> {
        let key = StreamKey::new(self.app.clone(), stream_name);
        let stream_id = self.next_stream_id;

        let mut buf = Vec::new();
        let consumer = match self.registry.subscribe(&key, self.id) {
            Ok((_stream, consumer)) => {
                info!(session = %self.id, stream = %key, "playback started");
                self.role = Role::Playing(key.clone());

                EventMessageStreamBegin { stream_id }.write(&self.encoder, &mut buf)?;
                NetStreamWriter::write_on_status(&mut buf, &self.encoder, transaction_id, "status", "NetStream.Play.Reset", "Resetting playback.")?;
                NetStreamWriter::write_on_status(&mut buf, &self.encoder, transaction_id, "status", "NetStream.Play.Start", "Playback started.")?;
                Some(consumer)
            }
            Err(PlayError::StreamNotFound) => {
                NetStreamWriter::write_on_status(
                    &mut buf,
                    &self.encoder,
                    transaction_id,
                    "error",
                    "NetStream.Play.StreamNotFound",
                    "No publisher for this stream.",
                )?;
                None
            }
        };

        // Enqueue StreamBegin/Reset/Start before spawning the forwarder: the
        // forwarder may start relaying cached sequence headers on another
        // worker thread immediately, and those must land after this burst.
        self.emit(writer_tx, buf);
        if let Some(consumer) = consumer {
            self.spawn_outbound_forwarder(consumer, writer_tx.clone());
        }
        Ok(())
    }

    /// Re-encodes every [`ChannelData`] unit a subscription produces back
    /// into chunks on the connection's own AV chunk stream ids, using a
    /// throwaway `ChunkEncoder` clone so it can run independent of the main
    /// read loop.
    fn spawn_outbound_forwarder(&self, mut consumer: DataConsumer, writer_tx: WriterTx) {
        let encoder = self.encoder.clone();
        let stream_id = self.next_stream_id;
        tokio::spawn(async move {
            while let Some(data) = consumer.recv().await {
                let (csid, msg_type, timestamp, payload) = match data {
                    ChannelData::Video { timestamp, data } => (VIDEO_CHUNK_STREAM_ID, MessageTypeID::Video, timestamp, data),
                    ChannelData::Audio { timestamp, data } => (AUDIO_CHUNK_STREAM_ID, MessageTypeID::Audio, timestamp, data),
                    ChannelData::Metadata { timestamp, data } => (COMMAND_CHUNK_STREAM_ID, MessageTypeID::DataAMF0, timestamp, data),
                };
                let chunk = Chunk::new(csid, timestamp, msg_type, stream_id, payload);
                let mut buf = Vec::new();
                if encoder.write_chunk(&mut buf, chunk).is_err() || writer_tx.send(Bytes::from(buf)).is_err() {
                    break;
                }
            }
        });
    }

    fn leave_current_role(&mut self) {
        match std::mem::replace(&mut self.role, Role::Idle) {
            Role::Publishing(key) => {
                self.registry.unpublish(&key, self.id);
                self.registry.detach_recorder(&key);
                self.publish_target = None;
            }
            Role::Playing(key) => {
                self.registry.unsubscribe(&key, &self.id);
            }
            Role::Idle => {}
        }
    }

    fn cleanup(&mut self) {
        self.leave_current_role();
    }

    fn emit(&self, writer_tx: &WriterTx, buf: Vec<u8>) {
        let _ = writer_tx.send(Bytes::from(buf));
    }
}

fn chunk_wire_len(chunk: &Chunk) -> u64 {
    // Approximate: payload length plus a basic+message header; exact framing
    // overhead doesn't matter for ack bookkeeping, only the trend does.
    chunk.payload.len() as u64 + 12
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    use super::*;
    use crate::command_messages::define::Command;
    use crate::handshake::RTMP_HANDSHAKE_SIZE;

    async fn perform_handshake(client: &mut DuplexStream) {
        let mut c0c1 = vec![3u8];
        c0c1.extend_from_slice(&0u32.to_be_bytes());
        c0c1.extend_from_slice(&[0u8; 4]);
        c0c1.extend_from_slice(&[0u8; RTMP_HANDSHAKE_SIZE - 8]);
        client.write_all(&c0c1).await.unwrap();

        let mut s0s1s2 = vec![0u8; 1 + RTMP_HANDSHAKE_SIZE * 2];
        client.read_exact(&mut s0s1s2).await.unwrap();

        client.write_all(&vec![0u8; RTMP_HANDSHAKE_SIZE]).await.unwrap();
    }

    async fn next_command_name(client: &mut DuplexStream, decoder: &mut ChunkDecoder, buf: &mut BytesMut) -> Option<(String, f64)> {
        loop {
            while let Some(chunk) = decoder.read_chunk(buf).unwrap() {
                if let Some(RtmpMessageData::Amf0Command {
                    command_name,
                    transaction_id,
                    ..
                }) = messages::parse(&chunk).unwrap()
                {
                    return Some((command_name, transaction_id));
                }
            }

            let mut tmp = [0u8; 4096];
            let n = client.read(&mut tmp).await.unwrap();
            if n == 0 {
                return None;
            }
            buf.extend_from_slice(&tmp[..n]);
        }
    }

    fn send_command(name: &str, transaction_id: f64, values: Vec<Amf0Value<'static>>, encoder: &ChunkEncoder) -> Vec<u8> {
        let mut buf = Vec::new();
        Command::new(name, transaction_id, values).write(&mut buf, encoder).unwrap();
        buf
    }

    #[tokio::test]
    async fn connect_create_stream_publish_end_to_end() {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let registry = StreamRegistry::new();
        let (ctx, _handler) = Context::new();
        tokio::spawn(Session::new(registry.clone(), None, ctx).run(server));

        perform_handshake(&mut client).await;

        let encoder = ChunkEncoder::default();
        let mut decoder = ChunkDecoder::default();
        let mut read_buf = BytesMut::new();

        let connect_object = Amf0Value::object(vec![(Cow::Borrowed("app"), Amf0Value::string("live"))]);
        client
            .write_all(&send_command("connect", 1.0, vec![connect_object], &encoder))
            .await
            .unwrap();
        let (name, _) = next_command_name(&mut client, &mut decoder, &mut read_buf).await.unwrap();
        assert_eq!(name, "_result");

        client
            .write_all(&send_command("createStream", 2.0, vec![Amf0Value::Null], &encoder))
            .await
            .unwrap();
        let (name, _) = next_command_name(&mut client, &mut decoder, &mut read_buf).await.unwrap();
        assert_eq!(name, "_result");

        client
            .write_all(&send_command(
                "publish",
                3.0,
                vec![Amf0Value::Null, Amf0Value::string("mystream")],
                &encoder,
            ))
            .await
            .unwrap();
        let (name, _) = next_command_name(&mut client, &mut decoder, &mut read_buf).await.unwrap();
        assert_eq!(name, "onStatus");

        let key = StreamKey::new("live", "mystream");
        assert!(registry.publish(&key, UniqueId::new_v4()).is_err());
    }

    #[tokio::test]
    async fn play_without_publisher_is_rejected() {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let registry = StreamRegistry::new();
        let (ctx, _handler) = Context::new();
        tokio::spawn(Session::new(registry, None, ctx).run(server));

        perform_handshake(&mut client).await;

        let encoder = ChunkEncoder::default();
        let mut decoder = ChunkDecoder::default();
        let mut read_buf = BytesMut::new();

        let connect_object = Amf0Value::object(vec![(Cow::Borrowed("app"), Amf0Value::string("live"))]);
        client
            .write_all(&send_command("connect", 1.0, vec![connect_object], &encoder))
            .await
            .unwrap();
        next_command_name(&mut client, &mut decoder, &mut read_buf).await.unwrap();

        client
            .write_all(&send_command("createStream", 2.0, vec![Amf0Value::Null], &encoder))
            .await
            .unwrap();
        next_command_name(&mut client, &mut decoder, &mut read_buf).await.unwrap();

        client
            .write_all(&send_command(
                "play",
                3.0,
                vec![Amf0Value::Null, Amf0Value::string("ghost")],
                &encoder,
            ))
            .await
            .unwrap();
        let (name, _) = next_command_name(&mut client, &mut decoder, &mut read_buf).await.unwrap();
        assert_eq!(name, "onStatus");
    }
}
