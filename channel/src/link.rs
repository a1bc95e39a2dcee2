//! The realtime link actor.
//!
//! One task owns the socket. Callers talk to it through a command channel
//! and hear back through an event channel, so producers never touch the
//! transport directly and a reconnect swaps the socket without anyone
//! noticing. Outbound frames sit in a queue and leave it only after a
//! successful write, which is what carries telemetry across an outage.

use std::collections::VecDeque;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parallax_messages::{decode, encode_telemetry, ControlMessage, Inbound};
use parallax_types::{MotionSample, SessionId, Timestamp, VideoSegment};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::endpoint::{is_development_host, stream_url};
use crate::error::ChannelError;
use crate::preflight::probe_health;
use crate::reconnect::{ReconnectPolicy, RECONNECT_DELAY_MS};

/// How long a single dial may take, in milliseconds.
pub const CONNECT_TIMEOUT_MS: u64 = 5_000;

const COMMAND_BUFFER: usize = 64;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How to reach the backend and how patient to be about it.
#[derive(Clone, Debug)]
pub struct LinkConfig {
    /// Backend origin, e.g. `https://verify.example.com`.
    pub origin: Url,
    pub session_id: SessionId,
    pub connect_timeout_ms: u64,
    pub reconnect_delay_ms: u64,
    /// Probe `/health` before dialing on development hosts.
    pub health_preflight: bool,
}

impl LinkConfig {
    pub fn new(origin: Url, session_id: SessionId) -> Self {
        LinkConfig {
            origin,
            session_id,
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            reconnect_delay_ms: RECONNECT_DELAY_MS,
            health_preflight: true,
        }
    }
}

/// What the link reports back to its owner.
#[derive(Debug)]
pub enum LinkEvent {
    /// The transport came back after an outage. The initial open is not
    /// reported here; `connect` resolving is that signal.
    Reopened,
    /// A decoded control message from the backend.
    Control(ControlMessage),
    /// The transport dropped. One redial is scheduled for `due_at`.
    ConnectionLost { due_at: Timestamp },
    /// The link stopped for good and will send nothing further.
    Closed,
}

enum LinkCommand {
    SendVideo(VideoSegment),
    SendTelemetry(Vec<MotionSample>),
    Close,
}

/// A frame waiting for the transport. Stays queued until a write succeeds.
enum OutFrame {
    Binary(Vec<u8>),
    Text(String),
}

impl OutFrame {
    fn to_message(&self) -> Message {
        match self {
            OutFrame::Binary(bytes) => Message::Binary(bytes.clone()),
            OutFrame::Text(text) => Message::Text(text.clone()),
        }
    }
}

/// Handle to the socket-owning task.
#[derive(Debug)]
pub struct RealtimeLink {
    commands: mpsc::Sender<LinkCommand>,
    task: Option<JoinHandle<()>>,
}

impl RealtimeLink {
    /// Open the stream for a session. Resolves only once the socket is up,
    /// so a resolved link is always ready to send.
    ///
    /// On development hosts this first probes the health endpoint, turning
    /// an unaccepted self-signed certificate into a typed failure instead
    /// of an opaque socket error.
    pub async fn connect(
        config: LinkConfig,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Self, ChannelError> {
        let url = stream_url(&config.origin, &config.session_id)?;
        if config.health_preflight && is_development_host(&config.origin) {
            probe_health(&config.origin).await?;
        }
        let socket = dial(&url, config.connect_timeout_ms).await?;
        tracing::debug!(url = %url, session = %config.session_id, "stream link open");

        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run(
            socket,
            url,
            config.connect_timeout_ms,
            config.reconnect_delay_ms,
            command_rx,
            events,
        ));
        Ok(RealtimeLink {
            commands,
            task: Some(task),
        })
    }

    /// Queue one video segment as a binary frame. Segments leave in the
    /// order they were queued.
    pub async fn send_video(&self, segment: VideoSegment) -> Result<(), ChannelError> {
        self.commands
            .send(LinkCommand::SendVideo(segment))
            .await
            .map_err(|_| ChannelError::Closed)
    }

    /// Queue one telemetry batch as a text frame.
    pub async fn send_telemetry(&self, samples: Vec<MotionSample>) -> Result<(), ChannelError> {
        self.commands
            .send(LinkCommand::SendTelemetry(samples))
            .await
            .map_err(|_| ChannelError::Closed)
    }

    /// Stop for good: flush what the socket will take, close it, cancel any
    /// pending redial. Safe to call more than once.
    pub async fn close(&mut self) {
        let _ = self.commands.send(LinkCommand::Close).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

async fn run(
    mut socket: WsStream,
    url: Url,
    connect_timeout_ms: u64,
    reconnect_delay_ms: u64,
    mut commands: mpsc::Receiver<LinkCommand>,
    events: mpsc::Sender<LinkEvent>,
) {
    let mut policy = ReconnectPolicy::new(reconnect_delay_ms);
    policy.on_connect_started();
    policy.on_open();
    let mut outbound: VecDeque<OutFrame> = VecDeque::new();

    loop {
        match drive_open(socket, &mut commands, &mut outbound, &events).await {
            DriveEnd::Shutdown => {
                policy.close();
                break;
            }
            DriveEnd::Lost => {
                let Some(mut due_at) = policy.on_unexpected_close(Timestamp::now()) else {
                    break;
                };
                if events
                    .send(LinkEvent::ConnectionLost { due_at })
                    .await
                    .is_err()
                {
                    policy.close();
                    break;
                }

                let reopened = loop {
                    if !wait_until(due_at, &mut commands, &mut outbound).await {
                        policy.close();
                        break None;
                    }
                    policy.on_connect_started();
                    tracing::info!(attempt = policy.attempts(), url = %url, "redialing stream");
                    match dial(&url, connect_timeout_ms).await {
                        Ok(fresh) => {
                            policy.on_open();
                            break Some(fresh);
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "redial failed");
                            match policy.on_connect_failed(Timestamp::now()) {
                                Some(next) => {
                                    due_at = next;
                                    let _ =
                                        events.send(LinkEvent::ConnectionLost { due_at }).await;
                                }
                                None => break None,
                            }
                        }
                    }
                };
                match reopened {
                    Some(fresh) => {
                        socket = fresh;
                        let _ = events.send(LinkEvent::Reopened).await;
                    }
                    None => break,
                }
            }
        }
    }

    // The owner may already be awaiting close(), so never block the final
    // event on a full buffer.
    let _ = events.try_send(LinkEvent::Closed);
    tracing::debug!(url = %url, "stream link stopped");
}

enum DriveEnd {
    /// The transport dropped out from under us.
    Lost,
    /// The owner asked for a shutdown, or went away entirely.
    Shutdown,
}

/// Drive one open socket: flush the queue, accept commands, dispatch
/// inbound frames. A queued frame is popped only after its write succeeds.
async fn drive_open(
    socket: WsStream,
    commands: &mut mpsc::Receiver<LinkCommand>,
    outbound: &mut VecDeque<OutFrame>,
    events: &mpsc::Sender<LinkEvent>,
) -> DriveEnd {
    let (mut sink, mut stream) = socket.split();
    loop {
        if let Some(frame) = outbound.front() {
            match sink.send(frame.to_message()).await {
                Ok(()) => {
                    outbound.pop_front();
                }
                Err(err) => {
                    tracing::warn!(error = %err, "stream write failed");
                    return DriveEnd::Lost;
                }
            }
            continue;
        }

        tokio::select! {
            command = commands.recv() => match command {
                Some(LinkCommand::SendVideo(segment)) => {
                    outbound.push_back(OutFrame::Binary(segment.data));
                }
                Some(LinkCommand::SendTelemetry(samples)) => {
                    enqueue_telemetry(outbound, &samples);
                }
                Some(LinkCommand::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    return DriveEnd::Shutdown;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => dispatch(&text, events).await,
                Some(Ok(Message::Ping(payload))) => {
                    if sink.send(Message::Pong(payload)).await.is_err() {
                        return DriveEnd::Lost;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!("backend closed the stream");
                    return DriveEnd::Lost;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "stream read failed");
                    return DriveEnd::Lost;
                }
            },
        }
    }
}

/// Sit out an outage. Commands keep queueing so frames produced while the
/// transport is down go out after the reopen. Returns false on shutdown.
async fn wait_until(
    due_at: Timestamp,
    commands: &mut mpsc::Receiver<LinkCommand>,
    outbound: &mut VecDeque<OutFrame>,
) -> bool {
    loop {
        let remaining = due_at
            .as_millis()
            .saturating_sub(Timestamp::now().as_millis());
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(remaining)) => return true,
            command = commands.recv() => match command {
                Some(LinkCommand::SendVideo(segment)) => {
                    outbound.push_back(OutFrame::Binary(segment.data));
                }
                Some(LinkCommand::SendTelemetry(samples)) => {
                    enqueue_telemetry(outbound, &samples);
                }
                Some(LinkCommand::Close) | None => return false,
            },
        }
    }
}

fn enqueue_telemetry(outbound: &mut VecDeque<OutFrame>, samples: &[MotionSample]) {
    match encode_telemetry(samples) {
        Ok(text) => outbound.push_back(OutFrame::Text(text)),
        // Non-finite floats cannot encode as JSON; drop the batch.
        Err(err) => tracing::error!(error = %err, "telemetry batch did not encode"),
    }
}

async fn dispatch(text: &str, events: &mpsc::Sender<LinkEvent>) {
    match decode(text) {
        Ok(Inbound::Control(message)) => {
            tracing::debug!(kind = message.kind(), "control message");
            let _ = events.send(LinkEvent::Control(message)).await;
        }
        Ok(Inbound::Unknown { kind }) => {
            tracing::debug!(kind = %kind, "ignoring unknown control message");
        }
        Err(err) => {
            tracing::warn!(error = %err, "undecodable control message");
        }
    }
}

async fn dial(url: &Url, connect_timeout_ms: u64) -> Result<WsStream, ChannelError> {
    let timeout = Duration::from_millis(connect_timeout_ms);
    match tokio::time::timeout(timeout, connect_async(url.as_str())).await {
        Err(_) => Err(ChannelError::Timeout {
            url: url.to_string(),
            timeout_ms: connect_timeout_ms,
        }),
        Ok(Err(err)) => Err(classify(url, err)),
        Ok(Ok((socket, _response))) => Ok(socket),
    }
}

fn classify(url: &Url, err: tungstenite::Error) -> ChannelError {
    match err {
        tungstenite::Error::Tls(tls) => ChannelError::Tls {
            url: url.to_string(),
            reason: tls.to_string(),
        },
        other => ChannelError::Connect {
            url: url.to_string(),
            reason: other.to_string(),
        },
    }
}
