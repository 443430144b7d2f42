use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, Connector};
use tracing::{debug, error, info, warn};

use crate::error::ClientError;
use crate::models::ClientEvent;

use super::messages::SocketMessage;

/// Buffer of the event channel handed to the session listener.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Where and how to open the event socket.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// HTTP(S) address of the server.
    pub address: String,
    pub access_token: String,
    pub device_id: String,
    pub ignore_ssl_cert: bool,
}

impl SocketConfig {
    /// Socket URL: the server address with a ws/wss scheme and `/socket`
    /// appended to its path.
    pub fn url(&self) -> Result<String, ClientError> {
        let mut url = reqwest::Url::parse(&self.address)
            .map_err(|e| ClientError::WebSocket(format!("invalid address {}: {}", self.address, e)))?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::WebSocket(format!("cannot use {} for a socket", self.address)))?;
        let path = format!("{}/socket", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("api_key", &self.access_token)
            .append_pair("deviceId", &self.device_id);
        Ok(url.to_string())
    }
}

/// Live event socket to one server.
///
/// The socket does not reconnect on its own. When it drops, the event
/// stream yields [`ClientEvent::Disconnected`] once and ends; reconnecting
/// is up to the session.
pub struct JellyfinSocket {
    shutdown: watch::Sender<bool>,
}

impl JellyfinSocket {
    /// Open the socket and start forwarding server messages.
    pub async fn connect(
        config: SocketConfig,
    ) -> Result<(Self, mpsc::Receiver<ClientEvent>), ClientError> {
        let url = config.url()?;
        let connector = if config.ignore_ssl_cert {
            let tls = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| ClientError::Tls {
                    message: e.to_string(),
                })?;
            Some(Connector::NativeTls(tls))
        } else {
            None
        };

        let (ws_stream, _) = connect_async_tls_with_config(url.as_str(), None, false, connector)
            .await
            .map_err(|e| ClientError::WebSocket(e.to_string()))?;

        info!("Connected to event socket at {}", config.address);

        let (ws_sink, ws_stream) = ws_stream.split();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            run_connection_loop(ws_sink, ws_stream, events_tx, shutdown_rx).await;
        });

        Ok((
            Self {
                shutdown: shutdown_tx,
            },
            events_rx,
        ))
    }

    /// Close the socket. The event stream ends without a disconnect event.
    pub fn shutdown(&self) {
        debug!("Shutting down event socket");
        let _ = self.shutdown.send(true);
    }
}

impl Drop for JellyfinSocket {
    fn drop(&mut self) {
        self.shutdown();
    }
}

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Forward frames until shutdown or until the connection is lost.
async fn run_connection_loop(
    mut ws_sink: futures_util::stream::SplitSink<WsStream, Message>,
    mut ws_stream: futures_util::stream::SplitStream<WsStream>,
    events_tx: mpsc::Sender<ClientEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut keep_alive: Option<(Duration, Instant)> = None;

    loop {
        let next_keep_alive = keep_alive.map(|(_, at)| at);
        tokio::select! {
            changed = shutdown_rx.changed() => {
                let stopped = changed.is_err() || *shutdown_rx.borrow();
                if stopped {
                    debug!("Shutdown signal received, closing socket");
                    let _ = ws_sink.close().await;
                    return;
                }
            }
            _ = sleep_until_opt(next_keep_alive) => {
                if let Some((interval, _)) = keep_alive {
                    send_keep_alive(&mut ws_sink).await;
                    keep_alive = Some((interval, Instant::now() + interval));
                }
            }
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let parsed = match serde_json::from_str::<SocketMessage>(&text) {
                            Ok(parsed) => parsed,
                            Err(e) => {
                                warn!("Failed to parse socket message: {} - {}", e, text);
                                continue;
                            }
                        };
                        if let Some(interval) = parsed.keep_alive_interval() {
                            debug!("Server requested keep-alive every {:?}", interval);
                            send_keep_alive(&mut ws_sink).await;
                            keep_alive = Some((interval, Instant::now() + interval));
                            continue;
                        }
                        if parsed.is_keep_alive() {
                            continue;
                        }
                        let event = ClientEvent::Message {
                            name: parsed.message_type,
                            data: parsed.data,
                        };
                        if events_tx.send(event).await.is_err() {
                            debug!("Event receiver dropped, closing socket");
                            let _ = ws_sink.close().await;
                            return;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Server closed the event socket");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Event socket error: {}", e);
                        break;
                    }
                    None => {
                        info!("Event socket stream ended");
                        break;
                    }
                }
            }
        }
    }

    let stopped = *shutdown_rx.borrow();
    if !stopped {
        let _ = events_tx.send(ClientEvent::Disconnected).await;
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn send_keep_alive(ws_sink: &mut futures_util::stream::SplitSink<WsStream, Message>) {
    match serde_json::to_string(&SocketMessage::keep_alive()) {
        Ok(json) => {
            if let Err(e) = ws_sink.send(Message::Text(json)).await {
                warn!("Failed to send keep-alive: {}", e);
            }
        }
        Err(e) => error!("Failed to serialize keep-alive: {}", e),
    }
}
