use crate::error::Error;
use deck_protocol::{Envelope, EVENT_CLOSE, EVENT_OPEN};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

pub const INBOUND_CAP: usize = 256;
pub const OUTBOUND_CAP: usize = 256;

/// Connection parameters handed to the plugin at process start: the host
/// listens on a local port and expects one registration message carrying the
/// uuid it assigned.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub port: u16,
    pub register_event: String,
    pub plugin_uuid: String,
}

impl ChannelConfig {
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }
}

/// Cloneable outbound side of the channel. Sends are fire-and-forget; the
/// host acknowledges nothing beyond whatever events it chooses to emit back.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    tx: mpsc::Sender<Envelope>,
}

impl ChannelHandle {
    pub async fn send(&self, env: Envelope) -> Result<(), Error> {
        self.tx.send(env).await.map_err(|_| Error::ChannelClosed)
    }

    pub fn try_send(&self, env: Envelope) -> Result<(), Error> {
        self.tx.try_send(env).map_err(|_| Error::ChannelClosed)
    }

    /// Raw sender for components that push on their own (settings mirror).
    pub fn sender(&self) -> mpsc::Sender<Envelope> {
        self.tx.clone()
    }
}

/// Spawns the actor and returns the outbound handle plus the inbound event
/// queue. Dropping both ends shuts the actor down.
pub fn spawn(config: ChannelConfig) -> (ChannelHandle, mpsc::Receiver<Envelope>) {
    let (out_tx, out_rx) = mpsc::channel(OUTBOUND_CAP);
    let (in_tx, in_rx) = mpsc::channel(INBOUND_CAP);
    tokio::spawn(run(config, out_rx, in_tx));
    (ChannelHandle { tx: out_tx }, in_rx)
}

/// The actor loop: connect with backoff, register, then shuttle envelopes
/// both ways until the socket drops, forever. Socket establishment and loss
/// surface to the owner as synthetic `rpc.open` / `rpc.close` envelopes, the
/// same events the remote application itself uses, so inspectors handle both
/// through one path.
pub async fn run(
    config: ChannelConfig,
    mut outbound_rx: mpsc::Receiver<Envelope>,
    inbound_tx: mpsc::Sender<Envelope>,
) {
    let mut backoff = Backoff::default();

    loop {
        if inbound_tx.is_closed() {
            return;
        }

        let mut socket = match tokio_tungstenite::connect_async(config.url()).await {
            Ok((socket, _)) => {
                backoff.reset();
                socket
            }
            Err(err) => {
                let retry = backoff.next_delay();
                tracing::debug!(%err, retry_secs = retry.as_secs(), "host connect failed");
                tokio::time::sleep(retry).await;
                continue;
            }
        };

        let register = Envelope {
            event: config.register_event.clone(),
            action: None,
            context: Some(config.plugin_uuid.clone()),
            payload: None,
        };
        if send_json(&mut socket, &register).await.is_err() {
            continue;
        }
        tracing::info!(port = config.port, "registered with host");

        if inbound_tx.send(Envelope::bare(EVENT_OPEN)).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                cmd = outbound_rx.recv() => {
                    match cmd {
                        Some(env) => {
                            if send_json(&mut socket, &env).await.is_err() {
                                break;
                            }
                        }
                        None => return,
                    }
                }
                incoming = socket.next() => {
                    match incoming {
                        Some(Ok(msg)) => {
                            if let Ok(text) = msg.into_text() {
                                match serde_json::from_str::<Envelope>(&text) {
                                    Ok(env) => {
                                        if inbound_tx.send(env).await.is_err() {
                                            return;
                                        }
                                    }
                                    Err(err) => {
                                        tracing::warn!(%err, "dropping unparseable host frame");
                                    }
                                }
                            }
                        }
                        _ => break,
                    }
                }
            }
        }

        if inbound_tx.send(Envelope::bare(EVENT_CLOSE)).await.is_err() {
            return;
        }
    }
}

async fn send_json(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    env: &Envelope,
) -> Result<(), ()> {
    let payload = serde_json::to_string(env).map_err(|_| ())?;
    ws.send(tokio_tungstenite::tungstenite::Message::Text(payload.into()))
        .await
        .map_err(|_| ())
}

#[derive(Default)]
struct Backoff {
    idx: usize,
}

impl Backoff {
    fn reset(&mut self) {
        self.idx = 0;
    }

    fn next_delay(&mut self) -> Duration {
        let delays = [1, 2, 5, 10];
        let secs = delays.get(self.idx).copied().unwrap_or(10);
        self.idx = (self.idx + 1).min(delays.len());
        Duration::from_secs(secs)
    }
}
