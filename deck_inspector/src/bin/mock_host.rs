//! Loopback stand-in for the control-surface host: accepts one plugin
//! connection, assigns it a context, pushes sample settings, and answers
//! resource requests. Useful for driving an inspector without real hardware.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use deck_inspector::channel::{INBOUND_CAP, OUTBOUND_CAP};
use deck_protocol::{Envelope, EVENT_SETTINGS, EVENT_SET_SETTINGS};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde_json::json;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tungstenite::protocol::Message;

const DEFAULT_ADDR: &str = "127.0.0.1:9001";

enum InboundMsg {
    ClientConnected {
        context: String,
        socket_addr: SocketAddr,
    },
    ClientDisconnected,
    Received {
        env: Envelope,
    },
}

enum OutboundMsg {
    Send { env: Envelope },
}

struct ActiveClient {
    ws: tungstenite::WebSocket<TcpStream>,
    context: String,
    socket_addr: SocketAddr,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr = std::env::var("DECK_MOCK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let (in_tx, in_rx) = bounded(INBOUND_CAP);
    let (out_tx, out_rx) = bounded(OUTBOUND_CAP);

    let shutdown = Arc::new(AtomicBool::new(false));
    let server_shutdown = Arc::clone(&shutdown);
    let server_addr = addr.clone();
    let server = thread::spawn(move || run_server(&server_addr, in_tx, out_rx, server_shutdown));

    tracing::info!(%addr, "mock host listening");
    host_loop(in_rx, out_tx);

    shutdown.store(true, Ordering::Relaxed);
    let _ = server.join();
}

/// Scripted host behavior: push settings on connect, re-push on every
/// `setSettings` (the host is the system of record and echoes persisted
/// state back), and answer any other `rpc.*` request with an ok payload.
fn host_loop(in_rx: Receiver<InboundMsg>, out_tx: Sender<OutboundMsg>) {
    let mut context: Option<String> = None;

    loop {
        match in_rx.recv() {
            Ok(InboundMsg::ClientConnected {
                context: ctx,
                socket_addr,
            }) => {
                tracing::info!(%socket_addr, context = %ctx, "plugin connected");
                let settings = json!({"kind": "color", "color": "#ffffff"});
                let _ = out_tx.try_send(OutboundMsg::Send {
                    env: Envelope::with_payload(EVENT_SETTINGS, &ctx, settings),
                });
                context = Some(ctx);
            }
            Ok(InboundMsg::ClientDisconnected) => {
                tracing::info!("plugin disconnected");
                context = None;
            }
            Ok(InboundMsg::Received { env }) => {
                let Some(ctx) = context.clone() else { continue };
                if env.event == EVENT_SET_SETTINGS {
                    tracing::info!(payload = ?env.payload, "persisting settings");
                    if let Some(payload) = env.payload {
                        let _ = out_tx.try_send(OutboundMsg::Send {
                            env: Envelope::with_payload(EVENT_SETTINGS, &ctx, payload),
                        });
                    }
                } else if env.is_resource() {
                    let _ = out_tx.try_send(OutboundMsg::Send {
                        env: Envelope::with_payload(&env.event, &ctx, json!({"ok": true})),
                    });
                } else {
                    tracing::debug!(event = %env.event, "registration or unknown event");
                }
            }
            Err(_) => return,
        }
    }
}

fn run_server(
    addr: &str,
    in_tx: Sender<InboundMsg>,
    out_rx: Receiver<OutboundMsg>,
    shutdown: Arc<AtomicBool>,
) {
    let listener = match TcpListener::bind(addr) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, "bind failed: {e}");
            return;
        }
    };
    let _ = listener.set_nonblocking(true);

    let mut active: Option<ActiveClient> = None;

    while !shutdown.load(Ordering::Relaxed) {
        // Accept new connections (single-client policy, newest wins).
        loop {
            match listener.accept() {
                Ok((stream, socket_addr)) => {
                    let _ = stream.set_nodelay(true);
                    let _ = stream.set_read_timeout(Some(Duration::from_millis(30)));
                    let _ = stream.set_write_timeout(Some(Duration::from_millis(200)));

                    let ws = match tungstenite::accept(stream) {
                        Ok(ws) => ws,
                        Err(e) => {
                            tracing::warn!("ws handshake failed: {e}");
                            continue;
                        }
                    };

                    let context: String = thread_rng()
                        .sample_iter(&Alphanumeric)
                        .take(32)
                        .map(char::from)
                        .collect();

                    if let Some(mut prev) = active.take() {
                        let _ = prev.ws.close(None);
                        let _ = in_tx.try_send(InboundMsg::ClientDisconnected);
                    }

                    if in_tx
                        .try_send(InboundMsg::ClientConnected {
                            context: context.clone(),
                            socket_addr,
                        })
                        .is_err()
                    {
                        continue;
                    }

                    active = Some(ActiveClient {
                        ws,
                        context,
                        socket_addr,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    tracing::warn!("accept failed: {e}");
                    break;
                }
            }
        }

        // Outbound: drain queued envelopes.
        if let Some(client) = active.as_mut() {
            loop {
                match out_rx.try_recv() {
                    Ok(OutboundMsg::Send { env }) => {
                        if send_envelope(&mut client.ws, &env).is_err() {
                            let _ = client.ws.close(None);
                            active = None;
                            let _ = in_tx.try_send(InboundMsg::ClientDisconnected);
                            break;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
        }

        // Inbound: read at most one frame per pass (timeouts keep it moving).
        if let Some(client) = active.as_mut() {
            match client.ws.read() {
                Ok(msg) => {
                    if handle_frame(&in_tx, client, msg).is_err() {
                        let _ = client.ws.close(None);
                        active = None;
                        let _ = in_tx.try_send(InboundMsg::ClientDisconnected);
                    }
                }
                Err(tungstenite::Error::Io(e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(_) => {
                    active = None;
                    let _ = in_tx.try_send(InboundMsg::ClientDisconnected);
                }
            }
        } else {
            thread::sleep(Duration::from_millis(25));
        }
    }

    if let Some(mut client) = active {
        let _ = client.ws.close(None);
    }
}

fn handle_frame(
    in_tx: &Sender<InboundMsg>,
    client: &mut ActiveClient,
    msg: Message,
) -> Result<(), ()> {
    let text = match msg {
        Message::Text(s) => s,
        Message::Binary(_) => return Ok(()),
        Message::Ping(payload) => {
            let _ = client.ws.send(Message::Pong(payload));
            return Ok(());
        }
        Message::Pong(_) => return Ok(()),
        Message::Close(_) => return Err(()),
        Message::Frame(_) => return Ok(()),
    };

    match serde_json::from_str::<Envelope>(&text) {
        Ok(env) => {
            let _ = in_tx.try_send(InboundMsg::Received { env });
        }
        Err(e) => {
            tracing::warn!(from = %client.socket_addr, context = %client.context, "invalid frame: {e}");
        }
    }
    Ok(())
}

fn send_envelope(ws: &mut tungstenite::WebSocket<TcpStream>, env: &Envelope) -> Result<(), ()> {
    let payload = serde_json::to_string(env).map_err(|_| ())?;
    ws.send(Message::Text(payload.into())).map_err(|_| ())
}
