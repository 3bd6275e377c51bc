//! Native WebSocket runner for a [`DisplaySession`].
//!
//! Connects to the relay, subscribes, and feeds decoded events into the
//! session until the socket closes. On close it tears the session down and
//! reconnects with exponential backoff (1s doubling to 10s, plus jitter).
//! Every successful connect re-subscribes, so a display never keeps state
//! from a previous connection.

#[cfg(test)]
#[path = "net_test.rs"]
mod net_test;

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::host::PageHost;
use crate::session::DisplaySession;
use crate::target::TargetSnapshot;

pub const INITIAL_BACKOFF_MS: u64 = 1000;
pub const MAX_BACKOFF_MS: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("relay url must start with ws:// or wss://: {0}")]
    InvalidUrl(String),
    #[error("websocket: {0}")]
    Socket(Box<tokio_tungstenite::tungstenite::Error>),
}

impl From<tokio_tungstenite::tungstenite::Error> for SessionError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Socket(Box::new(error))
    }
}

/// Next backoff after a failed or dropped connection.
#[must_use]
pub fn next_backoff(current_ms: u64) -> u64 {
    current_ms.saturating_mul(2).min(MAX_BACKOFF_MS)
}

/// `base_ms` plus up to a quarter of it, so a fleet of kiosks restarting
/// together does not reconnect in lockstep.
#[must_use]
pub fn with_jitter(base_ms: u64) -> u64 {
    base_ms + rand::rng().random_range(0..=base_ms / 4)
}

enum Exit {
    Closed,
    Shutdown,
}

/// Drive `session` against the relay at `url` until `shutdown` flips to
/// `true` or its sender is dropped.
///
/// `targets` carries target snapshots from the host UI; a closed channel
/// just means the host has stopped reporting.
///
/// # Errors
///
/// Returns [`SessionError::InvalidUrl`] for a non-WebSocket URL. Transport
/// failures are retried, never returned.
pub async fn run_display<H: PageHost>(
    url: &str,
    session: &mut DisplaySession<H>,
    targets: &mut mpsc::Receiver<TargetSnapshot<H::Element>>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), SessionError> {
    if !(url.starts_with("ws://") || url.starts_with("wss://")) {
        return Err(SessionError::InvalidUrl(url.to_owned()));
    }

    let mut backoff_ms = INITIAL_BACKOFF_MS;
    loop {
        if *shutdown.borrow() {
            return Ok(());
        }

        match connect_async(url).await {
            Ok((stream, _)) => {
                info!(url, namespace = session.namespace(), "kiosk: connected to relay");
                backoff_ms = INITIAL_BACKOFF_MS;
                let exit = drive(stream, session, targets, &mut shutdown).await;
                session.on_disconnect();
                match exit {
                    Ok(Exit::Shutdown) => return Ok(()),
                    Ok(Exit::Closed) => info!("kiosk: relay closed the connection"),
                    Err(error) => warn!(%error, "kiosk: connection lost"),
                }
            }
            Err(error) => warn!(%error, backoff_ms, "kiosk: connect failed"),
        }

        let delay = Duration::from_millis(with_jitter(backoff_ms));
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return Ok(());
                }
            }
        }
        backoff_ms = next_backoff(backoff_ms);
    }
}

async fn drive<S, H>(
    stream: WebSocketStream<S>,
    session: &mut DisplaySession<H>,
    targets: &mut mpsc::Receiver<TargetSnapshot<H::Element>>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<Exit, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: PageHost,
{
    let (mut sink, mut source) = stream.split();
    let subscribe = frames::encode(&session.on_connect());
    sink.send(Message::Text(subscribe.into())).await?;

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(Exit::Shutdown);
                }
            }
            Some(snapshot) = targets.recv() => session.targets_changed(snapshot),
            msg = source.next() => match msg {
                Some(Ok(Message::Text(text))) => match frames::decode(text.as_str()) {
                    Ok(event) => {
                        let kind = event.kind();
                        let reaction = session.handle(event, Instant::now());
                        debug!(kind, ?reaction, "kiosk: event");
                    }
                    Err(error) => warn!(%error, "kiosk: undecodable frame"),
                },
                Some(Ok(Message::Close(_))) | None => return Ok(Exit::Closed),
                Some(Ok(_)) => {}
                Some(Err(error)) => return Err(error.into()),
            },
        }
    }
}
