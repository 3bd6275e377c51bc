//! `globe-ctl`: producer-side tool for the globe kiosk relay.
//!
//! Speaks the same envelope protocol as the physical controller and the
//! content-ingestion flow, so any of their messages can be replayed by hand.
//! `watch` runs a headless display against the relay for debugging.

mod console;
mod stability;


use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use frames::{ControlCode, Coordinates, Event};
use futures_util::{SinkExt, StreamExt};
use kiosk::DisplaySession;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{info, warn};

use crate::console::ConsoleHost;
use crate::stability::StabilityDetector;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CtlError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("missing ingest token; pass --token or set GLOBE_INGEST_TOKEN")]
    MissingToken,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("frame decode failed: {0}")]
    Decode(#[from] frames::CodecError),
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("relay rejected frame ({code}): {message}")]
    Relay { code: String, message: String },
    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("display session: {0}")]
    Session(#[from] kiosk::net::SessionError),
}

fn ws_error(error: tokio_tungstenite::tungstenite::Error) -> CtlError {
    CtlError::WsConnect(Box::new(error))
}

#[derive(Parser, Debug)]
#[command(name = "globe-ctl", about = "Globe kiosk relay controller")]
struct Cli {
    #[arg(long, env = "GLOBE_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Shared secret for the coordinate-ingest endpoint.
    #[arg(long, env = "GLOBE_INGEST_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the relay is up.
    Ping,
    /// Print connection counts and per-namespace status.
    Status,
    /// Send one remote-control code.
    Control { action: String },
    /// Set the shared start flag.
    Start {
        #[arg(action = ArgAction::Set)]
        start: bool,
    },
    /// Send one coordinate event.
    Coords(CoordsArgs),
    /// Read `lat lon` samples from stdin and publish them through the
    /// stability detector.
    Track(TrackArgs),
    /// Push content for a namespace.
    Push(PushArgs),
    /// Tell a namespace its content is being fetched.
    Loading {
        #[arg(long)]
        namespace: String,
    },
    /// Post coordinates to the HTTP ingest endpoint.
    Ingest(CoordsArgs),
    /// Run a headless display and print what it shows.
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct CoordsArgs {
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,
    /// Send as confirmed rather than as a candidate. Ignored by `ingest`,
    /// which is always confirmed.
    #[arg(long)]
    stable: bool,
}

#[derive(Args, Debug)]
struct TrackArgs {
    /// Half-width of the stillness window, in degrees.
    #[arg(long, default_value_t = stability::DEFAULT_TOLERANCE_DEG)]
    tolerance: f64,
    /// How long the globe must stay still, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    hold_ms: u64,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("content").required(true).args(["file", "error"])))]
struct PushArgs {
    #[arg(long)]
    namespace: String,
    /// JSON file sent as the payload.
    #[arg(long)]
    file: Option<PathBuf>,
    /// JSON value sent as the error, e.g. `{"requested":"Wakanda"}`.
    #[arg(long)]
    error: Option<String>,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[arg(long)]
    namespace: String,
    /// Comma separated names of synthetic navigable targets.
    #[arg(long, value_delimiter = ',')]
    targets: Vec<String>,
}

#[derive(Debug, Clone)]
struct CtlContext {
    base_url: String,
    token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CtlError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let ctx = CtlContext { base_url: cli.base_url, token: cli.token };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Status => run_status(&ctx).await,
        Command::Control { action } => {
            let code = ControlCode::parse(&action);
            if matches!(code, ControlCode::Unknown(_)) {
                warn!(action, "control code is not in the kiosk vocabulary; sending anyway");
            }
            publish(&ctx, &[Event::control(&code)]).await
        }
        Command::Start { start } => publish(&ctx, &[Event::Start { start }]).await,
        Command::Coords(args) => {
            let coords = Coordinates { lat: args.lat, lon: args.lon };
            let event = if args.stable { Event::CoordinatesStable(coords) } else { Event::CoordinatesPending(coords) };
            publish(&ctx, &[event]).await
        }
        Command::Track(args) => run_track(&ctx, args).await,
        Command::Push(args) => {
            let event = push_event(args).await?;
            publish(&ctx, &[event]).await
        }
        Command::Loading { namespace } => publish(&ctx, &[Event::Loading { namespace: Some(namespace) }]).await,
        Command::Ingest(args) => run_ingest(&ctx, args).await,
        Command::Watch(args) => run_watch(&ctx, args).await,
    }
}

// =============================================================================
// HTTP
// =============================================================================

async fn run_ping(ctx: &CtlContext) -> Result<(), CtlError> {
    let client = reqwest::Client::new();
    let response = client.get(http_url(&ctx.base_url, "/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CtlError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_status(ctx: &CtlContext) -> Result<(), CtlError> {
    let client = reqwest::Client::new();
    let summary = get_json(&client, &ctx.base_url, "/api/status").await?;
    let namespaces = get_json(&client, &ctx.base_url, "/api/namespaces").await?;
    print_json(&serde_json::json!({ "relay": summary, "namespaces": namespaces }))
}

async fn run_ingest(ctx: &CtlContext, args: CoordsArgs) -> Result<(), CtlError> {
    let token = ctx.token.as_deref().ok_or(CtlError::MissingToken)?;
    let body = serde_json::json!({ "lat": args.lat, "lon": args.lon, "token": token });

    let client = reqwest::Client::new();
    let response = client.post(http_url(&ctx.base_url, "/api/coordinates")).json(&body).send().await?;
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let message = value.get("message").and_then(Value::as_str).map_or_else(|| value.to_string(), ToOwned::to_owned);
        return Err(CtlError::ServerError { status: status.as_u16(), message });
    }
    print_json(&value)
}

async fn get_json(client: &reqwest::Client, base_url: &str, path: &str) -> Result<Value, CtlError> {
    let response = client.get(http_url(base_url, path)).send().await?;
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);
    if !status.is_success() {
        return Err(CtlError::ServerError { status: status.as_u16(), message: value.to_string() });
    }
    Ok(value)
}

fn http_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn print_json(value: &Value) -> Result<(), CtlError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

// =============================================================================
// WEBSOCKET
// =============================================================================

/// Connect as a producer, send `events` in order, and close.
async fn publish(ctx: &CtlContext, events: &[Event]) -> Result<(), CtlError> {
    let mut stream = open_producer(ctx).await?;
    for event in events {
        send_event(&mut stream, event).await?;
        info!(kind = event.kind(), "sent");
    }
    let _ = stream.close(None).await;
    Ok(())
}

async fn run_track(ctx: &CtlContext, args: TrackArgs) -> Result<(), CtlError> {
    let mut detector = StabilityDetector::new(args.tolerance, Duration::from_millis(args.hold_ms));
    let mut stream = open_producer(ctx).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let sample = match parse_sample(&line) {
            Ok(Some(sample)) => sample,
            Ok(None) => continue,
            Err(bad) => {
                warn!(line = bad, "skipping malformed sample");
                continue;
            }
        };
        for event in detector.push(sample, Instant::now()) {
            if let Event::CoordinatesStable(coords) = &event {
                info!(lat = coords.lat, lon = coords.lon, "stable position reached");
            }
            send_event(&mut stream, &event).await?;
        }
    }

    let _ = stream.close(None).await;
    Ok(())
}

async fn run_watch(ctx: &CtlContext, args: WatchArgs) -> Result<(), CtlError> {
    let url = ws_url(&ctx.base_url, "display")?;
    let (targets_tx, mut targets_rx) = mpsc::channel(8);
    let mut session = DisplaySession::new(args.namespace, ConsoleHost::new(args.targets, targets_tx));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    kiosk::net::run_display(&url, &mut session, &mut targets_rx, shutdown_rx).await?;
    Ok(())
}

async fn open_producer(ctx: &CtlContext) -> Result<Socket, CtlError> {
    let url = ws_url(&ctx.base_url, "producer")?;
    let (mut stream, _) = connect_async(url).await.map_err(ws_error)?;
    wait_for_connected(&mut stream).await?;
    Ok(stream)
}

async fn send_event(stream: &mut Socket, event: &Event) -> Result<(), CtlError> {
    stream.send(Message::Text(frames::encode(event).into())).await.map_err(ws_error)
}

async fn wait_for_connected(stream: &mut Socket) -> Result<(), CtlError> {
    loop {
        match recv_next(stream, Duration::from_secs(5)).await? {
            Event::Connected { connection_id } => {
                info!(%connection_id, "connected to relay");
                return Ok(());
            }
            Event::Error { code, message } => return Err(CtlError::Relay { code, message }),
            _ => {}
        }
    }
}

async fn recv_next(stream: &mut Socket, timeout: Duration) -> Result<Event, CtlError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CtlError::WsClosed);
            };
            match message.map_err(ws_error)? {
                Message::Text(text) => return frames::decode(text.as_str()).map_err(CtlError::from),
                Message::Close(_) => return Err(CtlError::WsClosed),
                _ => {}
            }
        }
    };

    tokio::time::timeout(timeout, fut).await.map_err(|_| CtlError::Timeout)?
}

async fn push_event(args: PushArgs) -> Result<Event, CtlError> {
    if let Some(path) = args.file {
        let text = tokio::fs::read_to_string(path).await?;
        let payload = serde_json::from_str::<Value>(&text)?;
        return Ok(Event::data(args.namespace, payload));
    }
    let error = serde_json::from_str::<Value>(args.error.as_deref().unwrap_or("null"))?;
    Ok(Event::data_error(args.namespace, error))
}

// =============================================================================
// HELPERS
// =============================================================================

fn ws_url(base_url: &str, role: &str) -> Result<String, CtlError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws?role={role}"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws?role={role}"));
    }

    Err(CtlError::InvalidBaseUrl(base_url.to_owned()))
}

/// Parse a `lat lon` (or `lat,lon`) sample line. Blank lines and `#`
/// comments yield `None`; anything else unparseable is returned as the error.
fn parse_sample(line: &str) -> Result<Option<Coordinates>, &str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut fields = trimmed.split(|c: char| c == ',' || c.is_whitespace()).filter(|field| !field.is_empty());
    let (Some(lat), Some(lon), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(trimmed);
    };
    match (lat.parse::<f64>(), lon.parse::<f64>()) {
        (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => Ok(Some(Coordinates { lat, lon })),
        _ => Err(trimmed),
    }
}
