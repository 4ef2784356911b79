//! HTTP + WebSocket telemetry for a running arbiter
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /state - Latest tick output
//! - GET /finds - Color finds so far
//! - POST /utterance - Inject an utterance into the audio queue
//! - WS /ws - Live tick stream
//!
//! Observational: the tick loop publishes copies of its output here; the
//! only path back into the robot is the audio queue.

use axum::{
    extract::{ws::{Message, WebSocket}, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::core::AudioSender;
use crate::types::{FindEvent, TickOutput};
use crate::FIND_LOG_CAPACITY;

/// Shared telemetry state
#[derive(Debug)]
pub struct Telemetry {
    latest: RwLock<Option<TickOutput>>,
    finds: RwLock<VecDeque<FindEvent>>,
    find_capacity: usize,
    updates: broadcast::Sender<TickOutput>,
    audio: Option<AudioSender>,
}

impl Telemetry {
    /// `audio` enables POST /utterance
    pub fn new(audio: Option<AudioSender>) -> Arc<Self> {
        Self::with_find_capacity(audio, FIND_LOG_CAPACITY)
    }

    /// Keep at most `capacity` finds (at least one)
    pub fn with_find_capacity(audio: Option<AudioSender>, capacity: usize) -> Arc<Self> {
        let (updates, _) = broadcast::channel(256);
        Arc::new(Self {
            latest: RwLock::new(None),
            finds: RwLock::new(VecDeque::new()),
            find_capacity: capacity.max(1),
            updates,
            audio,
        })
    }

    /// Store and broadcast one tick
    pub async fn publish(&self, output: &TickOutput) {
        *self.latest.write().await = Some(output.clone());
        // no subscribers is fine
        let _ = self.updates.send(output.clone());
    }

    pub async fn record_find(&self, find: FindEvent) {
        let mut finds = self.finds.write().await;
        if finds.len() >= self.find_capacity {
            finds.pop_front();
        }
        finds.push_back(find);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TickOutput> {
        self.updates.subscribe()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tick: u64,
}

/// Utterance request
#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
}

/// Utterance response
#[derive(Debug, Serialize)]
pub struct UtteranceResponse {
    pub queued: bool,
}

/// Create the API router
pub fn create_router(telemetry: Arc<Telemetry>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/state", get(get_state))
        .route("/finds", get(get_finds))
        .route("/utterance", post(post_utterance))
        .route("/ws", get(websocket_handler))
        .with_state(telemetry)
}

/// Health check endpoint
async fn health(State(telemetry): State<Arc<Telemetry>>) -> Json<HealthResponse> {
    let latest = telemetry.latest.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        tick: latest.as_ref().map_or(0, |o| o.tick),
    })
}

/// Latest tick output
async fn get_state(State(telemetry): State<Arc<Telemetry>>) -> Result<Json<TickOutput>, StatusCode> {
    let latest = telemetry.latest.read().await;
    latest.clone().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// All finds
async fn get_finds(State(telemetry): State<Arc<Telemetry>>) -> Json<Vec<FindEvent>> {
    Json(telemetry.finds.read().await.iter().cloned().collect())
}

/// Push text into the audio queue as a remote microphone
async fn post_utterance(
    State(telemetry): State<Arc<Telemetry>>,
    Json(req): Json<UtteranceRequest>,
) -> Result<(StatusCode, Json<UtteranceResponse>), StatusCode> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let audio = telemetry.audio.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    if !audio.send_utterance(text) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok((StatusCode::ACCEPTED, Json(UtteranceResponse { queued: true })))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(telemetry): State<Arc<Telemetry>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = telemetry.subscribe();
    ws.on_upgrade(move |socket| handle_websocket(socket, rx))
}

/// Forward ticks until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<TickOutput>) {
    let (mut sender, mut receiver) = socket.split();

    let mut forward = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(output) => {
                    let json = serde_json::to_string(&output).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "websocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut inbound = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut forward => inbound.abort(),
        _ = &mut inbound => forward.abort(),
    }
}

/// Run the API server
pub async fn run_server(addr: &str, telemetry: Arc<Telemetry>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let router = create_router(telemetry);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Rover telemetry running on {}", addr);
    println!("  GET  /health     - Health check");
    println!("  GET  /state      - Latest tick");
    println!("  GET  /finds      - Color finds");
    println!("  POST /utterance  - Inject voice command");
    println!("  WS   /ws         - Live ticks");
    axum::serve(listener, router).await?;
    Ok(())
}
