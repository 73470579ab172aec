//! Loopback HTTP gateway: the reference transport for driving the bot.
//!
//! Inbound chat messages arrive as JSON posts authenticated by a shared
//! secret; outbound deliveries queue in an outbox the client polls. Real
//! chat-network connectors live outside this crate and only need to
//! implement [`ChatTransport`].

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog::FileCatalogStore;
use crate::config::BotConfig;
use crate::delivery::ChatTransport;
use crate::errors::{BotError, BotResult};
use crate::service::BotService;

const SECRET_HEADER: &str = "x-reelbot-secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkItem {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OutboundPayload {
    Text { text: String },
    Links { text: String, links: Vec<LinkItem> },
    Binary { handle: String, caption: String },
}

/// One queued outbound item, drained through `GET /outbox`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub id: String,
    pub recipient_id: String,
    #[serde(flatten)]
    pub payload: OutboundPayload,
}

/// Transport that queues outbound messages for a polling client.
pub struct QueueTransport {
    outbox: Mutex<VecDeque<OutboundMessage>>,
}

impl QueueTransport {
    pub fn new() -> Self {
        Self {
            outbox: Mutex::new(VecDeque::new()),
        }
    }

    pub fn drain(&self) -> Vec<OutboundMessage> {
        let mut outbox = self.outbox.lock().expect("outbox poisoned");
        outbox.drain(..).collect()
    }

    fn push(&self, recipient_id: &str, payload: OutboundPayload) -> BotResult<()> {
        let mut outbox = self
            .outbox
            .lock()
            .map_err(|_| BotError::Transport("outbox lock poisoned".to_string()))?;
        outbox.push_back(OutboundMessage {
            id: Uuid::new_v4().to_string(),
            recipient_id: recipient_id.to_string(),
            payload,
        });
        Ok(())
    }
}

impl Default for QueueTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for QueueTransport {
    async fn send_text(&self, caller_id: &str, text: &str) -> BotResult<()> {
        self.push(
            caller_id,
            OutboundPayload::Text {
                text: text.to_string(),
            },
        )
    }

    async fn send_links(
        &self,
        caller_id: &str,
        text: &str,
        links: &[(String, String)],
    ) -> BotResult<()> {
        self.push(
            caller_id,
            OutboundPayload::Links {
                text: text.to_string(),
                links: links
                    .iter()
                    .map(|(label, url)| LinkItem {
                        label: label.clone(),
                        url: url.clone(),
                    })
                    .collect(),
            },
        )
    }

    async fn send_binary(&self, caller_id: &str, handle: &str, caption: &str) -> BotResult<()> {
        self.push(
            caller_id,
            OutboundPayload::Binary {
                handle: handle.to_string(),
                caption: caption.to_string(),
            },
        )
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub shared_secret: String,
}

struct GatewayState {
    service: BotService,
    config: BotConfig,
    shared_secret: String,
    transport: Arc<QueueTransport>,
}

/// The HTTP face of the bot.
pub struct BotGateway;

impl BotGateway {
    /// Open the catalog, wire the service together and serve until shutdown.
    pub async fn start(config: BotConfig, gateway: GatewayConfig) -> BotResult<()> {
        let catalog = Arc::new(FileCatalogStore::new(config.catalog_path.clone())?);
        let transport = Arc::new(QueueTransport::new());
        let service = BotService::new(catalog, transport.clone(), &config);

        let state = Arc::new(GatewayState {
            service,
            config,
            shared_secret: gateway.shared_secret,
            transport,
        });

        let router = Router::new()
            .route("/messages", post(inbound_handler))
            .route("/outbox", get(outbox_handler))
            .route("/health", get(health_handler))
            .with_state(state);

        let addr: SocketAddr = gateway
            .bind_addr
            .parse()
            .map_err(|_| BotError::Config(format!("invalid bind address: {}", gateway.bind_addr)))?;
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "reelbot gateway listening");
        axum::serve(listener, router.into_make_service()).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct InboundPayload {
    sender_id: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    upload_handle: Option<String>,
    #[serde(default)]
    caption: Option<String>,
}

#[derive(Debug, Serialize)]
struct InboundResponse {
    accepted: bool,
    message_id: Option<String>,
    error: Option<String>,
}

fn authorized(state: &GatewayState, headers: &HeaderMap) -> bool {
    let secret = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    secret == state.shared_secret
}

async fn inbound_handler(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(payload): Json<InboundPayload>,
) -> impl IntoResponse {
    if !authorized(&state, &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(InboundResponse {
                accepted: false,
                message_id: None,
                error: Some("unauthorized".to_string()),
            }),
        );
    }

    let is_privileged = state.config.is_privileged(&payload.sender_id);

    let outcome = if let Some(handle) = payload.upload_handle.as_deref() {
        state
            .service
            .handle_upload(
                &payload.sender_id,
                handle,
                payload.caption.as_deref(),
                is_privileged,
            )
            .await
    } else if let Some(text) = payload.text.as_deref() {
        state
            .service
            .handle_message(&payload.sender_id, text, is_privileged)
            .await
    } else {
        return (
            StatusCode::BAD_REQUEST,
            Json(InboundResponse {
                accepted: false,
                message_id: None,
                error: Some("either text or upload_handle is required".to_string()),
            }),
        );
    };

    match outcome {
        Ok(()) => (
            StatusCode::OK,
            Json(InboundResponse {
                accepted: true,
                message_id: Some(Uuid::new_v4().to_string()),
                error: None,
            }),
        ),
        Err(e) => {
            error!(sender_id = %payload.sender_id, error = %e, "message handling failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(InboundResponse {
                    accepted: false,
                    message_id: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

async fn outbox_handler(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorized(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(Vec::new()));
    }
    (StatusCode::OK, Json(state.transport.drain()))
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
