//! Gateway HTTP server: webhook verification handshake, event intake, and a
//! small read-only records endpoint.

use crate::channels::{parse_envelope, InboundMessage, WhatsAppChannel};
use crate::config::{self, Config};
use crate::init;
use crate::llm::OpenAiClient;
use crate::router::Router;
use crate::storage::{EventLog, SqliteEventLog};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router as AxumRouter,
};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

const DEFAULT_RECORDS_LIMIT: usize = 20;

/// Shared state for the gateway (config, router, transport, event log).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    /// Shared secret for the webhook subscription handshake. When None, the
    /// handshake always fails (and non-loopback binds are refused at startup).
    pub verify_token: Option<String>,
    /// Sender for inbound message units; the processor task receives.
    pub inbound_tx: mpsc::Sender<InboundMessage>,
    pub router: Arc<Router>,
    pub channel: Arc<WhatsAppChannel>,
    pub event_log: Arc<dyn EventLog>,
}

/// Process one inbound message: route it, send the reply, log the delivery.
/// The delivery result is not inspected beyond logging; nothing retries.
async fn process_inbound_message(state: GatewayState, msg: InboundMessage) {
    let payload = state.router.route(&msg).await;
    log::info!(
        "reply to {}: {} payload",
        msg.sender_id,
        payload.variant_name()
    );
    match state.channel.send(&payload, &msg.sender_id).await {
        Ok(result) => {
            log::info!(
                "delivery to {}: {} {}",
                msg.sender_id,
                result.status_code,
                result.reason
            );
        }
        Err(e) => {
            log::warn!("delivery to {} failed: {}", msg.sender_id, e);
        }
    }
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// When bind is not loopback, a verify token must be configured or startup
/// fails. Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config, config_path: PathBuf) -> Result<()> {
    init::require_initialized(&config_path)?;
    let verify_token = config::resolve_verify_token(&config);
    let bind = config.gateway.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) && verify_token.is_none() {
        anyhow::bail!(
            "refusing to bind gateway to {} without a verify token (set whatsapp.verifyToken or WHATSAPP_VERIFY_TOKEN)",
            bind
        );
    }

    let db_path = config::resolve_db_path(&config);
    let event_log: Arc<dyn EventLog> = Arc::new(
        SqliteEventLog::open(&db_path)
            .with_context(|| format!("opening event log at {}", db_path.display()))?,
    );
    let responder = Arc::new(OpenAiClient::from_config(&config));
    let channel = Arc::new(WhatsAppChannel::from_config(&config));
    let router = Arc::new(Router::new(
        event_log.clone(),
        responder,
        config.router.clone(),
    ));

    let (inbound_tx, mut inbound_rx) = mpsc::channel::<InboundMessage>(64);

    let state = GatewayState {
        config: Arc::new(config.clone()),
        verify_token,
        inbound_tx,
        router,
        channel,
        event_log,
    };

    {
        let state_inbound = state.clone();
        tokio::spawn(async move {
            while let Some(msg) = inbound_rx.recv().await {
                process_inbound_message(state_inbound.clone(), msg).await;
            }
        });
    }

    let app = AxumRouter::new()
        .route("/", get(health_http))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/records", get(recent_records))
        .with_state(state);

    let bind_addr = format!("{}:{}", bind, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}

/// GET /webhook — subscription handshake: echo hub.challenge when
/// hub.verify_token matches the configured secret.
async fn verify_webhook(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge");
    match (challenge, token, state.verify_token.as_deref()) {
        (Some(challenge), Some(token), Some(expected)) if token == expected => {
            challenge.clone().into_response()
        }
        _ => {
            log::warn!("webhook verification failed");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Token Invalido" })),
            )
                .into_response()
        }
    }
}

/// POST /webhook — receives the platform event envelope and enqueues one
/// routing job per message unit. A malformed envelope is answered with the
/// same generic acknowledgment; it never reaches the router.
async fn receive_webhook(State(state): State<GatewayState>, body: Bytes) -> Json<serde_json::Value> {
    match parse_envelope(&body) {
        Ok(units) => {
            for unit in units {
                if state.inbound_tx.send(unit).await.is_err() {
                    log::warn!("webhook: inbound queue closed, dropping message");
                }
            }
        }
        Err(e) => {
            log::warn!("webhook: malformed envelope: {}", e);
        }
    }
    Json(json!({ "status": "ok" }))
}

/// GET /records?limit=N — the most recent event log rows, newest first.
async fn recent_records(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let limit = params
        .get("limit")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_RECORDS_LIMIT);
    match state.event_log.recent(limit) {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            log::warn!("records endpoint: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
