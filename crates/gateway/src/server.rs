use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        body::Bytes,
        extract::{Query, State, rejection::QueryRejection},
        http::{StatusCode, header},
        response::{IntoResponse, Json, Response},
        routing::{get, post},
    },
    lexbot_config::{HEALTH_PATH, LexbotConfig},
    lexbot_messenger::{
        PushEvent, SubscriptionQuery, WebhookEnvelope, WebhookOutcome, verify_subscription,
    },
    tower_http::trace::TraceLayer,
    tracing::{debug, info, warn},
};

use crate::state::GatewayState;

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
///
/// The routes were checked when `state` was built, so mounting cannot clash.
pub fn build_app(state: Arc<GatewayState>) -> Router {
    let webhook_path = state.server.webhook_path.clone();
    let git_path = state.server.git_path.clone();

    Router::new()
        .route(HEALTH_PATH, get(health_handler))
        .route(&webhook_path, get(verify_handler).post(webhook_handler))
        .route(&git_path, post(git_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the webhook HTTP server and serve until Ctrl-C.
pub async fn start_gateway(config: &LexbotConfig) -> anyhow::Result<()> {
    let state = GatewayState::from_config(config)?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        webhook = %config.server.webhook_path,
        git = %config.server.git_path,
        "gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.version,
    }))
}

async fn verify_handler(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(pairs)) => SubscriptionQuery::from_pairs(pairs),
        Err(e) => {
            warn!(error = %e, "webhook verification query is malformed");
            return StatusCode::FORBIDDEN.into_response();
        },
    };
    match verify_subscription(&query, state.verify_token()) {
        Some(challenge) => {
            info!("webhook subscription verified");
            ([(header::CONTENT_TYPE, "text/plain")], challenge).into_response()
        },
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

async fn webhook_handler(State(state): State<Arc<GatewayState>>, body: Bytes) -> StatusCode {
    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "webhook body is not valid JSON");
            return StatusCode::BAD_REQUEST;
        },
    };
    if !value.is_object() {
        warn!("webhook body is not a JSON object");
        return StatusCode::BAD_REQUEST;
    }
    let envelope: WebhookEnvelope = match serde_json::from_value(value) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "webhook body is not a valid envelope");
            return StatusCode::BAD_REQUEST;
        },
    };

    match state.bot.handle_envelope(&envelope).await {
        WebhookOutcome::Rejected { object } => {
            warn!(%object, "webhook rejected");
            StatusCode::BAD_REQUEST
        },
        WebhookOutcome::Accepted { events, replies } => {
            debug!(events, replies, "webhook processed");
            StatusCode::OK
        },
    }
}

async fn git_handler(State(state): State<Arc<GatewayState>>, body: Bytes) -> Response {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "git webhook body is not valid JSON");
            return StatusCode::BAD_REQUEST.into_response();
        },
    };

    let outcome = state.bot.handle_push(&PushEvent::decode(&payload)).await;
    debug!(?outcome, "push notification dispatched");
    Json(payload).into_response()
}
