//! HTTP server: router construction and startup.

use std::net::SocketAddr;

use {
    axum::{
        Json, Router,
        body::{Body, Bytes},
        extract::{Path, State},
        http::{StatusCode, header},
        response::{IntoResponse, Response},
        routing::get,
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::{info, warn},
};

use {
    palaver_config::PalaverConfig,
    palaver_providers::{BackendMessage, FallbackChain, values_to_messages},
    palaver_sessions::HistoryItem,
};

use crate::{relay::spawn_relay, state::AppState, time};

/// System preamble prepended to every backend conversation.
const SYSTEM_PROMPT: &str = "You are a friendly assistant.";

/// Build the gateway router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/agents/{name}",
            get(session_read_handler).post(session_write_handler),
        )
        .route("/tools/time", get(time::time_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start_gateway(config: &PalaverConfig, chain: FallbackChain) -> anyhow::Result<()> {
    let state = AppState::new(chain);
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    info!("palaver gateway listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /agents/{name}` — the session transcript, oldest first.
async fn session_read_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.session(&name).history().await {
        Ok(messages) => Json(serde_json::json!({ "messages": messages })).into_response(),
        Err(e) => {
            warn!(session = %name, error = %e, "session actor unavailable");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

/// `POST /agents/{name}` — run one chat turn, streaming the reply.
///
/// The body is read leniently: anything that is not `{"messages": [...]}`
/// is treated as an empty message list rather than rejected.
async fn session_write_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    let incoming = parsed["messages"].as_array().cloned().unwrap_or_default();

    let session = state.session(&name);

    // Save the last user message before invoking the backend.
    if let Some(last) = incoming.last()
        && last["role"].as_str() == Some("user")
        && let Some(text) = last["content"].as_str()
        && let Err(e) = session.append(HistoryItem::user(text)).await
    {
        warn!(session = %name, error = %e, "failed to record user message");
    }

    // The backend sees the full submitted conversation, behind a fixed
    // system preamble.
    let mut messages = vec![BackendMessage::system(SYSTEM_PROMPT)];
    messages.extend(values_to_messages(&incoming));

    let upstream = match state.chain().open_stream(&messages).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(session = %name, error = %e, "no backend candidate produced a stream");
            return (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        },
    };

    // The relay task outlives this handler; the response streams from its
    // passthrough side while the accumulator fills in the background.
    let (passthrough, _task) = spawn_relay(upstream, session);
    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(passthrough),
    )
        .into_response()
}
