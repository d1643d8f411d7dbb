#![deny(unsafe_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use pulse_adapters::{InsightAgent, MockIdentityBridge, MockPaymentBridge, PulseSample};
use pulse_core::{
    ActivityItem, IdentityProvider, Mood, PaymentProvider, Pulse, PulseEngine, PulseEngineConfig,
    PulseError, PulseStats, Resonance, User, UserState,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub engine: PulseEngineConfig,
    /// Load the demo board on startup.
    pub seed_demo: bool,
}

#[derive(Clone)]
pub struct ServiceState {
    pub engine: Arc<PulseEngine>,
    pub identity: Arc<dyn IdentityProvider>,
    pub payment: Arc<dyn PaymentProvider>,
    pub insight: InsightAgent,
}

impl ServiceState {
    pub fn bootstrap(config: ServiceConfig) -> Self {
        Self::with_providers(
            config,
            Arc::new(MockIdentityBridge::new()),
            Arc::new(MockPaymentBridge),
        )
    }

    pub fn with_providers(
        config: ServiceConfig,
        identity: Arc<dyn IdentityProvider>,
        payment: Arc<dyn PaymentProvider>,
    ) -> Self {
        let engine = PulseEngine::new(config.engine);
        if config.seed_demo {
            engine.seed_demo();
        }
        Self {
            engine: Arc::new(engine),
            identity,
            payment,
            insight: InsightAgent::new(),
        }
    }
}

pub fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/verify", post(verify))
        .route("/v1/pulse", post(create_pulse).get(board))
        .route("/v1/resonate", post(resonate))
        .route("/v1/feed", get(feed))
        .route("/v1/user/:user_id", get(user_state))
        .route("/v1/insights", get(insights))
        .route("/v1/events", get(events))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: StatusCode, message: String },
    #[error(transparent)]
    Core(#[from] PulseError),
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Http { status, message } => (status, message),
            ApiError::Core(err) => {
                let status = match err {
                    PulseError::PulseNotFound => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "pulse-service",
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VerifyRequest {
    alien_id: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct VerifyResponse {
    user: User,
    state: UserState,
}

/// Register the caller. An explicit identity in the body is trusted as
/// already verified; otherwise the configured identity collaborator runs.
async fn verify(
    State(state): State<ServiceState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let (alien_id, display_name) = match (request.alien_id, request.display_name) {
        (Some(id), Some(name)) if !id.trim().is_empty() && !name.trim().is_empty() => (id, name),
        _ => {
            let identity = state.identity.verify().await;
            if !identity.success || !identity.proof_of_human {
                return Err(ApiError::bad_request("identity verification failed"));
            }
            (identity.alien_id, identity.display_name)
        }
    };

    let user = state.engine.register_user(&alien_id, &display_name);
    let user_state = state.engine.user_state(&user.id);
    info!(user_id = %user.id, "user verified");
    Ok(Json(VerifyResponse {
        user,
        state: user_state,
    }))
}

#[derive(Debug, Clone, Deserialize)]
struct CreatePulseRequest {
    user_id: String,
    emoji: String,
    message: String,
    mood: Mood,
}

#[derive(Debug, Clone, Serialize)]
struct CreatePulseResponse {
    pulse: Pulse,
}

async fn create_pulse(
    State(state): State<ServiceState>,
    Json(request): Json<CreatePulseRequest>,
) -> Result<Json<CreatePulseResponse>, ApiError> {
    let pulse = state.engine.create_pulse(
        &request.user_id,
        &request.emoji,
        &request.message,
        request.mood,
    )?;
    Ok(Json(CreatePulseResponse { pulse }))
}

#[derive(Debug, Clone, Serialize)]
struct BoardResponse {
    pulses: Vec<Pulse>,
    stats: PulseStats,
}

async fn board(State(state): State<ServiceState>) -> Json<BoardResponse> {
    Json(BoardResponse {
        pulses: state.engine.active_pulses(),
        stats: state.engine.stats(),
    })
}

#[derive(Debug, Clone, Deserialize)]
struct ResonateRequest {
    from_user_id: String,
    pulse_id: String,
    amount: u32,
}

#[derive(Debug, Clone, Serialize)]
struct ResonateResponse {
    resonance: Resonance,
    state: UserState,
}

/// Authorize through the payment collaborator, then apply the transfer with
/// the returned transaction id attached as an opaque reference.
async fn resonate(
    State(state): State<ServiceState>,
    Json(request): Json<ResonateRequest>,
) -> Result<Json<ResonateResponse>, ApiError> {
    let pulse = state
        .engine
        .pulse(&request.pulse_id)
        .ok_or(PulseError::PulseNotFound)?;

    let payment = state
        .payment
        .send_payment(
            &pulse.user_id,
            request.amount,
            &format!("resonate:{}", pulse.id),
        )
        .await;
    if !payment.success {
        return Err(ApiError::bad_request("payment authorization failed"));
    }

    let resonance = state.engine.add_resonance(
        &request.from_user_id,
        &request.pulse_id,
        request.amount,
        Some(payment.transaction_id),
    )?;
    let user_state = state.engine.user_state(&request.from_user_id);
    Ok(Json(ResonateResponse {
        resonance,
        state: user_state,
    }))
}

#[derive(Debug, Clone, Deserialize)]
struct FeedQuery {
    limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
struct FeedResponse {
    activity: Vec<ActivityItem>,
}

async fn feed(
    State(state): State<ServiceState>,
    Query(query): Query<FeedQuery>,
) -> Json<FeedResponse> {
    let limit = query.limit.unwrap_or(30).min(100);
    Json(FeedResponse {
        activity: state.engine.recent_activity(limit),
    })
}

async fn user_state(
    State(state): State<ServiceState>,
    Path(user_id): Path<String>,
) -> Json<UserState> {
    Json(state.engine.user_state(&user_id))
}

#[derive(Debug, Clone, Deserialize)]
struct InsightsQuery {
    mood: Option<Mood>,
}

async fn insights(
    State(state): State<ServiceState>,
    Query(query): Query<InsightsQuery>,
) -> Json<pulse_adapters::EmotionalIntelligence> {
    let pulses = state.engine.all_pulses();
    let samples: Vec<PulseSample> = pulses.iter().map(PulseSample::from).collect();
    Json(state.insight.analyze(&samples, query.mood))
}

/// Stream ledger events as SSE frames.
///
/// The bus subscription cleans itself up: once the client disconnects the
/// receiver is dropped and the next publish removes the dead sender.
async fn events(
    State(state): State<ServiceState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let subscription = state.engine.subscribe(Box::new(tx));
    debug!(?subscription, "event stream attached");

    let connected = stream::once(async {
        Ok(SseEvent::default().data("{\"type\":\"connected\"}"))
    });
    let updates = UnboundedReceiverStream::new(rx).map(|event| {
        let frame = SseEvent::default()
            .json_data(&event)
            .unwrap_or_else(|_| SseEvent::default().data("{\"type\":\"error\"}"));
        Ok(frame)
    });

    Sse::new(connected.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("heartbeat"),
    )
}
