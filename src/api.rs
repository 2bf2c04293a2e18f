//! HTTP surface for the triage pipeline.
//!
//! The API layer builds a fresh `TicketState` per request, drives one
//! pipeline run, and shapes the terminal state into the response envelope.
//! A captured stage fault is surfaced verbatim in an error envelope; the
//! caller still gets a 200 with a generic apology reply.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::pipeline::{TicketState, TriagePipeline};

/// Body fields accepted as the ticket description, in priority order.
const DESCRIPTION_ALIASES: &[&str] = &["description", "content", "text", "body", "message"];

/// Generic reply returned when a run faults internally.
const FAULT_REPLY: &str = "We encountered an issue while processing your ticket.";

/// Longest auto-derived subject, in characters.
const MAX_DERIVED_SUBJECT: usize = 100;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TriagePipeline>,
}

/// Build the router with all triage routes and permissive CORS.
pub fn routes(pipeline: Arc<TriagePipeline>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/resolve_ticket", post(resolve_ticket))
        .route("/api/process_ticket", post(process_ticket))
        .layer(CorsLayer::permissive())
        .with_state(AppState { pipeline })
}

// ── Health ──────────────────────────────────────────────────────────────

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Ticket triage API is running",
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "endpoints": {
            "resolve_ticket": "/resolve_ticket",
            "process_ticket": "/api/process_ticket",
            "health": "/health",
        },
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

// ── Ticket resolution ───────────────────────────────────────────────────

/// Typed request body for `/resolve_ticket`.
#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub ticket_id: String,
    pub subject: String,
    pub description: String,
    /// Accepted for compatibility; used as the ticket body only when
    /// `description` is empty.
    #[serde(default)]
    pub text: Option<String>,
}

async fn resolve_ticket(
    State(state): State<AppState>,
    Json(request): Json<TicketRequest>,
) -> impl IntoResponse {
    let description = if request.description.is_empty() {
        request.text.clone().unwrap_or_default()
    } else {
        request.description.clone()
    };

    let started = Instant::now();
    let result = state
        .pipeline
        .run(TicketState::new(
            &request.ticket_id,
            &request.subject,
            description,
        ))
        .await;
    let elapsed = started.elapsed().as_secs_f64();

    if let Some(fault) = &result.error {
        warn!(ticket_id = %request.ticket_id, fault = %fault, "Run faulted");
        return Json(serde_json::json!({
            "ticket_id": request.ticket_id,
            "error": fault.to_string(),
            "category": "Unknown",
            "escalated": false,
            "response": FAULT_REPLY,
            "timestamp": Utc::now().to_rfc3339(),
        }));
    }

    Json(serde_json::json!({
        "ticket_id": result.ticket_id,
        "output": result.final_reply.as_deref().unwrap_or("No response generated"),
        "category": result.category.map(|c| c.as_str()).unwrap_or("Unknown"),
        "escalated": result.escalated,
        "timestamp": Utc::now().to_rfc3339(),
        "processing_time": elapsed,
    }))
}

/// Flexible-body variant: the description may arrive under several field
/// names, and ticket_id/subject are derived when missing.
async fn process_ticket(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let ticket_id = body
        .get("ticket_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(generated_ticket_id);

    let Some(description) = extract_description(&body) else {
        return Json(serde_json::json!({
            "error": "Missing ticket description",
            "status": "error",
            "ticket_id": ticket_id,
        }));
    };

    let subject = match body.get("subject").and_then(Value::as_str) {
        Some(subject) if !subject.is_empty() => subject.to_string(),
        _ => derived_subject(&description),
    };

    info!(ticket_id = %ticket_id, subject = %subject, "Processing ticket");

    let started = Instant::now();
    let result = state
        .pipeline
        .run(TicketState::new(&ticket_id, &subject, &description))
        .await;
    let elapsed = started.elapsed().as_secs_f64();

    if let Some(fault) = &result.error {
        warn!(ticket_id = %ticket_id, fault = %fault, "Run faulted");
        return Json(serde_json::json!({
            "error": fault.to_string(),
            "status": "error",
            "ticket_id": ticket_id,
            "category": "Unknown",
            "escalated": false,
            "response": FAULT_REPLY,
            "timestamp": Utc::now().to_rfc3339(),
        }));
    }

    Json(serde_json::json!({
        "ticket_id": result.ticket_id,
        "category": result.category.map(|c| c.as_str()).unwrap_or("Unknown"),
        "response": result.final_reply.as_deref().unwrap_or("No response generated"),
        "escalated": result.escalated,
        "timestamp": Utc::now().to_rfc3339(),
        "processing_time_seconds": elapsed,
    }))
}

/// First present, non-empty description field.
fn extract_description(body: &Value) -> Option<String> {
    DESCRIPTION_ALIASES
        .iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First line of the description, capped at 100 characters.
fn derived_subject(description: &str) -> String {
    description
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(MAX_DERIVED_SUBJECT)
        .collect()
}

fn generated_ticket_id() -> String {
    format!("TICKET-{}", Utc::now().format("%Y%m%d%H%M%S"))
}
