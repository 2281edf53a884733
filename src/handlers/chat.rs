use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{ActiveBooking, ChatMessage};
use crate::services::assistant::Message;
use crate::services::directives;
use crate::state::AppState;
use crate::store::{self, keys, ChangeSignal};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub tenant_id: String,
    #[serde(default)]
    pub user_location: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetRequest {
    pub tenant_id: String,
}

// POST /api/chat/message
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.messages.is_empty() {
        return Err(AppError::BadRequest("messages must not be empty".to_string()));
    }

    tracing::info!(tenant = %body.tenant_id, turns = body.messages.len(), "chat message");

    let raw = state
        .assistant
        .reply(&body.messages, body.user_location.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "assistant call failed");
            AppError::Assistant(e.to_string())
        })?;

    let reply = directives::extract(&raw);

    // Persist the transcript: the user's latest turn plus the cleaned reply.
    let mut transcript = store::load_transcript(state.store.as_ref())?;
    if let Some(last) = body.messages.last() {
        transcript.push(chat_entry(&last.role, &last.content));
    }
    transcript.push(chat_entry("bot", &reply.clean_text));
    store::save_transcript(state.store.as_ref(), &transcript)?;
    let _ = state.events_tx.send(ChangeSignal::ChatUpdated);

    // A fresh booking directive replaces the draft wholesale.
    if let Some(directive) = &reply.booking {
        store::save_active_booking(
            state.store.as_ref(),
            &ActiveBooking {
                directive: directive.clone(),
                reference_id: None,
            },
        )?;
    }

    // A new plan overwrites the previous one.
    if let Some(plan) = &reply.itinerary {
        let mut plan = plan.clone();
        plan.reindex_days();
        store::save_itinerary(state.store.as_ref(), &plan)?;
        let _ = state.events_tx.send(ChangeSignal::ItineraryUpdated);
    }

    Ok(Json(serde_json::json!({
        "response": reply.clean_text,
        "recommendations": reply.recommendations,
        "booking": reply.booking,
        "itinerary": reply.itinerary,
    })))
}

// POST /api/chat/reset
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!(tenant = %body.tenant_id, "resetting chat context");

    state.store.delete(keys::CHAT_HISTORY)?;
    state.store.delete(keys::ACTIVE_BOOKING)?;
    let _ = state.events_tx.send(ChangeSignal::ChatUpdated);

    Ok(Json(serde_json::json!({ "ok": true })))
}

// GET /api/chat/history
pub async fn history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    Ok(Json(store::load_transcript(state.store.as_ref())?))
}

fn chat_entry(role: &str, content: &str) -> ChatMessage {
    ChatMessage {
        id: uuid::Uuid::new_v4().to_string(),
        role: role.to_string(),
        content: content.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}
