//! Event-log replay handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{EventListResponse, EventQuery};
use crate::app_state::AppState;
use crate::error::GatewayError;

/// Upper bound on events returned per request.
const MAX_EVENT_PAGE: usize = 1_000;

/// `GET /events`: Read the event log from a sequence number.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Replay committed events",
    description = "Returns `pool_funded` and `flash_loan` events with a sequence greater than `after`, in commit order.",
    params(EventQuery),
    responses(
        (status = 200, description = "Page of the event log"),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let limit = query.limit.clamp(1, MAX_EVENT_PAGE);
    let service = &state.flash_loan_service;
    let events = service.events_after(query.after, limit).await;
    let last_sequence = service.last_sequence().await;

    Ok(Json(EventListResponse {
        events,
        last_sequence,
    }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events", get(list_events))
}
