//! REST endpoint handlers organized by resource.

pub mod events;
pub mod flash_loan;
pub mod pool;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pool::routes())
        .merge(flash_loan::routes())
        .merge(events::routes())
}
