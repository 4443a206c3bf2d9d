//! Demo Data Route

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create the fixed demo locations and thermometers
pub async fn init_demo_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Initializing demo data");
    state.repository.seed_demo_data().await?;

    Ok(Json(MessageResponse {
        message: "Demo data created".to_string(),
    }))
}
