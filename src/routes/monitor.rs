use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::constants::MAX_LANDMARKS_PER_FRAME;
use crate::monitor::ear::Landmark;
use crate::response::{created, ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/frames", post(submit_frame))
        .route("/status", get(status))
        .route("/alerts", get(alerts))
}

async fn start(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let status = state.hub().start().await?;
    Ok(created(status))
}

async fn stop(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    let summary = state.hub().stop().await?;
    Ok(ok(summary))
}

/// Landmarks of the single tracked face; `null` or missing when the detector found none.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameRequest {
    #[serde(default)]
    landmarks: Option<Vec<Landmark>>,
}

async fn submit_frame(
    State(state): State<AppState>,
    Json(req): Json<FrameRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if let Some(points) = &req.landmarks {
        if points.len() > MAX_LANDMARKS_PER_FRAME {
            return Err(AppError::bad_request(
                "TOO_MANY_LANDMARKS",
                &format!("At most {MAX_LANDMARKS_PER_FRAME} landmarks per frame"),
            ));
        }
    }

    let outcome = state.hub().process_frame(req.landmarks.as_deref()).await?;
    Ok(ok(outcome))
}

async fn status(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    let status = state.hub().status().await?;
    Ok(ok(status))
}

async fn alerts(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    let alerts = state.hub().alerts().await?;
    Ok(ok(alerts))
}
