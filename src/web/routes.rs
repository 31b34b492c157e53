//! REST API routes for the web server.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};

use crate::error::EcoError;
use crate::integrator::Trajectory;
use crate::perturbation::Perturber;
use crate::protocol::SimulationRequest;

use super::state::AppState;

/// Create the API router
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/simulateEcosystem", post(simulate_ecosystem))
        .route("/api/defaults", get(get_defaults))
        .route("/api/randomize", post(randomize))
}

/// Engine error mapped onto an HTTP status with a plain-text body.
pub struct ApiError(EcoError);

impl From<EcoError> for ApiError {
    fn from(err: EcoError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            EcoError::Validation(_) => StatusCode::BAD_REQUEST,
            EcoError::Diverged { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.0.to_string()).into_response()
    }
}

// --- Simulation ---

// Body is taken as text so malformed JSON is reported as a validation error.
async fn simulate_ecosystem(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<Trajectory>, ApiError> {
    let request = SimulationRequest::from_json(&body)?;
    let limits = state.limits;

    let trajectory = tokio::task::spawn_blocking(move || request.run(limits))
        .await
        .map_err(|e| {
            log::error!("Simulation task failed: {}", e);
            EcoError::Io(std::io::Error::other(e))
        })??;

    log::debug!("Simulation served: {} records", trajectory.len());
    Ok(Json(trajectory))
}

// --- Parameters ---

async fn get_defaults(State(state): State<Arc<AppState>>) -> Json<SimulationRequest> {
    Json(state.defaults.clone())
}

async fn randomize(body: String) -> Result<Json<SimulationRequest>, ApiError> {
    let request = SimulationRequest::from_json(&body)?;
    let mut perturber = Perturber::new();
    Ok(Json(perturber.jitter_request(&request)))
}
