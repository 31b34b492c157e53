//! Axum server setup.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};

use crate::Config;

use super::routes::api_router;
use super::state::AppState;

/// Run the web server
pub async fn run_server(config: Config, bind: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(&config));

    // The browser front end posts from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api_router().layer(cors).with_state(state);

    log::info!("Starting simulation server on http://{}", bind);
    log::info!(
        "Limits: divergence ceiling {:e}, max {} steps",
        config.safety.divergence_ceiling,
        config.safety.max_steps
    );

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
