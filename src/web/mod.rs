//! HTTP host for the simulation engine.
//!
//! Serves the request/response contract of [`crate::protocol`] using Axum.
//!
//! ## Endpoints
//!
//! - `POST /simulateEcosystem`: `{ state, populations }` in, trajectory out
//! - `GET /api/defaults`: the default request
//! - `POST /api/randomize`: a log-normally jittered copy of the posted request
//!
//! ## Usage
//!
//! ```no_run
//! use ecosim::Config;
//! use ecosim::web::run_server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     run_server(config, "127.0.0.1:8080".parse().unwrap()).await.unwrap();
//! }
//! ```

mod routes;
mod server;
mod state;

pub use routes::api_router;
pub use server::run_server;
pub use state::AppState;
