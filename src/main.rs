//! michi server binary.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl http://localhost:3000/stations?tags=温泉
//!   curl -X POST http://localhost:3000/stamps \
//!        -H 'content-type: application/json' \
//!        -d '{"station_id":1,"source":"gps"}'
//!   curl http://localhost:3000/progress/overall

use michi::{Config, Server, rally};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), michi::Error> {
    let config = Config::from_env()?;
    michi::telemetry::init(config.log_format)?;

    let state = rally::AppState::seeded();
    info!(version = state.version(), "loaded demo dataset");

    Server::bind(config.socket_addr())
        .serve(rally::router(state))
        .await
}
