mod app;
mod config;
mod handlers;
mod models;
mod probe;
mod service;
mod simulate;
mod state;

use std::sync::Arc;

use printwatch_common::{bind_listener, env_or, init_tracing, shutdown_signal};

use crate::config::SimulationConfig;
use crate::probe::{DnsResolver, HostResolver};
use crate::state::AppState;

#[tokio::main]
async fn main() {
    let _guards = init_tracing("printer-service");

    let port = env_or("PORT", 8080u16);
    let sim = SimulationConfig::from_env();
    let resolver = Arc::new(DnsResolver);
    tracing::info!(
        resolver = resolver.name(),
        seeded = sim.seed.is_some(),
        status_online_ratio = sim.status_online_ratio,
        details_online_ratio = sim.details_online_ratio,
        delay_min_ms = sim.delay_min.as_millis() as u64,
        delay_max_ms = sim.delay_max.as_millis() as u64,
        "simulation config"
    );

    let state = AppState::new(resolver, sim);
    let app = app::build_router(state);
    let listener = match bind_listener(port).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, port, "bind failed");
            return;
        }
    };

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
    }
}
