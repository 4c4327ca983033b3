//! TruthLens service: binary entrypoint.
//! Loads configuration and the model artifact once, then serves the Axum API.

use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use truthlens::metrics::Metrics;
use truthlens::{create_router, AppState, Engine, EngineConfig};

/// Install the tracing subscriber. `TRUTHLENS_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("truthlens=info,warn"));

    let json = std::env::var("TRUTHLENS_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: shuttle may already have installed a global subscriber.
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        warn!(target: "truthlens", "tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Recorder first so the engine's startup gauge is captured.
    let metrics = Metrics::init()?;

    let cfg = EngineConfig::from_env()?;
    info!(
        target: "truthlens",
        model = %cfg.model.path.display(),
        top_n = cfg.explain.top_n,
        credibility_match = ?cfg.credibility.match_strategy,
        "configuration loaded"
    );

    // A bad artifact keeps the service up in offline mode; /health reports it.
    let engine = Engine::from_config(&cfg);

    let router = create_router(AppState::new(engine)).merge(metrics.router());

    Ok(router.into())
}
