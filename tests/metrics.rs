// tests/metrics.rs
//
// One test per process: the Prometheus recorder is global.
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use truthlens::credibility::CredibilityHeuristic;
use truthlens::metrics::Metrics;
use truthlens::model::Model;
use truthlens::{create_router, AppState, Engine, Normalizer};

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let metrics = Metrics::init().expect("install recorder");

    let path = format!("{}/tests/fixtures/model_small.json", env!("CARGO_MANIFEST_DIR"));
    let engine = Engine::new(
        Normalizer::default(),
        Model::load(path),
        CredibilityHeuristic::default(),
    );
    engine.classify("Shocking secret hoax").unwrap();
    engine.classify("nothing known here").unwrap();

    let app = create_router(AppState::new(engine)).merge(metrics.router());

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "truthlens_classifications_total{label=\"FAKE\"} 1",
        "truthlens_classifications_total{label=\"REAL\"} 1",
        "truthlens_zero_signal_total 1",
        "truthlens_model_ready 1",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }

    // A second recorder cannot be installed.
    assert!(Metrics::init().is_err());
}
