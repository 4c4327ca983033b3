use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!(
            "truthlens_classifications_total",
            "Verdicts produced, by label"
        );
        describe_counter!(
            "truthlens_zero_signal_total",
            "Verdicts where no token matched the vocabulary"
        );
        describe_counter!(
            "truthlens_model_unavailable_total",
            "Calls rejected because the model is offline"
        );
        describe_gauge!("truthlens_model_ready", "1 when a model artifact is loaded");

        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
