//! Prometheus metrics

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use loan_assist_core::{LanguageCode, TurnFailure};

static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// Install the global recorder. Safe to call more than once; only the first call installs.
pub fn init_metrics() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Metrics recorder not installed");
                None
            }
        })
        .clone()
}

/// Render the current metrics in Prometheus text format
pub fn render() -> String {
    HANDLE
        .get()
        .and_then(|handle| handle.as_ref())
        .map(|handle| handle.render())
        .unwrap_or_default()
}

pub fn record_request(route: String, status: u16) {
    metrics::counter!("loan_assist_http_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
}

/// Count one finished turn, labelled by outcome
pub fn record_turn(language: Option<LanguageCode>, failure: Option<TurnFailure>, elapsed_ms: f64) {
    let language = language.map(|l| l.as_locale()).unwrap_or("unknown");
    let outcome = failure
        .map(|f| f.to_string())
        .unwrap_or_else(|| "delivered".to_string());

    metrics::counter!("loan_assist_turns_total", "language" => language, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("loan_assist_turn_latency_ms").record(elapsed_ms);
}
