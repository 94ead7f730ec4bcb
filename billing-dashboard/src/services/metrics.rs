//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint handler.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops, so test
/// binaries may call it from every test.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
    }
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_user_load(accounts: usize) {
    counter!("dashboard_user_loads_total").increment(1);
    metrics::gauge!("dashboard_accounts_loaded").set(accounts as f64);
}

pub fn record_export(rows: usize) {
    counter!("dashboard_exports_total").increment(1);
    counter!("dashboard_exported_rows_total").increment(rows as u64);
}

/// `outcome` is one of `imported`, `skipped`, `failed`.
pub fn record_import(source: &'static str, outcome: &'static str) {
    counter!("import_records_total", "source" => source, "outcome" => outcome).increment(1);
}
