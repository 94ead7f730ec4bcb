//! Plain-text rendering of the dashboard for the command line.

use crate::dtos::UserRowView;
use crate::engine::{
    export_filename, to_csv, Dashboard, DashboardEvent, DashboardSink, DashboardState,
    ExportError, FilterQuery, PaymentClassifier, PaymentSummary,
};
use crate::services::{load_account_rows, metrics, UserStore, LOAD_FAILED_MESSAGE};
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::io::Write;
use std::path::{Path, PathBuf};

const COLUMNS: [&str; 7] = [
    "Account",
    "Name",
    "Email",
    "Clinic",
    "Status",
    "Amount Owed",
    "Payment",
];

/// Writes the summary counters and the visible rows as an aligned table.
pub struct TableReport<W> {
    out: W,
}

impl<W: Write> TableReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_state(&mut self, state: &DashboardState) -> std::io::Result<()> {
        if let Some(error) = state.error() {
            writeln!(self.out, "{}", error)?;
        }

        let summary = state.summary();
        writeln!(
            self.out,
            "Total: {}  Paid: {}  Pending: {}  Overdue: {}",
            summary.total, summary.paid, summary.pending, summary.overdue
        )?;

        let rows: Vec<[String; 7]> = state
            .visible_rows()
            .map(UserRowView::from)
            .map(|v| {
                [
                    v.account,
                    v.name,
                    v.email,
                    v.clinic,
                    v.status,
                    v.amount_owed,
                    v.status_label.to_string(),
                ]
            })
            .collect();

        if rows.is_empty() {
            writeln!(self.out, "No users found")?;
            return Ok(());
        }

        let mut widths = COLUMNS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = COLUMNS.map(str::to_string);
        for line in std::iter::once(&header).chain(&rows) {
            let cells: Vec<String> = line
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect();
            writeln!(self.out, "{}", cells.join("  ").trim_end())?;
        }
        writeln!(self.out, "{} of {} accounts shown", rows.len(), summary.total)
    }
}

impl<W: Write> DashboardSink for TableReport<W> {
    fn render(&mut self, state: &DashboardState) {
        if let Err(e) = self.write_state(state) {
            tracing::warn!(error = %e, "Failed to write report");
        }
    }
}

/// What a report run showed and wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub summary: PaymentSummary,
    pub shown: usize,
    /// `None` when no export was requested or nothing matched.
    pub exported: Option<PathBuf>,
}

/// Load every account, apply `query`, print the table to `out` and
/// optionally write the matching rows as CSV.
///
/// An `export` path naming a directory gets the dated export filename.
/// A load failure is printed and returned as `ServiceUnavailable`.
pub async fn run_report<W: Write>(
    store: &dyn UserStore,
    classifier: &PaymentClassifier,
    query: FilterQuery,
    export: Option<&Path>,
    out: W,
    now: DateTime<Utc>,
) -> Result<ReportOutcome, AppError> {
    let mut dashboard = Dashboard::new();
    let loaded = load_account_rows(store, classifier, now).await;
    let failed = loaded.is_err();
    match loaded {
        Ok(rows) => dashboard.dispatch(DashboardEvent::Loaded(rows)),
        Err(e) => {
            tracing::error!(error = %e, "Error loading users");
            dashboard.dispatch(DashboardEvent::LoadFailed(LOAD_FAILED_MESSAGE.to_string()));
        }
    }
    dashboard.dispatch(DashboardEvent::SearchChanged(query.search));
    dashboard.dispatch(DashboardEvent::PaymentStatusChanged(query.payment_status));
    dashboard.dispatch(DashboardEvent::AccountStatusChanged(query.account_status));

    let state = dashboard.into_state();
    TableReport::new(out).render(&state);
    if failed {
        return Err(AppError::ServiceUnavailable(LOAD_FAILED_MESSAGE.to_string()));
    }

    let mut outcome = ReportOutcome {
        summary: state.summary(),
        shown: state.visible_count(),
        exported: None,
    };

    if let Some(path) = export {
        let path = if path.is_dir() {
            path.join(export_filename(now.date_naive()))
        } else {
            path.to_path_buf()
        };

        match to_csv(state.visible_rows()) {
            Ok(body) => {
                tokio::fs::write(&path, body).await.map_err(|e| {
                    AppError::InternalError(anyhow::anyhow!(
                        "Failed to write {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                metrics::record_export(outcome.shown);
                tracing::info!(rows = outcome.shown, path = %path.display(), "Exported accounts");
                outcome.exported = Some(path);
            }
            Err(ExportError::EmptyInput) => tracing::warn!("{}", ExportError::EmptyInput),
        }
    }

    Ok(outcome)
}
