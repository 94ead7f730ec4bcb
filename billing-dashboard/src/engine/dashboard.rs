//! Dashboard state as a reducer.
//!
//! UI events (search typing, dropdown changes, a completed or failed load)
//! are folded into an immutable [`DashboardState`]; renderers subscribe as
//! [`DashboardSink`]s and never touch the classification logic.

use super::filter::{matches, AccountStatusFilter, FilterQuery, StatusFilter};
use super::summary::{summarize, PaymentSummary};
use crate::models::AccountRow;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// A bulk read finished; replaces every row.
    Loaded(Vec<AccountRow>),
    /// A bulk read failed; existing rows stay visible.
    LoadFailed(String),
    SearchChanged(String),
    PaymentStatusChanged(StatusFilter),
    AccountStatusChanged(AccountStatusFilter),
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    rows: Arc<Vec<AccountRow>>,
    query: FilterQuery,
    summary: PaymentSummary,
    visible: Vec<usize>,
    error: Option<String>,
}

impl DashboardState {
    pub fn rows(&self) -> &[AccountRow] {
        &self.rows
    }

    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    /// Counters over all loaded rows, independent of the current query.
    pub fn summary(&self) -> PaymentSummary {
        self.summary
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &AccountRow> + '_ {
        self.visible.iter().map(move |&i| &self.rows[i])
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn refilter(mut self) -> Self {
        self.visible = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches(row, &self.query))
            .map(|(i, _)| i)
            .collect();
        self
    }
}

pub fn reduce(state: DashboardState, event: DashboardEvent) -> DashboardState {
    match event {
        DashboardEvent::Loaded(rows) => {
            let summary = summarize(&rows);
            DashboardState {
                rows: Arc::new(rows),
                summary,
                error: None,
                ..state
            }
            .refilter()
        }
        DashboardEvent::LoadFailed(message) => DashboardState {
            error: Some(message),
            ..state
        },
        DashboardEvent::SearchChanged(search) => {
            let mut state = state;
            state.query.search = search;
            state.refilter()
        }
        DashboardEvent::PaymentStatusChanged(filter) => {
            let mut state = state;
            state.query.payment_status = filter;
            state.refilter()
        }
        DashboardEvent::AccountStatusChanged(filter) => {
            let mut state = state;
            state.query.account_status = filter;
            state.refilter()
        }
    }
}

/// Anything that renders the dashboard: an HTML table, a JSON response, a
/// terminal report.
pub trait DashboardSink {
    fn render(&mut self, state: &DashboardState);
}

#[derive(Default)]
pub struct Dashboard {
    state: DashboardState,
    sinks: Vec<Box<dyn DashboardSink + Send>>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn DashboardSink + Send>) {
        self.sinks.push(sink);
    }

    /// Apply `event` and notify every sink with the new state.
    pub fn dispatch(&mut self, event: DashboardEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, event);
        for sink in &mut self.sinks {
            sink.render(&self.state);
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn into_state(self) -> DashboardState {
        self.state
    }
}
