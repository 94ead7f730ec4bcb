use crate::dtos::{UserListParams, UserRowView, UsersResponse};
use crate::engine::{
    export_filename, to_csv, Dashboard, DashboardEvent, DashboardState, ExportError, FilterQuery,
    PaymentSummary,
};
use crate::services::{load_account_rows, metrics, LOAD_FAILED_MESSAGE};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::NotFound(anyhow::Error::new(err))
    }
}

/// Load every account and fold `query` into a fresh dashboard.
async fn load_dashboard(state: &AppState, query: FilterQuery) -> Result<DashboardState, AppError> {
    let mut dashboard = Dashboard::new();

    match load_account_rows(state.store.as_ref(), &state.classifier, Utc::now()).await {
        Ok(rows) => dashboard.dispatch(DashboardEvent::Loaded(rows)),
        Err(e) => {
            tracing::error!(error = %e, "Error loading users");
            return Err(AppError::ServiceUnavailable(LOAD_FAILED_MESSAGE.to_string()));
        }
    }

    dashboard.dispatch(DashboardEvent::SearchChanged(query.search));
    dashboard.dispatch(DashboardEvent::PaymentStatusChanged(query.payment_status));
    dashboard.dispatch(DashboardEvent::AccountStatusChanged(query.account_status));

    Ok(dashboard.into_state())
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<Json<UsersResponse>, AppError> {
    let query = params.into_query()?;
    let dashboard = load_dashboard(&state, query).await?;

    Ok(Json(UsersResponse {
        summary: dashboard.summary(),
        total_matching: dashboard.visible_count(),
        users: dashboard.visible_rows().map(UserRowView::from).collect(),
    }))
}

pub async fn users_summary(State(state): State<AppState>) -> Result<Json<PaymentSummary>, AppError> {
    let dashboard = load_dashboard(&state, FilterQuery::default()).await?;
    Ok(Json(dashboard.summary()))
}

/// The currently filtered rows as a CSV attachment.
pub async fn export_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.into_query()?;
    let dashboard = load_dashboard(&state, query).await?;

    let body = to_csv(dashboard.visible_rows())?;
    metrics::record_export(dashboard.visible_count());

    let filename = export_filename(Utc::now().date_naive());
    tracing::info!(rows = dashboard.visible_count(), %filename, "Exported accounts");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}

/// Payment link generation is not wired to a payment provider yet.
pub async fn generate_bill(Path(acct_num): Path<String>) -> Result<Json<()>, AppError> {
    tracing::info!(%acct_num, "Bill generation requested");
    Err(AppError::NotImplemented(format!(
        "Bill generation for account {} is not available yet",
        acct_num
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::engine::PaymentClassifier;
    use crate::services::InMemoryUserStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_load_failure_is_logged_once() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let state = AppState {
            config: Arc::new(DashboardConfig::default()),
            store: Arc::new(InMemoryUserStore::unavailable()),
            classifier: PaymentClassifier::default(),
        };

        let err = load_dashboard(&state, FilterQuery::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ServiceUnavailable(ref msg) if msg == LOAD_FAILED_MESSAGE));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }
}
