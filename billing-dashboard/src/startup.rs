//! Application startup and lifecycle management.

use crate::config::DashboardConfig;
use crate::engine::PaymentClassifier;
use crate::handlers;
use crate::services::{init_metrics, MongoDb, UserStore};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub store: Arc<dyn UserStore>,
    pub classifier: PaymentClassifier,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/summary", get(handlers::users_summary))
        .route("/api/users/export", get(handlers::export_users))
        .route("/api/users/:acct_num/bill", post(handlers::generate_bill))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Connect to MongoDB and bind the HTTP listener.
    pub async fn build(config: DashboardConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(
            &config.mongodb.uri,
            &config.mongodb.database,
            &config.collection,
        )
        .await?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        Self::build_with_store(config, Arc::new(db)).await
    }

    /// Bind the HTTP listener over an already constructed store.
    pub async fn build_with_store(
        config: DashboardConfig,
        store: Arc<dyn UserStore>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let state = AppState {
            classifier: PaymentClassifier::new(config.overdue_after_days),
            config: Arc::new(config),
            store,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Billing dashboard listening");

        let server = axum::serve(listener, router(state.clone()));

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> Arc<dyn UserStore> {
        self.state.store.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
