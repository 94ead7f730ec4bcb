#![allow(dead_code)]

use billing_dashboard::config::DashboardConfig;
use billing_dashboard::services::{InMemoryUserStore, UserStore};
use billing_dashboard::startup::Application;
use chrono::{Duration, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn UserStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the dashboard over an in-memory store seeded with `docs`.
    pub async fn spawn_with(docs: Vec<Document>) -> Self {
        Self::spawn_over(Arc::new(InMemoryUserStore::with_documents(docs))).await
    }

    pub async fn spawn() -> Self {
        Self::spawn_with(sample_accounts()).await
    }

    pub async fn spawn_over(store: Arc<dyn UserStore>) -> Self {
        let mut config = DashboardConfig::default();
        config.common.port = 0; // Random port for testing

        let app = Application::build_with_store(config, store.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/metrics", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn days_ago(days: i64) -> BsonDateTime {
    BsonDateTime::from_chrono(Utc::now() - Duration::days(days))
}

/// One account in each payment state plus an inactive one.
///
/// | acct | name        | status | state   |
/// |------|-------------|--------|---------|
/// | 1001 | Jane Doe    | A      | paid    |
/// | 1002 | Tom Smith   | A      | overdue |
/// | 1003 | Ann Lee     | A      | pending |
/// | 1004 | Bob Stone   | I      | pending |
pub fn sample_accounts() -> Vec<Document> {
    vec![
        doc! {
            "_id": "1001", "acct_num": 1001, "fname": "Jane", "lname": "Doe",
            "EMAIL": "jane@example.com", "clinic": "Doe Chiropractic", "status": "A",
            "owed": 0.0, "maint_billed": 555.0, "maint_paid": 555.0,
            "maintbilldt": days_ago(60),
        },
        doc! {
            "_id": "1002", "acct_num": 1002, "fname": "Tom", "lname": "Smith",
            "EMAIL": "tom@example.com", "clinic": "Smith Spine", "status": "A",
            "owed": 75.0, "maint_billed": 75.0, "maint_paid": 0.0,
            "maintbilldt": days_ago(45),
        },
        doc! {
            "_id": "1003", "acct_num": 1003, "fname": "Ann", "lname": "Lee",
            "EMAIL": "ann@example.com", "status": "A",
            "owed": 120.5, "maint_billed": 120.5, "maint_paid": 0.0,
            "maintbilldt": days_ago(5),
        },
        doc! {
            "_id": "1004", "acct_num": 1004, "fname": "Bob", "lname": "Stone",
            "status": "I", "owed": 10.0,
        },
    ]
}
