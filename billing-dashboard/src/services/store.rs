//! Account document store abstraction.
//!
//! The dashboard only ever bulk-reads the whole collection; the importers
//! upsert one account document at a time.

use crate::engine::PaymentClassifier;
use crate::models::{normalize_documents, AccountRow};
use crate::services::metrics;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use service_core::error::AppError;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Shown to users when the bulk read fails; the cause is only logged.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load users. Please refresh the page.";

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Every account document, unfiltered.
    async fn fetch_all(&self) -> Result<Vec<Document>, AppError>;

    /// Create or merge the document with id `doc_id`: fields in `fields`
    /// overwrite, other stored fields are kept.
    async fn upsert(&self, doc_id: &str, fields: Document) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Bulk-read the store, normalize, and classify as of `now`.
#[instrument(skip(store, classifier))]
pub async fn load_account_rows(
    store: &dyn UserStore,
    classifier: &PaymentClassifier,
    now: DateTime<Utc>,
) -> Result<Vec<AccountRow>, AppError> {
    let docs = store.fetch_all().await?;
    let records = normalize_documents(&docs);
    let rows = classifier.annotate(records, now);

    metrics::record_user_load(rows.len());
    info!(accounts = rows.len(), "Loaded account billing records");

    Ok(rows)
}

/// Store kept in process memory, for tests and dry runs.
#[derive(Default)]
pub struct InMemoryUserStore {
    docs: RwLock<BTreeMap<String, Document>>,
    unavailable: bool,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with documents; each is keyed by its `_id`, falling back to its
    /// `acct_num`, then to its position.
    pub fn with_documents(docs: Vec<Document>) -> Self {
        let map = docs
            .into_iter()
            .enumerate()
            .map(|(i, doc)| {
                let id = doc
                    .get("_id")
                    .or_else(|| doc.get("acct_num"))
                    .map(|v| match v {
                        mongodb::bson::Bson::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| format!("doc-{i:06}"));
                (id, doc)
            })
            .collect();
        Self {
            docs: RwLock::new(map),
            unavailable: false,
        }
    }

    /// A store whose every call fails, as an unreachable backend would.
    pub fn unavailable() -> Self {
        Self {
            docs: RwLock::default(),
            unavailable: true,
        }
    }

    pub async fn get(&self, doc_id: &str) -> Option<Document> {
        self.docs.read().await.get(doc_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "in-memory store marked unavailable"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn fetch_all(&self) -> Result<Vec<Document>, AppError> {
        self.check_available()?;
        Ok(self
            .docs
            .read()
            .await
            .iter()
            .map(|(id, doc)| {
                let mut doc = doc.clone();
                if !doc.contains_key("_id") {
                    doc.insert("_id", id.clone());
                }
                doc
            })
            .collect())
    }

    async fn upsert(&self, doc_id: &str, fields: Document) -> Result<(), AppError> {
        self.check_available()?;
        let mut docs = self.docs.write().await;
        let entry = docs
            .entry(doc_id.to_string())
            .or_insert_with(|| doc! { "_id": doc_id });
        for (key, value) in fields {
            entry.insert(key, value);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;

    #[tokio::test]
    async fn test_upsert_merges_fields() {
        let store = InMemoryUserStore::new();
        store
            .upsert("7", doc! { "acct_num": 7, "fname": "Jane", "owed": 10.0 })
            .await
            .unwrap();
        store
            .upsert("7", doc! { "owed": 0.0, "status": "A" })
            .await
            .unwrap();

        let doc = store.get("7").await.unwrap();
        assert_eq!(doc.get_str("fname").unwrap(), "Jane");
        assert_eq!(doc.get_str("status").unwrap(), "A");
        assert_eq!(doc.get_f64("owed").unwrap(), 0.0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_account_rows_classifies() {
        let store = InMemoryUserStore::with_documents(vec![
            doc! { "acct_num": 1, "owed": 0, "maint_billed": 100, "maint_paid": 100 },
            doc! { "acct_num": 2, "owed": 75 },
        ]);

        let rows = load_account_rows(&store, &PaymentClassifier::default(), Utc::now())
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].payment_status, PaymentStatus::Paid);
        assert_eq!(rows[1].payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryUserStore::unavailable();
        assert!(store.fetch_all().await.is_err());
        assert!(store.health_check().await.is_err());
    }
}
