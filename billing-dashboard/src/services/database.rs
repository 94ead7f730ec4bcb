use crate::services::store::UserStore;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, UpdateOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

/// MongoDB-backed account store. Documents use the account number as `_id`.
#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, collection = %collection, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self {
            client,
            db,
            collection: collection.to_string(),
        })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for billing-dashboard");

        let acct_num_index = IndexModel::builder()
            .keys(doc! { "acct_num": 1 })
            .options(
                IndexOptions::builder()
                    .name("acct_num_lookup".to_string())
                    .build(),
            )
            .build();

        self.users()
            .create_index(acct_num_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create acct_num index on {} collection: {}",
                    self.collection,
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on {}.acct_num", self.collection);

        Ok(())
    }

    pub fn users(&self) -> Collection<Document> {
        self.db.collection(&self.collection)
    }
}

#[async_trait]
impl UserStore for MongoDb {
    async fn fetch_all(&self) -> Result<Vec<Document>, AppError> {
        let cursor = self.users().find(None, None).await.map_err(AppError::from)?;
        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(AppError::from)
    }

    async fn upsert(&self, doc_id: &str, fields: Document) -> Result<(), AppError> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.users()
            .update_one(doc! { "_id": doc_id }, doc! { "$set": fields }, options)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
