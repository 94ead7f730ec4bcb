use super::parse::RawRecord;
use super::{ImportError, ImportSource};
use crate::services::metrics;
use crate::services::{InMemoryUserStore, UserStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, instrument, warn};

const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    pub acct_num: i64,
    pub error: String,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn error_count(&self) -> usize {
        self.failures.len()
    }
}

/// Map and upsert `records` one at a time. A failed write is recorded and
/// the run continues.
pub async fn import_records(
    store: &dyn UserStore,
    source: ImportSource,
    records: &[RawRecord],
    now: DateTime<Utc>,
) -> ImportReport {
    let mut report = ImportReport::default();

    for record in records {
        let Some(account) = source.map(record, now) else {
            report.skipped += 1;
            metrics::record_import(source.tag(), "skipped");
            continue;
        };

        match store.upsert(&account.doc_id(), account.fields).await {
            Ok(()) => {
                report.imported += 1;
                metrics::record_import(source.tag(), "imported");
                if report.imported % PROGRESS_EVERY == 0 {
                    info!(imported = report.imported, "Import progress");
                }
            }
            Err(e) => {
                error!(acct_num = account.acct_num, error = %e, "Failed to import account");
                metrics::record_import(source.tag(), "failed");
                report.failures.push(ImportFailure {
                    acct_num: account.acct_num,
                    error: e.to_string(),
                });
            }
        }
    }

    if report.error_count() > 0 {
        warn!(
            failed = report.error_count(),
            "Some accounts could not be imported"
        );
    }
    info!(
        source = source.tag(),
        imported = report.imported,
        skipped = report.skipped,
        failed = report.error_count(),
        "Import complete"
    );

    report
}

/// Read, parse and import the file at `path`.
#[instrument(skip(store))]
pub async fn import_file(
    store: &dyn UserStore,
    source: ImportSource,
    path: &Path,
    now: DateTime<Utc>,
) -> Result<ImportReport, ImportError> {
    let input = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ImportError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

    let records = source.parse(&input)?;
    info!(
        records = records.len(),
        format = source.format_name(),
        "Parsed import file"
    );

    Ok(import_records(store, source, &records, now).await)
}

/// Map and count the file at `path` without touching any real store.
pub async fn preview_file(
    source: ImportSource,
    path: &Path,
    now: DateTime<Utc>,
) -> Result<ImportReport, ImportError> {
    info!("Dry run: records are mapped but not written");
    import_file(&InMemoryUserStore::new(), source, path, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parse_tsv;
    use crate::services::InMemoryUserStore;

    #[tokio::test]
    async fn test_import_counts_and_skips() {
        let store = InMemoryUserStore::new();
        let records = parse_tsv(
            "acct_num\tfname\towed\n1\tJane\t10\n\tNobody\t5\n2\tTom\t0\n",
        )
        .unwrap();

        let report = import_records(&store, ImportSource::MsAccessTsv, &records, Utc::now()).await;

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.error_count(), 0);
        assert_eq!(store.len().await, 2);
        assert_eq!(
            store.get("1").await.unwrap().get_str("fname").unwrap(),
            "Jane"
        );
    }

    #[tokio::test]
    async fn test_write_failures_are_collected() {
        let store = InMemoryUserStore::unavailable();
        let records = parse_tsv("acct_num\n1\n2\n").unwrap();

        let report = import_records(&store, ImportSource::MsAccessTsv, &records, Utc::now()).await;

        assert_eq!(report.imported, 0);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.failures[0].acct_num, 1);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let store = InMemoryUserStore::new();
        let err = import_file(
            &store,
            ImportSource::HwSalesCsv,
            Path::new("/nonexistent/hwsales.csv"),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
