//! Loaders for the legacy account exports.
//!
//! Two sources feed the `handyworks_users` collection:
//! - the MS Access export, tab separated, carrying demographics and the
//!   current year's maintenance billing;
//! - the `hwsales.csv` sales export, comma separated with quoting, carrying
//!   demographics only.
//!
//! Both are parsed into [`RawRecord`]s, mapped into store documents keyed by
//! account number, and upserted one at a time.

mod mapping;
mod parse;
mod runner;

pub use mapping::{map_hwsales_record, map_ms_access_record, MappedAccount};
pub use parse::{parse_csv, parse_tsv, RawRecord};
pub use runner::{import_file, import_records, preview_file, ImportFailure, ImportReport};

use chrono::{DateTime, Utc};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{format} file must have at least a header row and one data row")]
    MissingRows { format: &'static str },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed delimited input: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    /// Tab separated MS Access export.
    MsAccessTsv,
    /// Comma separated `hwsales.csv`.
    HwSalesCsv,
}

impl ImportSource {
    /// Value written to each document's `source` field.
    pub fn tag(&self) -> &'static str {
        match self {
            ImportSource::MsAccessTsv => "ms_access_export",
            ImportSource::HwSalesCsv => "hwsales_csv",
        }
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            ImportSource::MsAccessTsv => "TSV",
            ImportSource::HwSalesCsv => "CSV",
        }
    }

    pub fn parse(&self, input: &str) -> Result<Vec<RawRecord>, ImportError> {
        match self {
            ImportSource::MsAccessTsv => parse_tsv(input),
            ImportSource::HwSalesCsv => parse_csv(input),
        }
    }

    pub fn map(&self, record: &RawRecord, now: DateTime<Utc>) -> Option<MappedAccount> {
        match self {
            ImportSource::MsAccessTsv => map_ms_access_record(record, now),
            ImportSource::HwSalesCsv => map_hwsales_record(record, now),
        }
    }
}

impl FromStr for ImportSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" | "ms_access_export" => Ok(ImportSource::MsAccessTsv),
            "csv" | "hwsales_csv" => Ok(ImportSource::HwSalesCsv),
            _ => Err(format!("Invalid import source: {}", s)),
        }
    }
}
