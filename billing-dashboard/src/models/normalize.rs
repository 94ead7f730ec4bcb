//! Ingestion boundary between raw store documents and [`UserBillingRecord`].
//!
//! The collection is written by several generations of import scripts, so a
//! field can arrive as a number, a numeric string, a BSON date, a date string,
//! or not at all. Every document normalizes to a record; none is rejected.

use super::coerce::{is_blank, parse_currency, parse_date, parse_int_prefix};
use super::record::{fields, UserBillingRecord};
use chrono::{DateTime, TimeZone, Utc};
use mongodb::bson::{Bson, Document};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

impl UserBillingRecord {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            // 0 is not a real account number; treat it as missing.
            acct_num: doc
                .get(fields::ACCT_NUM)
                .and_then(account_number)
                .filter(|n| *n != 0),
            first_name: doc.get(fields::FIRST_NAME).and_then(text),
            last_name: doc.get(fields::LAST_NAME).and_then(text),
            email: doc.get(fields::EMAIL).and_then(text),
            clinic: doc.get(fields::CLINIC).and_then(text),
            raw_status: doc.get(fields::STATUS).and_then(text),
            amount_owed: doc.get(fields::OWED).map(amount).unwrap_or_default(),
            maintenance_billed: doc.get(fields::MAINT_BILLED).map(amount).unwrap_or_default(),
            maintenance_paid: doc.get(fields::MAINT_PAID).map(amount).unwrap_or_default(),
            bill_date: doc.get(fields::MAINT_BILL_DATE).and_then(date),
            paid_date: doc.get(fields::MAINT_PAID_DATE).and_then(date),
        }
    }
}

/// Normalize a bulk read, preserving store order.
pub fn normalize_documents(docs: &[Document]) -> Vec<UserBillingRecord> {
    docs.iter().map(UserBillingRecord::from_document).collect()
}

fn account_number(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
        Bson::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn text(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) if !s.is_empty() => Some(s.clone()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) if n.is_finite() => Some(if n.fract() == 0.0 {
            format!("{}", *n as i64)
        } else {
            n.to_string()
        }),
        _ => None,
    }
}

fn amount(value: &Bson) -> Decimal {
    match value {
        Bson::Int32(n) => Decimal::from(*n),
        Bson::Int64(n) => Decimal::from(*n),
        Bson::Double(n) => Decimal::from_f64(*n).unwrap_or(Decimal::ZERO),
        Bson::String(s) => parse_currency(s),
        _ => Decimal::ZERO,
    }
}

fn date(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => Some(dt.to_chrono()),
        Bson::String(s) if !is_blank(s) => parse_date(s),
        // Firestore timestamps exported as `{ _seconds, _nanoseconds }`
        Bson::Document(inner) => {
            let seconds = inner
                .get("_seconds")
                .or_else(|| inner.get("seconds"))
                .and_then(account_number)?;
            let nanos = inner
                .get("_nanoseconds")
                .or_else(|| inner.get("nanoseconds"))
                .and_then(account_number)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}
