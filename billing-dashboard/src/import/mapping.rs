use super::parse::RawRecord;
use super::ImportSource;
use crate::models::coerce::{parse_currency, parse_date, parse_float_lenient, parse_int_prefix};
use crate::models::fields;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Demographic columns copied verbatim from the Access export.
const ACCESS_TEXT_COLUMNS: [&str; 13] = [
    "lname",
    "fname",
    "clinic",
    "EMAIL",
    "tele1",
    "HomePhone",
    "CellPhone",
    "addr1",
    "addr2",
    "city",
    "state",
    "zip",
    "status",
];

/// Sales export column → stored field.
const HWSALES_TEXT_COLUMNS: [(&str, &str); 11] = [
    ("First Name", "fname"),
    ("Last Name", "lname"),
    ("Clinic", "clinic"),
    ("E-mail Address", "EMAIL"),
    ("Home Street", "addr1"),
    ("Home City", "city"),
    ("Home State", "state"),
    ("Home Postal Code", "zip"),
    ("Home Phone", "HomePhone"),
    ("Work Phone", "tele1"),
    ("Mobile Phone", "CellPhone"),
];

/// A store-ready account document.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedAccount {
    pub acct_num: i64,
    pub fields: Document,
}

impl MappedAccount {
    /// Documents are keyed by the account number's decimal text.
    pub fn doc_id(&self) -> String {
        self.acct_num.to_string()
    }
}

fn money(amount: Decimal) -> Bson {
    Bson::Double(amount.to_f64().unwrap_or(0.0))
}

fn date(value: Option<DateTime<Utc>>) -> Bson {
    value
        .map(|dt| Bson::DateTime(bson::DateTime::from_chrono(dt)))
        .unwrap_or(Bson::Null)
}

fn text(value: Option<&str>) -> Bson {
    value
        .map(|v| Bson::String(v.to_string()))
        .unwrap_or(Bson::Null)
}

/// Map one Access export row. Rows without a usable `acct_num` are skipped.
pub fn map_ms_access_record(record: &RawRecord, now: DateTime<Utc>) -> Option<MappedAccount> {
    let raw_acct = record.get(fields::ACCT_NUM)?;
    let Some(acct_num) = parse_int_prefix(raw_acct) else {
        tracing::warn!(acct_num = %raw_acct, "Invalid acct_num, skipping record");
        return None;
    };

    let mut doc = Document::new();
    doc.insert(fields::ACCT_NUM, acct_num);
    for column in ACCESS_TEXT_COLUMNS {
        doc.insert(column, text(record.get(column)));
    }

    let billed = record.first_of(&["maint billed", fields::MAINT_BILLED]);
    let paid = record.first_of(&["maint paid", fields::MAINT_PAID]);
    doc.insert(fields::MAINT_BILLED, money(billed.map(parse_currency).unwrap_or_default()));
    doc.insert(fields::MAINT_PAID, money(paid.map(parse_currency).unwrap_or_default()));
    doc.insert(
        fields::MAINT_BILL_DATE,
        date(record.get(fields::MAINT_BILL_DATE).and_then(parse_date)),
    );
    doc.insert(
        fields::MAINT_PAID_DATE,
        date(record.get(fields::MAINT_PAID_DATE).and_then(parse_date)),
    );
    doc.insert(
        fields::OWED,
        money(
            record
                .get(fields::OWED)
                .and_then(parse_float_lenient)
                .unwrap_or_default(),
        ),
    );

    doc.insert(fields::IMPORTED_AT, bson::DateTime::from_chrono(now));
    doc.insert(fields::SOURCE, ImportSource::MsAccessTsv.tag());

    Some(MappedAccount {
        acct_num,
        fields: doc,
    })
}

/// Map one sales export row. Accounts are marked active and their billing
/// totals reset; rows without a positive `Acct_Num` are skipped.
pub fn map_hwsales_record(record: &RawRecord, now: DateTime<Utc>) -> Option<MappedAccount> {
    let Some(acct_num) = record
        .get("Acct_Num")
        .and_then(parse_int_prefix)
        .filter(|n| *n > 0)
    else {
        tracing::warn!(record = ?record, "Could not find valid acct_num in record, skipping");
        return None;
    };

    let mut doc = Document::new();
    doc.insert(fields::ACCT_NUM, acct_num);
    for (column, field) in HWSALES_TEXT_COLUMNS {
        doc.insert(field, text(record.get(column)));
    }
    doc.insert("addr2", Bson::Null);
    doc.insert(fields::STATUS, "A");

    doc.insert(fields::MAINT_BILLED, money(Decimal::ZERO));
    doc.insert(fields::MAINT_PAID, money(Decimal::ZERO));
    doc.insert(fields::MAINT_BILL_DATE, Bson::Null);
    doc.insert(fields::MAINT_PAID_DATE, Bson::Null);
    doc.insert(fields::OWED, money(Decimal::ZERO));

    doc.insert(fields::IMPORTED_AT, bson::DateTime::from_chrono(now));
    doc.insert(fields::SOURCE, ImportSource::HwSalesCsv.tag());

    Some(MappedAccount {
        acct_num,
        fields: doc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{parse_csv, parse_tsv};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_access_row_mapping() {
        let records = parse_tsv(
            "acct_num\tfname\tlname\tEMAIL\tstatus\tmaint billed\tmaint paid\tmaintbilldt\towed\n\
             1042\tJane\tDoe\tjane@example.com\tA\t$555.00\t$0.00\t1/1/2025\t555\n",
        )
        .unwrap();

        let mapped = map_ms_access_record(&records[0], now()).unwrap();
        let doc = &mapped.fields;

        assert_eq!(mapped.doc_id(), "1042");
        assert_eq!(doc.get_i64("acct_num").unwrap(), 1042);
        assert_eq!(doc.get_str("fname").unwrap(), "Jane");
        assert_eq!(doc.get_str("EMAIL").unwrap(), "jane@example.com");
        assert_eq!(doc.get("clinic"), Some(&Bson::Null));
        assert_eq!(doc.get_f64("maint_billed").unwrap(), 555.0);
        assert_eq!(doc.get_f64("maint_paid").unwrap(), 0.0);
        assert_eq!(doc.get_f64("owed").unwrap(), 555.0);
        assert_eq!(
            doc.get_datetime("maintbilldt").unwrap().to_chrono(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(doc.get("maintpddt"), Some(&Bson::Null));
        assert_eq!(doc.get_str("source").unwrap(), "ms_access_export");
    }

    #[test]
    fn test_access_underscore_billing_columns() {
        let records = parse_tsv("acct_num\tmaint_billed\towed\n5\t120.5\t$10\n").unwrap();
        let mapped = map_ms_access_record(&records[0], now()).unwrap();
        assert_eq!(mapped.fields.get_f64("maint_billed").unwrap(), 120.5);
        // owed is a plain number column; currency symbols are not stripped
        assert_eq!(mapped.fields.get_f64("owed").unwrap(), 0.0);
    }

    #[test]
    fn test_access_rows_without_account_are_skipped() {
        let records = parse_tsv("acct_num\tfname\n\tJane\nabc\tTom\n").unwrap();
        assert!(records
            .iter()
            .all(|r| map_ms_access_record(r, now()).is_none()));
    }

    #[test]
    fn test_hwsales_row_mapping() {
        let records = parse_csv(
            "First Name,Acct_Num,Sale,Last Name,E-mail Address,Home Street,Home City,Home State,Home Postal Code,Home Phone,Work Phone,Mobile Phone,Clinic\r\n\
             Tom,77,Yes,Smith,tom@example.com,1 Main St,Springfield,IL,62701,555-0100,,555-0199,\"Smith, Chiropractic\"\r\n",
        )
        .unwrap();

        let mapped = map_hwsales_record(&records[0], now()).unwrap();
        let doc = &mapped.fields;

        assert_eq!(mapped.acct_num, 77);
        assert_eq!(doc.get_str("fname").unwrap(), "Tom");
        assert_eq!(doc.get_str("lname").unwrap(), "Smith");
        assert_eq!(doc.get_str("clinic").unwrap(), "Smith, Chiropractic");
        assert_eq!(doc.get_str("addr1").unwrap(), "1 Main St");
        assert_eq!(doc.get_str("CellPhone").unwrap(), "555-0199");
        assert_eq!(doc.get("tele1"), Some(&Bson::Null));
        assert_eq!(doc.get("addr2"), Some(&Bson::Null));
        assert_eq!(doc.get_str("status").unwrap(), "A");
        assert_eq!(doc.get_f64("owed").unwrap(), 0.0);
        assert_eq!(doc.get_str("source").unwrap(), "hwsales_csv");
    }

    #[test]
    fn test_hwsales_requires_positive_account() {
        let records = parse_csv("First Name,Acct_Num\nA,0\nB,-3\nC,\n").unwrap();
        assert!(records.iter().all(|r| map_hwsales_record(r, now()).is_none()));
    }
}
