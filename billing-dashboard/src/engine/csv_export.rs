use crate::models::AccountRow;
use chrono::NaiveDate;
use std::borrow::Borrow;
use thiserror::Error;

pub const CSV_HEADERS: [&str; 8] = [
    "Account #",
    "First Name",
    "Last Name",
    "Email",
    "Clinic",
    "Status",
    "Amount Owed",
    "Payment Status",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No users to export.")]
    EmptyInput,
}

fn quote(cell: &str) -> String {
    // Embedded quotes and commas are written as-is; consumers of this export
    // already parse it that way.
    format!("\"{}\"", cell)
}

fn csv_row(row: &AccountRow) -> String {
    let record = &row.record;
    let cells = [
        record.acct_num_text(),
        record.first_name.clone().unwrap_or_default(),
        record.last_name.clone().unwrap_or_default(),
        record.email.clone().unwrap_or_default(),
        record.clinic.clone().unwrap_or_default(),
        record.raw_status.clone().unwrap_or_default(),
        record.amount_owed.normalize().to_string(),
        row.payment_status.as_str().to_string(),
    ];
    cells.iter().map(|c| quote(c)).collect::<Vec<_>>().join(",")
}

/// Serialize rows in input order under a fixed header line.
///
/// Lines are joined with `\n` without a trailing newline. An empty input is
/// an error so callers never produce a header-only file.
pub fn to_csv<I, R>(rows: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = R>,
    R: Borrow<AccountRow>,
{
    let mut lines = vec![CSV_HEADERS.join(",")];
    lines.extend(rows.into_iter().map(|row| csv_row(row.borrow())));

    if lines.len() == 1 {
        return Err(ExportError::EmptyInput);
    }

    Ok(lines.join("\n"))
}

/// `handyworks-users-YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("handyworks-users-{}.csv", date.format("%Y-%m-%d"))
}
