use super::ImportError;
use crate::models::coerce::is_blank;
use std::collections::BTreeMap;

/// One data row keyed by trimmed header. Blank cells and `None` are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    values: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }

    /// First present value among `headers`, for columns whose name changed
    /// between export versions.
    pub fn first_of(&self, headers: &[&str]) -> Option<&str> {
        headers.iter().find_map(|h| self.get(h))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(_, v)| !is_blank(v))
                .collect(),
        }
    }
}

/// Split one line into raw cells. Quotes never span lines, so an unbalanced
/// quote only affects the rest of its own line.
fn split_line(line: &str, delimiter: u8, quoting: bool) -> Result<Vec<String>, ImportError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quoting(quoting)
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(row) => Ok(row?.iter().map(str::to_string).collect()),
        None => Ok(Vec::new()),
    }
}

fn read_delimited(
    input: &str,
    delimiter: u8,
    quoting: bool,
    format: &'static str,
) -> Result<Vec<RawRecord>, ImportError> {
    let input = input.trim_start_matches('\u{feff}').trim();
    let lines: Vec<&str> = input.split('\n').collect();
    if lines.len() < 2 {
        return Err(ImportError::MissingRows { format });
    }

    let headers: Vec<String> = split_line(lines[0], delimiter, quoting)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    lines[1..]
        .iter()
        .map(|line| {
            let cells = split_line(line, delimiter, quoting)?;
            Ok(headers
                .iter()
                .zip(&cells)
                .map(|(header, value)| (header.as_str(), value.trim()))
                .collect::<RawRecord>())
        })
        .collect()
}

/// Tab separated, no quoting: every tab is a column break.
pub fn parse_tsv(input: &str) -> Result<Vec<RawRecord>, ImportError> {
    read_delimited(input, b'\t', false, "TSV")
}

/// Comma separated; double quotes group commas into one cell and `""` inside
/// a quoted cell is a literal quote.
pub fn parse_csv(input: &str) -> Result<Vec<RawRecord>, ImportError> {
    read_delimited(input, b',', true, "CSV")
}
