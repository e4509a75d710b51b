//! Reading spreadsheet exports.
//!
//! Inventory and sales reports are exported from the point-of-sale system as
//! CSV files with a few rows of report metadata above the real column header.
//! A [`Table`] holds the header and data rows of one such file, and resolves
//! the columns a caller needs from lists of accepted labels.
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use std::{
    fmt::{self, Display},
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

/// Number of metadata rows above the column header in report exports.
pub const REPORT_METADATA_ROWS: usize = 4;

/// Largest magnitude accepted as a cell value. Beyond this, whole units and
/// cents are no longer exact, and totals can overflow.
pub const MAX_MAGNITUDE: f64 = 9_007_199_254_740_992.0;

/// Why a whole source contributed nothing to a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file does not exist")]
    Missing,
    #[error("cannot read table: {0}")]
    Unreadable(String),
    #[error("no column found for {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<&'static str> },
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        Self::Unreadable(err.to_string())
    }
}

/// A source that was left out of a run, and the reason.
#[derive(Debug)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: SourceError,
}

impl Display for SkippedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {}: {}", self.path.display(), self.reason)
    }
}

/// How a column is recognised: the field it supplies, and the header labels
/// accepted for it, most preferred first.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub labels: &'static [&'static str],
    pub required: bool,
}

impl Field {
    #[must_use]
    pub const fn required(name: &'static str, labels: &'static [&'static str]) -> Self {
        Self {
            name,
            labels,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, labels: &'static [&'static str]) -> Self {
        Self {
            name,
            labels,
            required: false,
        }
    }
}

/// Column indexes resolved for a list of [`Field`]s, in the same order.
///
/// An optional field with no matching column is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns(Vec<Option<usize>>);

impl Columns {
    /// Returns the column for the field at `position` in the resolved list.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<usize> {
        self.0.get(position).copied().flatten()
    }
}

/// The header and data rows of one CSV file.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Reads the table at `path`, skipping `skip_rows` metadata rows before
    /// the header row.
    ///
    /// The file is closed before this function returns, whether or not it
    /// could be parsed.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Missing`] if there is no file at `path`, and
    /// [`SourceError::Unreadable`] if it cannot be opened or parsed, or has
    /// no header row.
    pub fn from_path(path: impl AsRef<Path>, skip_rows: usize) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SourceError::Missing,
            _ => SourceError::Unreadable(err.to_string()),
        })?;
        Self::from_reader(file, skip_rows)
    }

    /// Reads a table from `rdr`, as [`Self::from_path`] does.
    ///
    /// The metadata rows are counted as physical lines, blank lines included.
    /// Cells that are not valid UTF-8 are decoded lossily, so a badly encoded
    /// row never fails the whole table.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unreadable`] if the data cannot be read or has
    /// no header row.
    pub fn from_reader(rdr: impl Read, skip_rows: usize) -> Result<Self, SourceError> {
        let mut rdr = BufReader::new(rdr);
        let mut line = Vec::new();
        for _ in 0..skip_rows {
            line.clear();
            rdr.read_until(b'\n', &mut line)
                .map_err(|err| SourceError::Unreadable(err.to_string()))?;
        }
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(rdr);
        let mut records = rdr.byte_records().map(|record| record.map(decode));
        let Some(header) = records.next() else {
            return Err(SourceError::Unreadable(format!(
                "no header row after {skip_rows} metadata rows"
            )));
        };
        let headers = header?
            .iter()
            .map(|label| label.trim_start_matches('\u{feff}').to_string())
            .collect();
        let rows = records.collect::<Result<Vec<_>, csv::Error>>()?;
        Ok(Self { headers, rows })
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of the first column whose label equals one of
    /// `labels`, ignoring case. Earlier labels take precedence.
    #[must_use]
    pub fn find_column(&self, labels: &[&str]) -> Option<usize> {
        labels.iter().find_map(|label| {
            self.headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(label))
        })
    }

    /// Returns the index of the first column whose label contains `needle`,
    /// ignoring case.
    #[must_use]
    pub fn find_column_containing(&self, needle: &str) -> Option<usize> {
        let needle = needle.to_lowercase();
        self.headers
            .iter()
            .position(|header| header.to_lowercase().contains(&needle))
    }

    /// Resolves a column for each of `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::SchemaMismatch`] naming every required field
    /// with no matching column.
    pub fn resolve(&self, fields: &[Field]) -> Result<Columns, SourceError> {
        let columns: Vec<_> = fields
            .iter()
            .map(|field| self.find_column(field.labels))
            .collect();
        let missing: Vec<_> = fields
            .iter()
            .zip(&columns)
            .filter(|(field, column)| field.required && column.is_none())
            .map(|(field, _)| field.name)
            .collect();
        if !missing.is_empty() {
            return Err(SourceError::SchemaMismatch { missing });
        }
        Ok(Columns(columns))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|record| Row { record })
    }
}

fn decode(record: ByteRecord) -> StringRecord {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .into()
}

/// One data row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Returns the text in `column`, or `None` if the column is absent or the
    /// cell is blank.
    #[must_use]
    pub fn text(&self, column: Option<usize>) -> Option<&'a str> {
        column
            .and_then(|i| self.record.get(i))
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
    }

    /// Returns the number in `column`, or `None` if the cell is blank or not
    /// a number. See [`parse_number`].
    #[must_use]
    pub fn number(&self, column: Option<usize>) -> Option<f64> {
        self.text(column).and_then(parse_number)
    }
}

/// Reads a spreadsheet-formatted number.
///
/// Accepts plain decimals, a leading `$`, `,` thousands separators and
/// accounting negatives such as `(12.50)`. Anything else, including `NaN`,
/// infinities and values larger than [`MAX_MAGNITUDE`], is not a number.
///
/// # Examples
///
/// ```
/// # use brand_ppi::table::parse_number;
/// assert_eq!(parse_number("1,234.50"), Some(1234.5));
/// assert_eq!(parse_number("($12.00)"), Some(-12.0));
/// assert_eq!(parse_number("n/a"), None);
/// ```
#[must_use]
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    let (negative, cell) = match cell.strip_prefix('(').and_then(|c| c.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, cell),
    };
    let (sign, cell) = match cell.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, cell),
    };
    let digits = cell.strip_prefix('$').unwrap_or(cell).replace(',', "");
    if digits.starts_with('-') {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() || value.abs() > MAX_MAGNITUDE {
        return None;
    }
    let value = sign * value;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Inventory Receive Costing report
Store: Main St
Period: 1/1/2025 - 9/13/2025
,,,
Vendor Name,Product,QTY,Inventory Cost
Acme Farm LLC,Gummies,10,100.00
 Blue Sky ,Vape,\"1,000\",\"2,500.00\"
";

    #[test]
    fn from_reader_fn_skips_metadata_rows_before_header() {
        let table = Table::from_reader(REPORT.as_bytes(), REPORT_METADATA_ROWS).unwrap();
        assert_eq!(
            table.headers(),
            ["Vendor Name", "Product", "QTY", "Inventory Cost"]
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn from_reader_fn_returns_error_when_no_header_row() {
        let err = Table::from_reader("only\nthree\nrows\n".as_bytes(), 4).unwrap_err();
        assert!(matches!(err, SourceError::Unreadable(_)), "{err:?}");
    }

    #[test]
    fn from_reader_fn_counts_blank_lines_as_metadata_rows() {
        let data = "Inventory Receive Costing report\n\nDate range: x\nGenerated: y\nVendor,Qty,Cost\nAcme,10,50\n";
        let table = Table::from_reader(data.as_bytes(), REPORT_METADATA_ROWS).unwrap();
        assert_eq!(table.headers(), ["Vendor", "Qty", "Cost"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn from_reader_fn_decodes_invalid_utf8_cells_lossily() {
        let data: &[u8] = b"Vendor,Qty,Cost\nAcme,10,50\nCaf\xe9 Farms,2,20\nBlue Sky,5,25\n";
        let table = Table::from_reader(data, 0).unwrap();
        assert_eq!(table.len(), 3);
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[1].text(Some(0)), Some("Caf\u{fffd} Farms"));
        assert_eq!(rows[2].number(Some(2)), Some(25.0));
    }

    #[test]
    fn from_path_fn_reports_missing_file() {
        let err = Table::from_path("testdata/no_such_file.csv", 0).unwrap_err();
        assert!(matches!(err, SourceError::Missing), "{err:?}");
    }

    #[test]
    fn find_column_fn_prefers_earlier_labels_and_ignores_case() {
        let table = Table::from_reader(REPORT.as_bytes(), REPORT_METADATA_ROWS).unwrap();
        assert_eq!(table.find_column(&["quantity", "qty"]), Some(2));
        assert_eq!(table.find_column(&["vendor name", "product"]), Some(0));
        assert_eq!(table.find_column(&["cost"]), None);
    }

    #[test]
    fn find_column_containing_fn_matches_substrings() {
        let table = Table::from_reader("Vendor ID,Brand (canonical)\n".as_bytes(), 0).unwrap();
        assert_eq!(table.find_column_containing("vendor"), Some(0));
        assert_eq!(table.find_column_containing("BRAND"), Some(1));
        assert_eq!(table.find_column_containing("category"), None);
    }

    #[test]
    fn resolve_fn_names_every_missing_required_field() {
        let table = Table::from_reader(REPORT.as_bytes(), REPORT_METADATA_ROWS).unwrap();
        let fields = [
            Field::required("vendor", &["vendor name"]),
            Field::optional("category", &["category"]),
            Field::required("revenue", &["net sales"]),
            Field::required("units", &["units sold"]),
        ];
        let err = table.resolve(&fields).unwrap_err();
        assert!(
            matches!(&err, SourceError::SchemaMismatch { missing } if missing == &["revenue", "units"]),
            "{err:?}"
        );
    }

    #[test]
    fn resolve_fn_leaves_missing_optional_fields_empty() {
        let table = Table::from_reader(REPORT.as_bytes(), REPORT_METADATA_ROWS).unwrap();
        let fields = [
            Field::required("vendor", &["vendor name"]),
            Field::optional("category", &["category"]),
        ];
        let columns = table.resolve(&fields).unwrap();
        assert_eq!(columns.get(0), Some(0));
        assert_eq!(columns.get(1), None);
    }

    #[test]
    fn row_cells_are_trimmed_and_coerced() {
        let table = Table::from_reader(REPORT.as_bytes(), REPORT_METADATA_ROWS).unwrap();
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[1].text(Some(0)), Some("Blue Sky"));
        assert_eq!(rows[1].number(Some(2)), Some(1000.0));
        assert_eq!(rows[1].number(Some(3)), Some(2500.0));
        assert_eq!(rows[0].number(Some(1)), None);
        assert_eq!(rows[0].text(Some(9)), None);
        assert_eq!(rows[0].text(None), None);
    }

    #[test]
    fn parse_number_fn_accepts_spreadsheet_formats() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_number("$1,250.75"), Some(1250.75));
        assert_eq!(parse_number("-$8"), Some(-8.0));
        assert_eq!(parse_number("(40.00)"), Some(-40.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
    }

    #[test]
    fn parse_number_fn_rejects_text_and_non_finite_values() {
        for cell in ["", "abc", "NaN", "inf", "-inf", "$", "--5", "-(5)", "12 units"] {
            assert_eq!(parse_number(cell), None, "accepted {cell:?}");
        }
    }

    #[test]
    fn parse_number_fn_rejects_values_too_large_to_total() {
        assert_eq!(parse_number("1e308"), None);
        assert_eq!(parse_number("-1e17"), None);
        assert_eq!(parse_number("9e15"), Some(9e15));
        let total: f64 = ["1e308", "1e308", "12"].iter().filter_map(|c| parse_number(c)).sum();
        assert_eq!(total, 12.0);
    }
}
