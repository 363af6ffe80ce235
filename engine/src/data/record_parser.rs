// Raw export rows -> typed sales records.
use rust_decimal::Decimal;
use shared::models::{OperationKind, SalesRecord};

use super::brazilian_format::{parse_date, parse_number};
use super::raw_table::RawTable;
use crate::config::settings::EngineSettings;
use crate::error::EngineError;

pub const SALES_TABLE: &str = "sales";

pub const COL_OPERATION: &str = "Operacao";
pub const COL_DATE: &str = "Data";
pub const COL_COMPANY: &str = "CodEmpresa";
pub const COL_CLIENT: &str = "CardCode";
pub const COL_ORIGIN: &str = "Origem";
pub const COL_USAGE: &str = "Utilizacao";
pub const COL_ITEM: &str = "ItemCode";
pub const COL_QUANTITY: &str = "Quantidade";
pub const COL_LINE_TOTAL: &str = "TotalLinha";
pub const COL_DOC_NUMBER: &str = "DocNum";

pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_OPERATION,
    COL_DATE,
    COL_COMPANY,
    COL_CLIENT,
    COL_ORIGIN,
    COL_USAGE,
    COL_ITEM,
    COL_QUANTITY,
    COL_LINE_TOTAL,
];

// Largest accepted quantity or line total magnitude. Keeps running sums well
// inside the `Decimal` range.
const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Parses a quantity or line total cell, rejecting magnitudes above 10^15.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    parse_number(raw).filter(|value| value.abs() <= Decimal::from(MAX_AMOUNT))
}

/// Trims and left-pads an item code with zeros. Codes already at or over
/// `width` are returned trimmed but otherwise untouched.
pub fn normalize_item_code(raw: &str, width: usize) -> String {
    format!("{:0>width$}", raw.trim(), width = width)
}

pub fn normalize_operation_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Operation codes that mark sales and returns in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationMarkers {
    sale: String,
    returns: String,
}

impl OperationMarkers {
    pub fn new(sale: &str, returns: &str) -> Self {
        OperationMarkers { sale: normalize_operation_code(sale), returns: normalize_operation_code(returns) }
    }

    pub fn classify(&self, code: &str) -> OperationKind {
        let code = normalize_operation_code(code);
        if code == self.returns {
            OperationKind::Return
        } else if code == self.sale {
            OperationKind::Sale
        } else {
            OperationKind::Unknown
        }
    }
}

impl Default for OperationMarkers {
    fn default() -> Self {
        let defaults = EngineSettings::default();
        OperationMarkers::new(&defaults.sale_marker, &defaults.return_marker)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub records: Vec<SalesRecord>,
    /// Rows dropped for an unparseable date, quantity or line total, or an
    /// amount outside the accepted range.
    pub dropped: usize,
}

#[derive(Debug)]
enum DropReason<'a> {
    Date(&'a str),
    Quantity(&'a str),
    LineTotal(&'a str),
}

struct ColumnMap {
    operation: usize,
    date: usize,
    company: usize,
    client: usize,
    origin: usize,
    usage: usize,
    item: usize,
    quantity: usize,
    line_total: usize,
    doc_number: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self, EngineError> {
        let require = |name: &str| table.require_column(SALES_TABLE, name);
        Ok(ColumnMap {
            operation: require(COL_OPERATION)?,
            date: require(COL_DATE)?,
            company: require(COL_COMPANY)?,
            client: require(COL_CLIENT)?,
            origin: require(COL_ORIGIN)?,
            usage: require(COL_USAGE)?,
            item: require(COL_ITEM)?,
            quantity: require(COL_QUANTITY)?,
            line_total: require(COL_LINE_TOTAL)?,
            doc_number: table.column_index(COL_DOC_NUMBER),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordParser {
    markers: OperationMarkers,
    item_code_width: usize,
}

impl RecordParser {
    pub fn new(markers: OperationMarkers, item_code_width: usize) -> Self {
        RecordParser { markers, item_code_width }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        RecordParser::new(
            OperationMarkers::new(&settings.sale_marker, &settings.return_marker),
            settings.item_code_width,
        )
    }

    /// Parses every row of `table`. A missing required column fails the whole
    /// batch; rows with an unparseable date, quantity or line total, or an
    /// amount above 10^15, are dropped and counted.
    pub fn parse(&self, table: &RawTable) -> Result<ParseOutcome, EngineError> {
        let columns = ColumnMap::resolve(table)?;
        let mut outcome = ParseOutcome { records: Vec::with_capacity(table.len()), dropped: 0 };

        for (idx, row) in table.rows().iter().enumerate() {
            match self.parse_row(row, &columns) {
                Ok(record) => outcome.records.push(record),
                Err(reason) => {
                    // Header is line 1 in the source export.
                    tracing::debug!(line = idx + 2, ?reason, "Dropping unparseable sales row");
                    outcome.dropped += 1;
                }
            }
        }

        tracing::info!(
            parsed = outcome.records.len(),
            dropped = outcome.dropped,
            "Parsed sales rows"
        );
        Ok(outcome)
    }

    fn parse_row<'a>(&self, row: &'a [String], columns: &ColumnMap) -> Result<SalesRecord, DropReason<'a>> {
        let cell = |index: usize| RawTable::cell(row, index);

        let raw_date = cell(columns.date);
        let date = parse_date(raw_date).ok_or(DropReason::Date(raw_date))?;
        let raw_quantity = cell(columns.quantity);
        let quantity: Decimal = parse_amount(raw_quantity).ok_or(DropReason::Quantity(raw_quantity))?;
        let raw_total = cell(columns.line_total);
        let line_total: Decimal = parse_amount(raw_total).ok_or(DropReason::LineTotal(raw_total))?;

        let operation_code = normalize_operation_code(cell(columns.operation));
        let operation = self.markers.classify(&operation_code);
        let doc_number = columns
            .doc_number
            .map(|index| cell(index).trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(SalesRecord {
            operation_code,
            operation,
            date,
            company: cell(columns.company).trim().to_string(),
            client: cell(columns.client).trim().to_string(),
            origin: cell(columns.origin).trim().to_string(),
            usage: cell(columns.usage).trim().to_string(),
            item_code: normalize_item_code(cell(columns.item), self.item_code_width),
            quantity,
            line_total,
            doc_number,
            item_name: String::new(),
            category: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const HEADER: [&str; 10] = [
        "Operacao", "Data", "CodEmpresa", "DocNum", "CardCode", "Origem", "Utilizacao", "ItemCode", "TotalLinha", "Quantidade",
    ];

    fn table(rows: &[[&str; 10]]) -> RawTable {
        RawTable::new(
            HEADER.iter().map(|h| h.to_string()).collect(),
            rows.iter().map(|row| row.iter().map(|c| c.to_string()).collect()).collect(),
        )
    }

    fn parser() -> RecordParser {
        RecordParser::new(OperationMarkers::default(), 6)
    }

    #[test]
    fn test_parse_valid_row() {
        let t = table(&[[" venda ", "15/01/2024", "01", "9001", " C1 ", "WEB", "USO1", "123", "R$ 1.234,56", "10"]]);
        let outcome = parser().parse(&t).unwrap();

        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.operation_code, "VENDA");
        assert_eq!(record.operation, OperationKind::Sale);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(record.client, "C1");
        assert_eq!(record.item_code, "000123");
        assert_eq!(record.line_total, dec!(1234.56));
        assert_eq!(record.quantity, dec!(10));
        assert_eq!(record.doc_number.as_deref(), Some("9001"));
        assert_eq!(record.item_name, "");
    }

    #[test]
    fn test_unparseable_rows_are_dropped_and_counted() {
        let t = table(&[
            ["VENDA", "not a date", "01", "", "C1", "WEB", "U", "1", "10,00", "1"],
            ["VENDA", "2024-01-15", "01", "", "C1", "WEB", "U", "1", "-", "1"],
            ["VENDA", "2024-01-15", "01", "", "C1", "WEB", "U", "1", "10,00", ""],
            ["VENDA", "2024-01-15", "01", "", "C1", "WEB", "U", "1", "10,00", "2"],
        ]);
        let outcome = parser().parse(&t).unwrap();
        assert_eq!(outcome.dropped, 3);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].doc_number, None);
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let t = RawTable::new(
            vec!["Operacao".into(), "Data".into(), "CardCode".into()],
            vec![vec!["VENDA".into(), "2024-01-15".into(), "C1".into()]],
        );
        let err = parser().parse(&t).unwrap_err();
        assert!(matches!(err, EngineError::MissingColumn { ref column, .. } if column == COL_COMPANY));
    }

    #[test]
    fn test_headers_are_case_insensitive_and_optional_docnum() {
        let headers: Vec<String> = REQUIRED_COLUMNS.iter().map(|h| format!("  {}  ", h.to_uppercase())).collect();
        let row: Vec<String> = vec!["DEVOLUCAO", "2024-02-10", "01", "C1", "LOJA", "U", "77", "2", "20,00"]
            .into_iter()
            .map(String::from)
            .collect();
        let outcome = parser().parse(&RawTable::new(headers, vec![row])).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].operation, OperationKind::Return);
        assert_eq!(outcome.records[0].doc_number, None);
    }

    #[test]
    fn test_unknown_operation_keeps_raw_code() {
        let t = table(&[["bonificacao", "2024-01-15", "01", "", "C1", "WEB", "U", "1", "0", "1"]]);
        let outcome = parser().parse(&t).unwrap();
        assert_eq!(outcome.records[0].operation, OperationKind::Unknown);
        assert_eq!(outcome.records[0].operation_code, "BONIFICACAO");
    }

    #[test]
    fn test_empty_table_with_headers_parses_to_nothing() {
        let outcome = parser().parse(&table(&[])).unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.dropped, 0);
    }

    #[test]
    fn test_amounts_beyond_range_are_dropped() {
        let t = table(&[
            ["VENDA", "2024-01-15", "01", "", "C1", "WEB", "U", "1", "70000000000000000000000000000", "1"],
            ["VENDA", "2024-01-15", "01", "", "C1", "WEB", "U", "1", "10,00", "2.000.000.000.000.000,00"],
            ["VENDA", "2024-01-15", "01", "", "C1", "WEB", "U", "1", "1.000.000.000.000.000,00", "1"],
        ]);
        let outcome = parser().parse(&t).unwrap();
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.records[0].line_total, dec!(1000000000000000));
        assert_eq!(parse_amount("0,00000000000000000001"), Some(dec!(0.00000000000000000001)));
    }

    #[test]
    fn test_normalize_item_code() {
        assert_eq!(normalize_item_code(" 42 ", 6), "000042");
        assert_eq!(normalize_item_code("000042", 6), "000042");
        assert_eq!(normalize_item_code("1234567", 6), "1234567");
        assert_eq!(normalize_item_code("AB1", 5), "00AB1");
    }

    #[test]
    fn test_markers_compare_trimmed_and_case_insensitive() {
        let markers = OperationMarkers::new("Venda", " Dev ");
        assert_eq!(markers.classify("dev"), OperationKind::Return);
        assert_eq!(markers.classify(" VENDA"), OperationKind::Sale);
        assert_eq!(markers.classify("DEVOLUCAO"), OperationKind::Unknown);
    }
}
