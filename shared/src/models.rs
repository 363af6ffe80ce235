use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// Operation kind as classified from the exported operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Sale,
    Return,
    /// Any code that is neither the sale nor the return marker. The raw code
    /// stays on the record as `operation_code`.
    Unknown,
}

impl OperationKind {
    pub fn class(self) -> OperationClass {
        match self {
            OperationKind::Return => OperationClass::Return,
            OperationKind::Sale | OperationKind::Unknown => OperationClass::Sale,
        }
    }
}

/// Two-valued grouping class used by the breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationClass {
    Sale,
    Return,
}

/// One invoice or return line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Trimmed, uppercased operation code as exported.
    pub operation_code: String,
    pub operation: OperationKind,
    pub date: NaiveDate,
    pub company: String,
    pub client: String,
    pub origin: String,
    pub usage: String,
    /// Zero-padded item code.
    pub item_code: String,
    pub quantity: Decimal,
    pub line_total: Decimal,
    pub doc_number: Option<String>,
    /// Empty until joined with a matching catalog entry.
    pub item_name: String,
    pub category: String,
}

impl SalesRecord {
    pub fn class(&self) -> OperationClass {
        self.operation.class()
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item_code: String,
    pub name: String,
    pub category: String,
}

/// Calendar month key. Orders chronologically and renders as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Month-over-month growth percentage, or the undefined sentinel when there
/// is no comparable previous month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthRate {
    Defined(Decimal),
    Undefined,
}

impl GrowthRate {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            GrowthRate::Defined(value) => Some(*value),
            GrowthRate::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, GrowthRate::Defined(_))
    }
}

impl fmt::Display for GrowthRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthRate::Defined(value) => write!(f, "{:+.2}%", value.round_dp(2)),
            GrowthRate::Undefined => f.write_str("—"),
        }
    }
}

impl Serialize for GrowthRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesTotals {
    pub gross_sales: Decimal,
    /// Sum of negative line totals, reported as a negative magnitude.
    pub gross_returns: Decimal,
    pub net_sales: Decimal,
    pub gross_quantity: Decimal,
    pub returned_quantity: Decimal,
    pub net_quantity: Decimal,
    pub record_count: usize,
}

impl SalesTotals {
    pub fn absolute_returns(&self) -> Decimal {
        -self.gross_returns
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemQuantity {
    pub item_code: String,
    pub item_name: String,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub net_sales: Decimal,
    pub net_quantity: Decimal,
}

/// Absolute returns over gross sales, as a percentage, per grouping.
/// `by_client` spans the whole filtered period; see `by_client_month` for a
/// client's figure within a single month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnIndexTable {
    pub overall: Decimal,
    pub by_client: BTreeMap<String, Decimal>,
    pub by_item: BTreeMap<String, Decimal>,
    pub by_month: BTreeMap<YearMonth, Decimal>,
    pub by_client_month: BTreeMap<String, BTreeMap<YearMonth, Decimal>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthWindow {
    pub previous: YearMonth,
    pub current: YearMonth,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub ticket_average: Decimal,
    pub top_client: Option<String>,
    pub top_item: Option<String>,
    pub growth: GrowthRate,
    pub growth_window: Option<GrowthWindow>,
}

/// Read-only analytics snapshot over one filtered record collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub totals: SalesTotals,
    pub client_totals: BTreeMap<String, Decimal>,
    /// Net line total per operation class.
    pub class_totals: BTreeMap<OperationClass, Decimal>,
    pub top_items: Vec<ItemQuantity>,
    pub origin_quantities: BTreeMap<String, Decimal>,
    pub ticket_averages: BTreeMap<String, Decimal>,
    pub client_growth: BTreeMap<String, GrowthRate>,
    pub return_index: ReturnIndexTable,
    pub top_clients_by_returns: Vec<RankedEntry>,
    pub top_clients_by_return_index: Vec<RankedEntry>,
    pub monthly: Vec<MonthlyTotal>,
    pub summary: ExecutiveSummary,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.totals.record_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_year_month_orders_chronologically() {
        let mut months = vec![YearMonth::new(2024, 2), YearMonth::new(2023, 12), YearMonth::new(2024, 1)];
        months.sort();
        assert_eq!(months, vec![YearMonth::new(2023, 12), YearMonth::new(2024, 1), YearMonth::new(2024, 2)]);
        assert_eq!(YearMonth::new(2024, 1).to_string(), "2024-01");
    }

    #[test]
    fn test_year_month_serializes_as_map_key() {
        let mut by_month = BTreeMap::new();
        by_month.insert(YearMonth::new(2024, 3), dec!(1.5));
        let json = serde_json::to_string(&by_month).unwrap();
        assert_eq!(json, r#"{"2024-03":"1.5"}"#);
    }

    #[test]
    fn test_undefined_growth_renders_as_dash_and_null() {
        assert_eq!(GrowthRate::Undefined.to_string(), "—");
        assert_eq!(serde_json::to_string(&GrowthRate::Undefined).unwrap(), "null");
        assert_eq!(GrowthRate::Defined(dec!(50)).to_string(), "+50.00%");
        assert_eq!(GrowthRate::Defined(dec!(-12.5)).to_string(), "-12.50%");
    }

    #[test]
    fn test_unknown_operations_group_with_sales() {
        assert_eq!(OperationKind::Unknown.class(), OperationClass::Sale);
        assert_eq!(OperationKind::Return.class(), OperationClass::Return);
        let json = serde_json::to_string(&BTreeMap::from([(OperationClass::Return, dec!(-2))])).unwrap();
        assert_eq!(json, r#"{"Return":"-2"}"#);
    }
}
