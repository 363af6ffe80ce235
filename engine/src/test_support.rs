// Record fixtures for unit tests.
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{OperationKind, SalesRecord};

pub(crate) fn record(
    operation: OperationKind,
    client: &str,
    date: &str,
    item_code: &str,
    quantity: Decimal,
    line_total: Decimal,
) -> SalesRecord {
    let operation_code = match operation {
        OperationKind::Sale => "VENDA",
        OperationKind::Return => "DEVOLUCAO",
        OperationKind::Unknown => "OUTROS",
    };
    SalesRecord {
        operation_code: operation_code.to_string(),
        operation,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        company: "01".to_string(),
        client: client.to_string(),
        origin: "WEB".to_string(),
        usage: "USO1".to_string(),
        item_code: item_code.to_string(),
        quantity,
        line_total,
        doc_number: None,
        item_name: String::new(),
        category: String::new(),
    }
}

pub(crate) fn sale(client: &str, date: &str, item_code: &str, quantity: Decimal, line_total: Decimal) -> SalesRecord {
    record(OperationKind::Sale, client, date, item_code, quantity, line_total)
}

/// A sign-corrected return: pass positive magnitudes.
pub(crate) fn sales_return(client: &str, date: &str, item_code: &str, quantity: Decimal, line_total: Decimal) -> SalesRecord {
    record(OperationKind::Return, client, date, item_code, -quantity, -line_total)
}
