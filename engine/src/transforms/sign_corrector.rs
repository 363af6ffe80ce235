// Returns are exported with either sign; downstream sums expect them negative.
use rust_decimal::Decimal;
use shared::models::{OperationKind, SalesRecord};

/// Forces quantity and line total of every Return record to their negative
/// absolute value. Other records pass through unchanged.
pub fn correct_signs(records: Vec<SalesRecord>) -> Vec<SalesRecord> {
    let mut flipped = 0usize;
    let corrected: Vec<SalesRecord> = records
        .into_iter()
        .map(|mut record| {
            if correct_record(&mut record) {
                flipped += 1;
            }
            record
        })
        .collect();

    tracing::debug!(records = corrected.len(), flipped, "Applied return sign correction");
    corrected
}

/// Corrects one record in place; returns whether any value changed.
pub fn correct_record(record: &mut SalesRecord) -> bool {
    if record.operation != OperationKind::Return {
        return false;
    }
    let quantity = negative_magnitude(record.quantity);
    let line_total = negative_magnitude(record.line_total);
    let changed = quantity != record.quantity || line_total != record.line_total;
    record.quantity = quantity;
    record.line_total = line_total;
    changed
}

fn negative_magnitude(value: Decimal) -> Decimal {
    if value.is_zero() {
        Decimal::ZERO
    } else {
        -value.abs()
    }
}
