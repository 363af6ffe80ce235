use rust_decimal::Decimal;
use shared::models::{SalesRecord, SalesTotals};

/// Gross figures split by sign of each line; net figures sum everything.
/// Sums saturate at the `Decimal` bounds instead of overflowing.
pub fn compute_totals(records: &[SalesRecord]) -> SalesTotals {
    let mut totals = SalesTotals { record_count: records.len(), ..SalesTotals::default() };

    for record in records {
        if record.line_total > Decimal::ZERO {
            totals.gross_sales = totals.gross_sales.saturating_add(record.line_total);
        } else if record.line_total < Decimal::ZERO {
            totals.gross_returns = totals.gross_returns.saturating_add(record.line_total);
        }
        if record.quantity > Decimal::ZERO {
            totals.gross_quantity = totals.gross_quantity.saturating_add(record.quantity);
        } else if record.quantity < Decimal::ZERO {
            totals.returned_quantity = totals.returned_quantity.saturating_add(record.quantity);
        }
        totals.net_sales = totals.net_sales.saturating_add(record.line_total);
        totals.net_quantity = totals.net_quantity.saturating_add(record.quantity);
    }

    totals
}

/// Net value per unit. Zero when the net quantity is not positive or the
/// quotient does not fit a `Decimal`.
pub fn overall_ticket_average(totals: &SalesTotals) -> Decimal {
    if totals.net_quantity <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    totals.net_sales.checked_div(totals.net_quantity).unwrap_or(Decimal::ZERO)
}
