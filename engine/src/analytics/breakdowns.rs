// Per-key sums over the filtered records.
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::{ItemQuantity, MonthlyTotal, OperationClass, SalesRecord, YearMonth};

use super::ranking::top_n;

fn sum_by<K, FK, FV>(records: &[SalesRecord], key: FK, value: FV) -> BTreeMap<K, Decimal>
where
    K: Ord,
    FK: Fn(&SalesRecord) -> K,
    FV: Fn(&SalesRecord) -> Decimal,
{
    let mut sums: BTreeMap<K, Decimal> = BTreeMap::new();
    for record in records {
        let sum = sums.entry(key(record)).or_insert(Decimal::ZERO);
        *sum = sum.saturating_add(value(record));
    }
    sums
}

/// Net line total per client.
pub fn client_totals(records: &[SalesRecord]) -> BTreeMap<String, Decimal> {
    sum_by(records, |r| r.client.clone(), |r| r.line_total)
}

/// Net line total per operation class. Unknown operation codes count as sales.
pub fn class_totals(records: &[SalesRecord]) -> BTreeMap<OperationClass, Decimal> {
    sum_by(records, SalesRecord::class, |r| r.line_total)
}

/// Net quantity per source channel.
pub fn origin_quantities(records: &[SalesRecord]) -> BTreeMap<String, Decimal> {
    sum_by(records, |r| r.origin.clone(), |r| r.quantity)
}

/// Net quantity per item code.
pub fn item_quantities(records: &[SalesRecord]) -> BTreeMap<String, Decimal> {
    sum_by(records, |r| r.item_code.clone(), |r| r.quantity)
}

/// Sum of line totals over sum of quantities per client. Clients whose
/// quantities sum to exactly zero, or whose quotient overflows, are left out.
pub fn ticket_averages(records: &[SalesRecord]) -> BTreeMap<String, Decimal> {
    let mut sums: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.client.clone()).or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 = entry.0.saturating_add(record.line_total);
        entry.1 = entry.1.saturating_add(record.quantity);
    }

    sums.into_iter()
        .filter_map(|(client, (total, quantity))| total.checked_div(quantity).map(|average| (client, average)))
        .collect()
}

/// Net sales and quantity per calendar month, oldest first.
pub fn monthly_totals(records: &[SalesRecord]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<YearMonth, (Decimal, Decimal)> = BTreeMap::new();
    for record in records {
        let entry = months.entry(record.month()).or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 = entry.0.saturating_add(record.line_total);
        entry.1 = entry.1.saturating_add(record.quantity);
    }

    months
        .into_iter()
        .map(|(month, (net_sales, net_quantity))| MonthlyTotal { month, net_sales, net_quantity })
        .collect()
}

/// Items with the highest net quantity, named from the joined catalog data.
pub fn top_items(records: &[SalesRecord], n: usize) -> Vec<ItemQuantity> {
    let mut names: BTreeMap<&str, &str> = BTreeMap::new();
    for record in records {
        let name = names.entry(record.item_code.as_str()).or_insert("");
        if name.is_empty() {
            *name = record.item_name.as_str();
        }
    }

    top_n(&item_quantities(records), n)
        .into_iter()
        .map(|(item_code, quantity)| ItemQuantity {
            item_name: names.get(item_code.as_str()).copied().unwrap_or_default().to_string(),
            item_code,
            quantity,
        })
        .collect()
}
