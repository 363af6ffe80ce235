// Returned value relative to gross sales, per grouping.
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::{RankedEntry, ReturnIndexTable, SalesRecord, YearMonth};

use super::ranking::ranked_entries;

#[derive(Debug, Clone, Copy, Default)]
struct Split {
    gross: Decimal,
    returned: Decimal,
}

impl Split {
    fn add(&mut self, line_total: Decimal) {
        if line_total > Decimal::ZERO {
            self.gross = self.gross.saturating_add(line_total);
        } else {
            self.returned = self.returned.saturating_sub(line_total);
        }
    }

    fn index(&self) -> Decimal {
        index(self.returned, self.gross)
    }
}

/// `abs_returns / gross * 100`; zero when there are no gross sales or the
/// ratio does not fit a `Decimal`.
pub fn index(abs_returns: Decimal, gross: Decimal) -> Decimal {
    abs_returns
        .checked_div(gross)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

fn split_by<K, F>(records: &[SalesRecord], key: F) -> BTreeMap<K, Split>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
{
    let mut splits: BTreeMap<K, Split> = BTreeMap::new();
    for record in records {
        splits.entry(key(record)).or_default().add(record.line_total);
    }
    splits
}

fn indexes<K: Ord>(splits: BTreeMap<K, Split>) -> BTreeMap<K, Decimal> {
    splits.into_iter().map(|(key, split)| (key, split.index())).collect()
}

pub fn return_index_table(records: &[SalesRecord]) -> ReturnIndexTable {
    let mut overall = Split::default();
    for record in records {
        overall.add(record.line_total);
    }

    let mut by_client_month: BTreeMap<String, BTreeMap<YearMonth, Decimal>> = BTreeMap::new();
    for ((client, month), split) in split_by(records, |r| (r.client.clone(), r.month())) {
        by_client_month.entry(client).or_default().insert(month, split.index());
    }

    ReturnIndexTable {
        overall: overall.index(),
        by_client: indexes(split_by(records, |r| r.client.clone())),
        by_item: indexes(split_by(records, |r| r.item_code.clone())),
        by_month: indexes(split_by(records, SalesRecord::month)),
        by_client_month,
    }
}

/// Clients ranked by absolute returned value; clients without returns are left out.
pub fn top_clients_by_returns(records: &[SalesRecord], n: usize) -> Vec<RankedEntry> {
    let returned: BTreeMap<String, Decimal> = split_by(records, |r| r.client.clone())
        .into_iter()
        .filter(|(_, split)| split.returned > Decimal::ZERO)
        .map(|(client, split)| (client, split.returned))
        .collect();
    ranked_entries(&returned, n)
}

/// Clients ranked by return index, among those with gross sales.
pub fn top_clients_by_return_index(records: &[SalesRecord], n: usize) -> Vec<RankedEntry> {
    let ratios: BTreeMap<String, Decimal> = split_by(records, |r| r.client.clone())
        .into_iter()
        .filter(|(_, split)| split.gross > Decimal::ZERO)
        .map(|(client, split)| (client, split.index()))
        .collect();
    ranked_entries(&ratios, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sale, sales_return};
    use rust_decimal_macros::dec;

    fn scenario() -> Vec<SalesRecord> {
        vec![
            sale("C1", "2024-01-10", "000001", dec!(10), dec!(100)),
            sale("C1", "2024-02-10", "000001", dec!(12), dec!(150)),
            sales_return("C1", "2024-02-15", "000001", dec!(2), dec!(20)),
        ]
    }

    #[test]
    fn test_index_is_zero_without_gross_sales() {
        assert_eq!(index(dec!(20), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(index(dec!(25), dec!(100)), dec!(25));
        assert_eq!(index(dec!(70000000000000000000000000000), dec!(0.0000000000000000000000000001)), Decimal::ZERO);
    }

    #[test]
    fn test_index_table_groupings() {
        let table = return_index_table(&scenario());
        let feb = YearMonth::new(2024, 2);

        assert_eq!(table.overall, dec!(8));
        assert_eq!(table.by_client["C1"], dec!(8));
        assert_eq!(table.by_item["000001"], dec!(8));
        assert_eq!(table.by_month[&YearMonth::new(2024, 1)], Decimal::ZERO);
        assert_eq!(table.by_month[&feb].round_dp(2), dec!(13.33));
        assert_eq!(table.by_client_month["C1"][&feb].round_dp(2), dec!(13.33));
    }

    #[test]
    fn test_client_with_only_returns_reports_zero() {
        let records = vec![
            sale("C1", "2024-01-10", "000001", dec!(1), dec!(100)),
            sales_return("C2", "2024-01-12", "000001", dec!(1), dec!(30)),
        ];
        let table = return_index_table(&records);
        assert_eq!(table.by_client["C2"], Decimal::ZERO);
        assert_eq!(table.overall, dec!(30));
    }

    #[test]
    fn test_top_clients_by_returns_skips_clients_without_returns() {
        let records = vec![
            sale("C1", "2024-01-10", "000001", dec!(1), dec!(100)),
            sales_return("C2", "2024-01-12", "000001", dec!(1), dec!(30)),
            sales_return("C3", "2024-01-12", "000001", dec!(1), dec!(30)),
            sales_return("C4", "2024-01-12", "000001", dec!(1), dec!(45)),
        ];
        let ranked = top_clients_by_returns(&records, 10);
        let keys: Vec<&str> = ranked.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["C4", "C2", "C3"]);
        assert_eq!(ranked[0].value, dec!(45));
    }

    #[test]
    fn test_top_clients_by_return_index_requires_gross_sales() {
        let records = vec![
            sale("C1", "2024-01-10", "000001", dec!(1), dec!(100)),
            sales_return("C1", "2024-01-11", "000001", dec!(1), dec!(10)),
            sale("C2", "2024-01-10", "000001", dec!(1), dec!(50)),
            sales_return("C2", "2024-01-11", "000001", dec!(1), dec!(25)),
            sales_return("C3", "2024-01-12", "000001", dec!(1), dec!(30)),
        ];
        let ranked = top_clients_by_return_index(&records, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, "C2");
        assert_eq!(ranked[0].value, dec!(50));
    }
}
