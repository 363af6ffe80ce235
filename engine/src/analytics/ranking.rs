// Top-N selection shared by the ranked breakdowns.
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::RankedEntry;

/// Sorts descending by value and keeps the first `n`. Equal values keep the
/// ascending key order of the input map.
pub fn top_n<K>(values: &BTreeMap<K, Decimal>, n: usize) -> Vec<(K, Decimal)>
where
    K: Ord + Clone,
{
    let mut entries: Vec<(K, Decimal)> = values.iter().map(|(key, value)| (key.clone(), *value)).collect();
    // sort_by is stable, so ties stay in key order
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

pub fn ranked_entries(values: &BTreeMap<String, Decimal>, n: usize) -> Vec<RankedEntry> {
    top_n(values, n)
        .into_iter()
        .map(|(key, value)| RankedEntry { key, value })
        .collect()
}
