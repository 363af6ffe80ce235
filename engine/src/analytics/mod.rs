//! Aggregation over an already filtered record collection.
//!
//! Every function here is pure: same input, same [`AggregationResult`].
pub mod breakdowns;
pub mod growth;
pub mod ranking;
pub mod return_index;
pub mod totals;

use shared::models::{AggregationResult, ExecutiveSummary, SalesRecord};

pub const DEFAULT_TOP_N: usize = 10;

pub fn aggregate(records: &[SalesRecord]) -> AggregationResult {
    aggregate_with(records, DEFAULT_TOP_N)
}

/// Full analytics set with ranked tables truncated to `top_n`.
pub fn aggregate_with(records: &[SalesRecord], top_n: usize) -> AggregationResult {
    let totals = totals::compute_totals(records);
    let client_totals = breakdowns::client_totals(records);
    let top_items = breakdowns::top_items(records, top_n);
    let window = growth::growth_window(records);

    let summary = ExecutiveSummary {
        ticket_average: totals::overall_ticket_average(&totals),
        top_client: ranking::top_n(&client_totals, 1).into_iter().next().map(|(client, _)| client),
        top_item: top_items.first().map(|item| item.item_code.clone()),
        growth: growth::overall_growth(records, window.as_ref()),
        growth_window: window,
    };

    let result = AggregationResult {
        client_growth: growth::client_growth(records, window.as_ref()),
        origin_quantities: breakdowns::origin_quantities(records),
        ticket_averages: breakdowns::ticket_averages(records),
        return_index: return_index::return_index_table(records),
        top_clients_by_returns: return_index::top_clients_by_returns(records, top_n),
        top_clients_by_return_index: return_index::top_clients_by_return_index(records, top_n),
        monthly: breakdowns::monthly_totals(records),
        totals,
        class_totals: breakdowns::class_totals(records),
        client_totals,
        top_items,
        summary,
    };

    tracing::debug!(
        records = result.totals.record_count,
        clients = result.client_totals.len(),
        clients_with_growth = result.client_growth.values().filter(|growth| growth.is_defined()).count(),
        months = result.monthly.len(),
        "Aggregated sales records"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sale, sales_return};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use shared::models::{GrowthRate, OperationClass, YearMonth};

    #[test]
    fn test_aggregate_three_row_scenario() {
        let records = vec![
            sale("C1", "2024-01-10", "000001", dec!(10), dec!(100.00)),
            sale("C1", "2024-02-10", "000001", dec!(12), dec!(150.00)),
            sales_return("C1", "2024-02-15", "000001", dec!(2), dec!(20.00)),
        ];
        let result = aggregate(&records);

        assert_eq!(result.totals.gross_sales, dec!(250.00));
        assert_eq!(result.totals.gross_returns, dec!(-20.00));
        assert_eq!(result.totals.net_sales, dec!(230.00));
        assert_eq!(result.totals.net_quantity, dec!(20));
        assert_eq!(result.client_growth["C1"], GrowthRate::Defined(dec!(50)));
        assert_eq!(result.client_growth["C1"].to_string(), "+50.00%");

        let feb = YearMonth::new(2024, 2);
        assert_eq!(result.return_index.by_client_month["C1"][&feb].round_dp(2), dec!(13.33));
        assert_eq!(result.return_index.by_client["C1"], dec!(8));

        assert_eq!(result.summary.growth, GrowthRate::Defined(dec!(50)));
        assert_eq!(result.summary.top_client.as_deref(), Some("C1"));
        assert_eq!(result.summary.top_item.as_deref(), Some("000001"));
        assert_eq!(result.summary.ticket_average, dec!(11.5));
        assert_eq!(result.monthly.len(), 2);
        assert_eq!(result.top_clients_by_returns[0].value, dec!(20));
        assert_eq!(result.class_totals[&OperationClass::Return], dec!(-20));
        assert!(result.client_growth["C1"].is_defined());
    }

    #[test]
    fn test_aggregate_empty_input() {
        let result = aggregate(&[]);
        assert!(result.is_empty());
        assert_eq!(result.totals.net_sales, Decimal::ZERO);
        assert_eq!(result.return_index.overall, Decimal::ZERO);
        assert_eq!(result.summary.growth, GrowthRate::Undefined);
        assert!(result.summary.top_client.is_none());
        assert!(result.summary.growth_window.is_none());
        assert!(result.top_items.is_empty());
    }

    #[test]
    fn test_top_n_truncates_ranked_tables() {
        let records: Vec<SalesRecord> = (1..=5)
            .map(|i| sale(&format!("C{i}"), "2024-01-10", &format!("00000{i}"), Decimal::from(i), dec!(10)))
            .collect();
        let result = aggregate_with(&records, 2);
        assert_eq!(result.top_items.len(), 2);
        assert_eq!(result.top_items[0].item_code, "000005");
        assert_eq!(result.client_totals.len(), 5);
    }

    #[test]
    fn test_tiny_quantity_does_not_overflow_ticket_average() {
        let records = vec![sale("C1", "2024-01-10", "000001", dec!(0.00000000000000000001), dec!(1000000000000000))];
        let result = aggregate(&records);

        assert!(!result.ticket_averages.contains_key("C1"));
        assert_eq!(result.summary.ticket_average, Decimal::ZERO);
        assert_eq!(result.totals.gross_sales, dec!(1000000000000000));
    }

    #[test]
    fn test_sums_saturate_instead_of_overflowing() {
        let records = vec![
            sale("C1", "2024-01-10", "000001", dec!(1), dec!(70000000000000000000000000000)),
            sale("C1", "2024-02-10", "000001", dec!(1), dec!(70000000000000000000000000000)),
            sales_return("C2", "2024-02-11", "000001", dec!(1), dec!(70000000000000000000000000000)),
            sales_return("C2", "2024-02-12", "000001", dec!(1), dec!(70000000000000000000000000000)),
        ];
        let result = aggregate(&records);

        assert_eq!(result.totals.gross_sales, Decimal::MAX);
        assert_eq!(result.totals.gross_returns, Decimal::MIN);
        assert_eq!(result.client_totals["C1"], Decimal::MAX);
        assert_eq!(result.client_growth["C1"], GrowthRate::Defined(Decimal::ZERO));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let records = vec![
            sale("C2", "2024-01-10", "000001", dec!(3), dec!(30)),
            sale("C1", "2024-03-10", "000002", dec!(1), dec!(15)),
            sales_return("C2", "2024-03-11", "000001", dec!(1), dec!(10)),
        ];
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
