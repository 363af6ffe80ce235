// Month-over-month growth between the two most recent months in the set.
// Month totals are gross sales: return lines mark presence but add nothing.
use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use shared::models::{GrowthRate, GrowthWindow, SalesRecord, YearMonth};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The two most recent distinct months, if there are at least two.
pub fn growth_window(records: &[SalesRecord]) -> Option<GrowthWindow> {
    let months: BTreeSet<YearMonth> = records.iter().map(SalesRecord::month).collect();
    let mut recent = months.into_iter().rev();
    let current = recent.next()?;
    let previous = recent.next()?;
    Some(GrowthWindow { previous, current })
}

/// `(current - previous) / previous * 100`, undefined when previous is zero
/// or the result does not fit a `Decimal`.
pub fn growth_rate(previous: Decimal, current: Decimal) -> GrowthRate {
    current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .map_or(GrowthRate::Undefined, GrowthRate::Defined)
}

#[derive(Default)]
struct WindowSums {
    previous: Option<Decimal>,
    current: Option<Decimal>,
}

impl WindowSums {
    fn add(&mut self, window: &GrowthWindow, record: &SalesRecord) {
        let month = record.month();
        let slot = if month == window.current {
            &mut self.current
        } else if month == window.previous {
            &mut self.previous
        } else {
            return;
        };
        let total = slot.get_or_insert(Decimal::ZERO);
        if record.line_total > Decimal::ZERO {
            *total = total.saturating_add(record.line_total);
        }
    }

    // A side with no rows at all is not comparable.
    fn rate(&self) -> GrowthRate {
        match (self.previous, self.current) {
            (Some(previous), Some(current)) => growth_rate(previous, current),
            _ => GrowthRate::Undefined,
        }
    }
}

/// Growth over gross sales of the whole filtered set.
pub fn overall_growth(records: &[SalesRecord], window: Option<&GrowthWindow>) -> GrowthRate {
    let Some(window) = window else {
        return GrowthRate::Undefined;
    };
    let mut sums = WindowSums::default();
    for record in records {
        sums.add(window, record);
    }
    sums.rate()
}

/// Growth per client. Every client in the set gets an entry; clients without
/// rows in both window months are undefined.
pub fn client_growth(records: &[SalesRecord], window: Option<&GrowthWindow>) -> BTreeMap<String, GrowthRate> {
    let mut sums: BTreeMap<&str, WindowSums> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.client.as_str()).or_default();
        if let Some(window) = window {
            entry.add(window, record);
        }
    }

    sums.into_iter()
        .map(|(client, sums)| (client.to_string(), sums.rate()))
        .collect()
}
