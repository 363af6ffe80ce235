// Parse -> sign correction -> catalog join, cached per source fingerprint,
// then filtering and aggregation on request.
use std::sync::Arc;

use shared::models::{AggregationResult, SalesRecord};

use crate::analytics;
use crate::config::settings::EngineSettings;
use crate::data::filter::{self, FilterOptions, FilterSpec};
use crate::data::raw_table::RawTable;
use crate::data::record_parser::RecordParser;
use crate::data::snapshot_cache::{Fingerprint, Snapshot, SnapshotCache};
use crate::error::EngineError;
use crate::transforms::catalog_joiner::{join_catalog, Catalog};
use crate::transforms::sign_corrector::correct_signs;

pub struct SalesPipeline {
    settings: EngineSettings,
    parser: RecordParser,
    catalog: Catalog,
    cache: SnapshotCache,
}

impl SalesPipeline {
    pub fn new(settings: EngineSettings, catalog: Catalog) -> Self {
        SalesPipeline {
            parser: RecordParser::from_settings(&settings),
            settings,
            catalog,
            cache: SnapshotCache::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the snapshot for `fingerprint`, calling `fetch` for the raw
    /// table only when the cached one belongs to another source version.
    pub fn load<F>(&self, fingerprint: &Fingerprint, fetch: F) -> Result<Arc<Snapshot>, EngineError>
    where
        F: FnOnce() -> Result<RawTable, EngineError>,
    {
        self.cache.get_or_compute(fingerprint, || {
            let table = fetch()?;
            self.build_snapshot(&table)
        })
    }

    pub fn build_snapshot(&self, table: &RawTable) -> Result<Snapshot, EngineError> {
        let parsed = self.parser.parse(table)?;
        let corrected = correct_signs(parsed.records);
        let joined = join_catalog(corrected, &self.catalog);

        tracing::info!(
            records = joined.records.len(),
            dropped_rows = parsed.dropped,
            unmatched_items = joined.unmatched_items,
            "Built sales snapshot"
        );
        Ok(Snapshot { records: joined.records, dropped_rows: parsed.dropped, unmatched_items: joined.unmatched_items })
    }

    /// Item codes in `spec` are padded to the configured width before matching.
    pub fn filter(&self, records: &[SalesRecord], spec: &FilterSpec) -> Vec<SalesRecord> {
        let spec = spec.clone().with_item_width(self.settings.item_code_width);
        filter::filter(records, &spec)
    }

    pub fn aggregate(&self, records: &[SalesRecord]) -> AggregationResult {
        analytics::aggregate_with(records, self.settings.top_n)
    }

    pub fn filter_options(&self, records: &[SalesRecord]) -> FilterOptions {
        filter::filter_options(records)
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub fn current_fingerprint(&self) -> Option<Fingerprint> {
        self.cache.current_fingerprint()
    }
}
