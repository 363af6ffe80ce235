// Left join of sales records against the product catalog.
use std::collections::{BTreeSet, HashMap};

use shared::models::{CatalogEntry, SalesRecord};

use crate::data::raw_table::RawTable;
use crate::data::record_parser::normalize_item_code;
use crate::error::EngineError;

pub const CATALOG_TABLE: &str = "catalog";

pub const COL_CATALOG_ITEM: &str = "ItemCode";
pub const COL_CATALOG_NAME: &str = "ItemName";
pub const COL_CATALOG_CATEGORY: &str = "Categoria";

/// Product metadata keyed by padded item code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
    width: usize,
}

impl Catalog {
    /// Duplicate codes keep the first entry seen.
    pub fn from_entries<I>(entries: I, width: usize) -> Self
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut map: HashMap<String, CatalogEntry> = HashMap::new();
        for mut entry in entries {
            entry.item_code = normalize_item_code(&entry.item_code, width);
            if map.contains_key(&entry.item_code) {
                tracing::debug!(item_code = %entry.item_code, "Ignoring duplicate catalog entry");
                continue;
            }
            map.insert(entry.item_code.clone(), entry);
        }
        Catalog { entries: map, width }
    }

    pub fn from_table(table: &RawTable, width: usize) -> Result<Self, EngineError> {
        let code = table.require_column(CATALOG_TABLE, COL_CATALOG_ITEM)?;
        let name = table.require_column(CATALOG_TABLE, COL_CATALOG_NAME)?;
        let category = table.require_column(CATALOG_TABLE, COL_CATALOG_CATEGORY)?;

        let entries = table
            .rows()
            .iter()
            .filter(|row| !RawTable::cell(row, code).trim().is_empty())
            .map(|row| CatalogEntry {
                item_code: RawTable::cell(row, code).to_string(),
                name: RawTable::cell(row, name).trim().to_string(),
                category: RawTable::cell(row, category).trim().to_string(),
            });

        let catalog = Self::from_entries(entries, width);
        tracing::info!(entries = catalog.len(), "Loaded product catalog");
        Ok(catalog)
    }

    pub fn get(&self, item_code: &str) -> Option<&CatalogEntry> {
        self.entries.get(&normalize_item_code(item_code, self.width))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinOutcome {
    pub records: Vec<SalesRecord>,
    /// Distinct item codes with no catalog entry.
    pub unmatched_items: usize,
}

/// Fills item name and category from the catalog. Unmatched records keep
/// empty placeholders and stay in the output.
pub fn join_catalog(records: Vec<SalesRecord>, catalog: &Catalog) -> JoinOutcome {
    let mut unmatched: BTreeSet<String> = BTreeSet::new();

    let records: Vec<SalesRecord> = records
        .into_iter()
        .map(|mut record| {
            match catalog.get(&record.item_code) {
                Some(entry) => {
                    record.item_name = entry.name.clone();
                    record.category = entry.category.clone();
                }
                None => {
                    unmatched.insert(record.item_code.clone());
                }
            }
            record
        })
        .collect();

    if !unmatched.is_empty() && !catalog.is_empty() {
        tracing::warn!(
            unmatched = unmatched.len(),
            sample = ?unmatched.iter().take(5).collect::<Vec<_>>(),
            "Item codes without catalog entry"
        );
    }

    JoinOutcome { records, unmatched_items: unmatched.len() }
}
