// Multi-dimensional record filtering.
use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use shared::models::SalesRecord;

use super::brazilian_format::{parse_date, parse_number};
use super::record_parser::{
    normalize_item_code, normalize_operation_code, COL_CLIENT, COL_COMPANY, COL_DATE, COL_DOC_NUMBER, COL_ITEM,
    COL_LINE_TOTAL, COL_OPERATION, COL_ORIGIN, COL_QUANTITY, COL_USAGE,
};
use crate::error::EngineError;

/// Optional predicates, AND-ed across dimensions and OR-ed within a set.
/// An empty set or absent bound places no restriction on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub clients: BTreeSet<String>,
    pub operations: BTreeSet<String>,
    pub items: BTreeSet<String>,
    pub companies: BTreeSet<String>,
    /// Inclusive.
    pub start: Option<NaiveDate>,
    /// Inclusive.
    pub end: Option<NaiveDate>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients<I, S>(mut self, clients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clients.extend(clients.into_iter().map(|c| c.as_ref().trim().to_string()));
        self
    }

    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.operations.extend(operations.into_iter().map(|op| normalize_operation_code(op.as_ref())));
        self
    }

    /// Item codes are matched after the pipeline pads them, see [`FilterSpec::with_item_width`].
    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.items.extend(items.into_iter().map(|item| item.as_ref().trim().to_string()));
        self
    }

    pub fn with_companies<I, S>(mut self, companies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.companies.extend(companies.into_iter().map(|c| c.as_ref().trim().to_string()));
        self
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn since(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Pads item codes with the same convention the parser applies to records.
    pub fn with_item_width(mut self, width: usize) -> Self {
        self.items = self.items.iter().map(|item| normalize_item_code(item, width)).collect();
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.clients.is_empty()
            && self.operations.is_empty()
            && self.items.is_empty()
            && self.companies.is_empty()
            && self.start.is_none()
            && self.end.is_none()
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        set_allows(&self.clients, &record.client)
            && set_allows(&self.operations, &record.operation_code)
            && set_allows(&self.items, &record.item_code)
            && set_allows(&self.companies, &record.company)
            && self.start.map_or(true, |start| record.date >= start)
            && self.end.map_or(true, |end| record.date <= end)
    }
}

fn set_allows(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

/// Returns the records matching every active predicate, in input order.
/// No match is an empty result, not an error.
pub fn filter(records: &[SalesRecord], spec: &FilterSpec) -> Vec<SalesRecord> {
    if spec.is_unrestricted() {
        return records.to_vec();
    }

    let matched: Vec<SalesRecord> = records.iter().filter(|record| spec.matches(record)).cloned().collect();
    if matched.is_empty() && !records.is_empty() {
        tracing::warn!(input = records.len(), ?spec, "No records match the selected filters");
    } else {
        tracing::debug!(input = records.len(), matched = matched.len(), "Applied record filter");
    }
    matched
}

/// Typed accessor over the columns a record exposes for ad-hoc filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SalesColumn {
    Operation,
    Date,
    Company,
    Client,
    Origin,
    Usage,
    Item,
    Quantity,
    LineTotal,
    DocNumber,
    ItemName,
    Category,
}

impl SalesColumn {
    pub const ALL: [SalesColumn; 12] = [
        SalesColumn::Operation,
        SalesColumn::Date,
        SalesColumn::Company,
        SalesColumn::Client,
        SalesColumn::Origin,
        SalesColumn::Usage,
        SalesColumn::Item,
        SalesColumn::Quantity,
        SalesColumn::LineTotal,
        SalesColumn::DocNumber,
        SalesColumn::ItemName,
        SalesColumn::Category,
    ];

    pub fn header(self) -> &'static str {
        match self {
            SalesColumn::Operation => COL_OPERATION,
            SalesColumn::Date => COL_DATE,
            SalesColumn::Company => COL_COMPANY,
            SalesColumn::Client => COL_CLIENT,
            SalesColumn::Origin => COL_ORIGIN,
            SalesColumn::Usage => COL_USAGE,
            SalesColumn::Item => COL_ITEM,
            SalesColumn::Quantity => COL_QUANTITY,
            SalesColumn::LineTotal => COL_LINE_TOTAL,
            SalesColumn::DocNumber => COL_DOC_NUMBER,
            SalesColumn::ItemName => "ItemName",
            SalesColumn::Category => "Categoria",
        }
    }

    fn text(self, record: &SalesRecord) -> Option<&str> {
        match self {
            SalesColumn::Operation => Some(&record.operation_code),
            SalesColumn::Company => Some(&record.company),
            SalesColumn::Client => Some(&record.client),
            SalesColumn::Origin => Some(&record.origin),
            SalesColumn::Usage => Some(&record.usage),
            SalesColumn::Item => Some(&record.item_code),
            SalesColumn::DocNumber => record.doc_number.as_deref(),
            SalesColumn::ItemName => Some(&record.item_name),
            SalesColumn::Category => Some(&record.category),
            SalesColumn::Date | SalesColumn::Quantity | SalesColumn::LineTotal => None,
        }
    }

    /// Text columns compare trimmed and case-insensitively; item codes ignore
    /// zero padding; dates and amounts are parsed the same way the export is.
    pub fn matches(self, record: &SalesRecord, value: &str) -> bool {
        let value = value.trim();
        match self {
            SalesColumn::Date => parse_date(value).map_or(false, |date| date == record.date),
            SalesColumn::Quantity => parse_number(value).map_or(false, |qty| qty == record.quantity),
            SalesColumn::LineTotal => parse_number(value).map_or(false, |total| total == record.line_total),
            SalesColumn::Item => {
                unpadded(&record.item_code).eq_ignore_ascii_case(unpadded(value))
            }
            _ => self.text(record).map_or(false, |text| text.trim().eq_ignore_ascii_case(value)),
        }
    }
}

fn unpadded(code: &str) -> &str {
    code.trim().trim_start_matches('0')
}

impl FromStr for SalesColumn {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim();
        SalesColumn::ALL
            .into_iter()
            .find(|column| column.header().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::UnknownColumn(wanted.to_string()))
    }
}

pub fn filter_by(records: &[SalesRecord], column: SalesColumn, value: &str) -> Vec<SalesRecord> {
    records.iter().filter(|record| column.matches(record, value)).cloned().collect()
}

/// Filters on any exposed column by its export header name.
pub fn filter_by_column(records: &[SalesRecord], column_name: &str, value: &str) -> Result<Vec<SalesRecord>, EngineError> {
    let column: SalesColumn = column_name.parse()?;
    Ok(filter_by(records, column, value))
}

/// Distinct values available to each filter dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub clients: Vec<String>,
    pub operations: Vec<String>,
    pub items: Vec<String>,
    pub companies: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

pub fn filter_options(records: &[SalesRecord]) -> FilterOptions {
    let mut clients = BTreeSet::new();
    let mut operations = BTreeSet::new();
    let mut items = BTreeSet::new();
    let mut companies = BTreeSet::new();

    for record in records {
        clients.insert(record.client.clone());
        operations.insert(record.operation_code.clone());
        items.insert(record.item_code.clone());
        companies.insert(record.company.clone());
    }

    FilterOptions {
        clients: clients.into_iter().collect(),
        operations: operations.into_iter().collect(),
        items: items.into_iter().collect(),
        companies: companies.into_iter().collect(),
        first_date: records.iter().map(|r| r.date).min(),
        last_date: records.iter().map(|r| r.date).max(),
    }
}
