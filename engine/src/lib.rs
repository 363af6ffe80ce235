// Engine library root: ingestion, normalization and aggregation of sales exports.

pub mod analytics;
pub mod config;
pub mod data;
pub mod error;
pub mod services;
pub mod transforms;

pub use error::EngineError;

#[cfg(test)]
mod test_support;
