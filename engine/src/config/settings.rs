// Engine settings, loaded from a JSON file or taken from defaults
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::EngineError;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Sales export read by the binary.
    pub sales_path: PathBuf,
    /// Optional product catalog export.
    pub catalog_path: Option<PathBuf>,
    pub delimiter: char,
    /// Item codes on both sides of the catalog join are zero-padded to this width.
    pub item_code_width: usize,
    pub sale_marker: String,
    pub return_marker: String,
    pub top_n: usize,
    pub log_level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            sales_path: PathBuf::from("data/vendas_dist.csv"),
            catalog_path: None,
            delimiter: ';',
            item_code_width: 6,
            sale_marker: "VENDA".to_string(),
            return_marker: "DEVOLUCAO".to_string(),
            top_n: 10,
            log_level: "info".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&raw)
            .map_err(|source| EngineError::ConfigParse { path: path.to_path_buf(), source })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.item_code_width == 0 {
            return Err(EngineError::ConfigError("item_code_width must be greater than 0".to_string()));
        }
        if self.top_n == 0 {
            return Err(EngineError::ConfigError("top_n must be greater than 0".to_string()));
        }
        if !self.delimiter.is_ascii() {
            return Err(EngineError::ConfigError(format!(
                "delimiter '{}' must be a single ASCII character",
                self.delimiter
            )));
        }

        let sale = self.sale_marker.trim();
        let ret = self.return_marker.trim();
        if sale.is_empty() || ret.is_empty() {
            return Err(EngineError::ConfigError("operation markers must not be empty".to_string()));
        }
        if sale.eq_ignore_ascii_case(ret) {
            return Err(EngineError::ConfigError(format!(
                "sale and return markers must differ (both are '{}')",
                sale
            )));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII; fall back to ';' otherwise.
        u8::try_from(self.delimiter).unwrap_or(b';')
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.trim().parse().unwrap_or(tracing::Level::INFO)
    }
}
