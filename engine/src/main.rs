// Engine main entry point: runs the pipeline once over the configured exports.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use engine::config::settings::EngineSettings;
use engine::data::csv_loader::CsvTableLoader;
use engine::data::filter::FilterSpec;
use engine::data::snapshot_cache::Fingerprint;
use engine::services::SalesPipeline;
use engine::transforms::catalog_joiner::Catalog;
use shared::utils::{format_brl, format_date_br, format_quantity};
use tracing::info;

const CONFIG_ENV: &str = "SALES_ENGINE_CONFIG";

fn load_settings() -> Result<EngineSettings> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            EngineSettings::from_json_file(&path)
                .with_context(|| format!("loading settings from {}", path.display()))
        }
        None => Ok(EngineSettings::default()),
    }
}

fn load_catalog(settings: &EngineSettings) -> Result<Catalog> {
    let Some(path) = settings.catalog_path.as_deref() else {
        info!("No catalog configured, item names stay empty");
        return Ok(Catalog::default());
    };
    let table = CsvTableLoader::load_from_path(path, settings.delimiter_byte())
        .with_context(|| format!("reading catalog {}", path.display()))?;
    Ok(Catalog::from_table(&table, settings.item_code_width)?)
}

fn read_export(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading sales export {}", path.display()))
}

fn main() -> Result<()> {
    let settings = load_settings()?;

    tracing_subscriber::fmt().with_max_level(settings.tracing_level()).init();
    info!("Starting sales engine...");

    let bytes = read_export(&settings.sales_path)?;
    let fingerprint = Fingerprint::of_bytes(&bytes);
    info!(path = %settings.sales_path.display(), %fingerprint, "Read sales export");

    let delimiter = settings.delimiter_byte();
    let pipeline = SalesPipeline::new(settings.clone(), load_catalog(&settings)?);
    let snapshot = pipeline.load(&fingerprint, || CsvTableLoader::read_bytes(&bytes, delimiter))?;

    let records = pipeline.filter(&snapshot.records, &FilterSpec::new());
    let result = pipeline.aggregate(&records);

    let options = pipeline.filter_options(&records);
    if let (Some(first), Some(last)) = (options.first_date, options.last_date) {
        info!(
            clients = options.clients.len(),
            items = options.items.len(),
            "Period {} to {}",
            format_date_br(first),
            format_date_br(last)
        );
    }

    println!("{}", serde_json::to_string_pretty(&result)?);

    info!(
        records = result.totals.record_count,
        dropped_rows = snapshot.dropped_rows,
        unmatched_items = snapshot.unmatched_items,
        "Net sales {} | quantity {} | ticket {} | growth {}",
        format_brl(result.totals.net_sales),
        format_quantity(result.totals.net_quantity),
        format_brl(result.summary.ticket_average),
        result.summary.growth
    );
    Ok(())
}
