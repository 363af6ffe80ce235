pub mod brazilian_format;
pub mod csv_loader;
pub mod filter;
pub mod raw_table;
pub mod record_parser;
pub mod snapshot_cache;
