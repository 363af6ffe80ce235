// Record-level stages applied between parsing and caching.
pub mod catalog_joiner;
pub mod sign_corrector;
