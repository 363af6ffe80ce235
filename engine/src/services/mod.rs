// Entry points used by callers that wire the pipeline together.
pub mod sales_pipeline;

pub use sales_pipeline::SalesPipeline;
