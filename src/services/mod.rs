pub mod record_normalizer;
pub mod result_aggregator;

pub use record_normalizer::{normalize, normalize_one, with_pdf_extension, PDF_EXTENSION};
pub use result_aggregator::ResultAggregator;
