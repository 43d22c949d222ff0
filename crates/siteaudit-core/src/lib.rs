pub mod aggregate;
pub mod config;
pub mod error;
pub mod extractor;
pub mod findings;
pub mod index;
pub mod locator;
pub mod metrics;
pub mod pipeline;
pub mod token;
pub mod types;

pub use aggregate::{Aggregator, AuditRun, ProductionPages};
pub use config::Config;
pub use error::AuditError;
pub use extractor::{AssetExtractor, Extraction};
pub use findings::{build_findings, AuditFindings};
pub use index::OccurrenceIndex;
pub use pipeline::AuditPipeline;
pub use types::*;
