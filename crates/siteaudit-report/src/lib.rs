pub mod json;
pub mod markdown;
pub mod matrix;
pub mod sink;
pub mod text;

pub use sink::{write_reports, write_sink};
pub use text::TextOptions;

#[cfg(test)]
mod testutil;
