//! Terminal output formatting for research reports.

mod markdown;

pub use markdown::*;
