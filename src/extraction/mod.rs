//! Conversion of a search assignment into a timed [`Solution`](crate::models::Solution).

mod extractor;

pub use extractor::extract_solution;
