//! Utility functions for string formatting.

pub mod format;

pub use format::{format_date, format_money, format_optional, truncate_string};
