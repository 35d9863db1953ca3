//! Date-range partitioning.

pub mod months;

pub use months::{MonthRanges, month_ranges};
