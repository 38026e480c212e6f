//! Mutual Fund Overlap Module
//!
//! Measures how much two funds' portfolios share, by holding count and by weight.

pub mod models;
pub mod overlap;

pub use models::{Instrument, MutualFund, OverlapReport};
pub use overlap::{compare_funds, overlap_percentage, parse_percentage, weighted_overlap};
