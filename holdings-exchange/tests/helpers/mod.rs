//! Test Helper Utilities
//!
//! Shared utilities for testing holdings-exchange

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;
pub mod mock_search;

pub use fixtures::{
    host_dates, issue_by_volume, monograph_record, response, serial_record, with_total,
};
pub use log_capture::{capture_logs, LogCapture};
pub use mock_search::{MockSearch, Reply};
