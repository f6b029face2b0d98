//! holdings-exchange library interface
//!
//! Turns review service summary records into KBART rows and Google Scholar
//! institutional holdings, inferring each serial's coverage from search API
//! facet counts.

pub mod assembler;
pub mod clients;
pub mod coverage;
pub mod error;
pub mod exchange;
pub mod executor;
pub mod model;
pub mod monograph;
pub mod output;
pub mod planner;
pub mod report;
pub mod source;

pub use crate::error::{ExchangeError, ExchangeResult};
pub use crate::exchange::Exchanger;
pub use crate::report::{ExchangeReport, ReportSnapshot};
