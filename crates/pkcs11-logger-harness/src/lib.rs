//! Offline tooling for PKCS#11 logger output.
//!
//! This crate provides:
//! - Log parsing: rebuild call records from the line-oriented log
//! - Checking: block atomicity and structure violations
//! - Reporting: a JSON summary of calls, results and redactions

#![forbid(unsafe_code)]

pub mod log_parse;
pub mod report;

pub use log_parse::{CallRecord, ParseError, ParsedLog, Violation, ViolationKind, parse, read_log};
pub use report::{FunctionStats, Summary};
