//! Command-line glue: argument parsing, logging setup, manifest loading, and report rendering.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;
pub mod convert;
pub mod input;
mod log;
pub mod report;

pub use self::{
    args::Args,
    log::{LogFilter, LogFormat},
    report::{OutputFormat, Report, ReportOptions},
};
