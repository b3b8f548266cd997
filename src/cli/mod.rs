//! CLI module for qresult
//!
//! Provides command-line interface for:
//! - render: Print a fixture's result set as XML
//! - fetch: Print every row in a chosen projection
//! - column: Print every value of one column

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{column, fetch, render, run, run_command, Config, MarkupOverrides};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, response, write_error, write_response, write_text};
