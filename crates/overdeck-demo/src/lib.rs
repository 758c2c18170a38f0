#![forbid(unsafe_code)]

//! Scripted overlay scenarios rendered through a headless host.

pub mod cli;
pub mod error;
pub mod logging;
pub mod scenario;

pub use cli::{Cli, Commands, OutputFormat, run, run_from_env};
pub use error::{DemoError, Result};
