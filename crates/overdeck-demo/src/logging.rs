//! Subscriber installation. Only the binary calls this; the libraries just emit.

use tracing_subscriber::EnvFilter;

use crate::error::{DemoError, Result};

pub fn init(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|err| DemoError::invalid(format!("invalid log filter `{level}`: {err}")))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| DemoError::Logging {
        message: err.to_string(),
    })
}
