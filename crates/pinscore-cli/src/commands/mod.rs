pub mod check;
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use pinscore_core::Config;
use tracing::info;

/// Load the configuration, pointing at the sample file on failure
fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path).with_context(|| {
        format!(
            "Could not load {}. Look at config.sample.json for an example of how to format it",
            path.display()
        )
    })?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}
