use std::path::Path;

use anyhow::{Result, bail};
use log::debug;
use rebook_core::config::{RetrofitConfig, load_retrofit_config};

pub const CONFIG_FILE_NAME: &str = "rebook.yaml";

/// An explicit path must exist; otherwise `rebook.yaml` in the source
/// directory is used when present and the built-in defaults when not.
pub fn load_config_for_fix(root: &Path, explicit: Option<&Path>) -> Result<RetrofitConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("Config file {} does not exist.", path.display());
        }
        return load_retrofit_config(path);
    }
    let config_path = root.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        debug!("no {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
        return Ok(RetrofitConfig::default());
    }
    load_retrofit_config(&config_path)
}
