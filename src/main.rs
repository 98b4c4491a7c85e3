use std::path::PathBuf;

use anyhow::Context;
use bauble::{app::BaubleApp, config::SceneConfig};

/// Config file read from the working directory unless `BAUBLE_CONFIG` names another.
const DEFAULT_CONFIG: &str = "bauble.toml";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::var_os("BAUBLE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = SceneConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let mut app = BaubleApp::new(config).context("creating the event loop")?;

    // Assets named in a config file are relative to that file
    if let Some(root) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        app = app.with_asset_root(root);
    }

    app.run().context("running the event loop")
}
