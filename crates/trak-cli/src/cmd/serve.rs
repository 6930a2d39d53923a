use std::path::Path;
use trak_core::config::Config;

/// `trak serve` — run the JSON API server on top of this workspace.
pub fn run(root: &Path, port: u16) -> anyhow::Result<()> {
    // Fail fast with a clear message instead of 400s on every request.
    Config::load(root)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(trak_server::serve(root.to_path_buf(), port))
}
