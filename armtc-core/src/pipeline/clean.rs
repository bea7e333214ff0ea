use armtc_common::config::Config;
use armtc_common::error::Result;
use armtc_io::fs::remove_directory_recursive;
use tracing::info;

/// Removes the work directory (downloads, sources, build tree, state) and the install prefix.
pub fn clean(config: &Config) -> Result<()> {
    info!("Cleaning...");
    remove_directory_recursive(&config.work_dir())?;
    remove_directory_recursive(&config.dist_dir())?;
    Ok(())
}
