//! Config subcommands handler

use anyhow::{bail, Result};

use tzparse::Config;

/// Show current configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show() -> Result<()> {
    let config = Config::load()?;
    println!("# {}", Config::config_path()?.display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Write the default configuration file.
///
/// Refuses to overwrite an existing file unless `force` is set.
#[cfg(not(tarpaulin_include))]
pub fn handle_init(force: bool) -> Result<()> {
    let config_path = Config::config_path()?;
    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            config_path.display()
        );
    }
    Config::default().save()?;
    println!("Wrote {}", config_path.display());
    Ok(())
}
