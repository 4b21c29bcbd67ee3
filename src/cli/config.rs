//! Configuration commands

use colored::Colorize;

use crate::cli::{GlobalOptions, OutputFormat};
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::output::format_json;

/// Print the effective configuration, overrides applied
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let config = opts.load_config()?;

    match opts.format {
        OutputFormat::Json => println!("{}", format_json(&config)?),
        OutputFormat::Pretty => {
            let yaml =
                serde_yaml::to_string(&config).map_err(|e| ConfigError::SaveError(e.to_string()))?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Print where the configuration file is read from
pub fn path(opts: &GlobalOptions) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    println!("{}", path.display());
    Ok(())
}

/// Write defaults to the configuration file
pub fn init(opts: &GlobalOptions, force: bool) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    if path.exists() && !force {
        return Err(ConfigError::Invalid(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))
        .into());
    }

    let mut config = Config::default();
    if let Some(url) = &opts.url {
        config.base_url = url.clone();
    }
    config.validate()?;
    config.save_to(&path)?;

    println!(
        "{} Wrote configuration to {}",
        "✓".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}
