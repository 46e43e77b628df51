//! Config command - show configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::GhmResult;

/// Execute the config command
pub fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> GhmResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => {
            println!("{}", toml::to_string_pretty(config)?);
        }
        Some(ConfigAction::Path) => {
            println!("{}", manager.path().display());
        }
    }

    Ok(())
}
