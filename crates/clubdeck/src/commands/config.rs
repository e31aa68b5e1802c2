use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let config = Config::load_or_default();
    let yaml = serde_yaml::to_string(&config)?;
    println!("{}", "# clubdeck startup defaults".dimmed());
    print!("{yaml}");
    if let Ok(path) = Config::path() {
        println!("{} {}", "# file:".dimmed(), path.display());
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "updated".green().bold());
    println!("  {}", path.display());
    Ok(())
}
