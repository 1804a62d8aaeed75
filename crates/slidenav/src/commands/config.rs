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
    let path = Config::path()?;
    let config = Config::load_or_default();
    let exists = path.exists();

    println!("{} {}", "Config file:".bold(), path.display());
    if !exists {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();

    let options = config.presenter_options();
    let start = config
        .defaults
        .as_ref()
        .and_then(|d| d.start_mode.clone())
        .unwrap_or_else(|| "first".to_string());

    let rows = [
        ("defaults.theme", config.theme_name().to_string()),
        ("defaults.start_mode", start),
        ("defaults.wrap", options.policy.wrap_forward.to_string()),
        ("defaults.jump_landing", options.policy.jump_landing.name().to_string()),
        ("defaults.design_width", options.design_width.to_string()),
        ("keys.toc", options.keys.toc.to_string()),
        ("keys.grid", options.keys.grid.to_string()),
        ("overview.enabled", options.grid_enabled.to_string()),
    ];
    for (key, value) in rows {
        println!("  {:<24} {}", key.cyan(), value);
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {} = {}",
        "Set".green().bold(),
        key.cyan(),
        value
    );
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}
