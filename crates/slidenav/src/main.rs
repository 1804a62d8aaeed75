mod app;
mod cli;
mod commands;
mod config;
mod deck;
mod input;
mod location;
mod logging;
mod nav;
mod presenter;
mod render;
mod theme;
mod view;

use clap::Parser;
use colored::Colorize;

fn main() {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    logging::init(cli.verbose, cli.quiet, !cli.no_color);

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
