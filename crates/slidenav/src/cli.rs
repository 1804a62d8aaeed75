use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::StartOverlay;

#[derive(Parser)]
#[command(name = "slidenav")]
#[command(author, version, about)]
#[command(long_about = "Present HTML slide documents with fragments and code walkthroughs.\n\n\
    Slides are elements with class=\"slide\"; elements with class=\"fragment\"\n\
    are revealed one step at a time.\n\n\
    Examples:\n  \
    slidenav talk.html                Launch presentation (fullscreen)\n  \
    slidenav talk.html --windowed     Launch in a window\n  \
    slidenav talk.html --location '#4'  Open on slide 4\n  \
    slidenav toc talk.html --json     Print the table of contents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Slide document to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false, conflicts_with = "location")]
    pub slide: Option<usize>,

    /// Start at a location identifier such as '#3'
    #[arg(long, global = false)]
    pub location: Option<String>,

    /// Start in grid overview mode
    #[arg(long, global = false, conflicts_with = "toc_overlay")]
    pub overview: bool,

    /// Start with the table of contents open
    #[arg(long = "toc", global = false)]
    pub toc_overlay: bool,

    /// Color theme (overrides config)
    #[arg(long, global = false, value_parser = ["light", "dark"])]
    pub theme: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the table of contents of a slide document
    Toc {
        /// Slide document to read
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.wrap, keys.grid)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    fn start_overlay(&self) -> StartOverlay {
        if self.overview {
            StartOverlay::Grid
        } else if self.toc_overlay {
            StartOverlay::Toc
        } else {
            StartOverlay::None
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let start = self.start_overlay();
        match self.command {
            Some(Commands::Toc { file, json }) => {
                if !file.exists() {
                    anyhow::bail!("File not found: {}", file.display());
                }
                crate::commands::toc::run(&file, json)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(
                        file,
                        self.windowed,
                        self.location,
                        self.slide,
                        start,
                        self.theme,
                    )
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
