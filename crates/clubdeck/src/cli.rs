use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "clubdeck")]
#[command(author, version, about)]
#[command(long_about = "A kiosk presentation display for weekly club nights.\n\n\
    Shows a standby clock, counts down to the configured start time, and runs\n\
    the scheduled slideshow for the evening.\n\n\
    Examples:\n  \
    clubdeck                     Launch the kiosk (fullscreen)\n  \
    clubdeck --windowed          Launch in a window\n  \
    clubdeck config show         Print the startup defaults")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long)]
    pub windowed: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify the startup defaults
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
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display the current startup defaults
    Show,

    /// Set a default value
    Set {
        /// Configuration key (e.g. defaults.auto_start_day, defaults.countdown_minutes)
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
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            None => crate::app::run(self.windowed),
        }
    }
}
