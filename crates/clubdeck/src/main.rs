mod app;
mod cli;
mod clock;
mod commands;
mod config;
mod countdown;
mod deck;
mod render;
mod schedule;
mod theme;

use clap::Parser;
use colored::Colorize;

fn main() {
    let cli = cli::Cli::parse();
    if let Err(err) = cli.run() {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
