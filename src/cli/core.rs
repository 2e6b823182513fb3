
use clap::{Parser, Subcommand};
use log::error;
use std::path::Path;

use crate::cli::map::MapSettings;
use crate::cli::stat::StatSettings;

/// genemapper, a tool for mapping gene identifier lists between naming
/// authorities and species. Select a subcommand to see more usage
/// information:
#[derive(Parser)]
#[clap(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map a gene list to a destination species and authority
    Map(Box<MapSettings>),
    /// Generate statistics about a mapper database file
    Stat(Box<StatSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) {
    if !filename.exists() {
        error!("{} does not exist: \"{}\"", label, filename.display());
        std::process::exit(exitcode::NOINPUT);
    } else {
        // file exists, we're good
    }
}
