
use clap::Args;
use log::info;
use std::path::PathBuf;

use crate::cli::core::check_required_filename;

#[derive(Clone, Args)]
#[clap(author, about)]
pub struct StatSettings {
    /// Input mapper database file (SQLite)
    #[clap(required = true)]
    #[clap(short = 'd')]
    #[clap(long = "database")]
    #[clap(value_name = "DB")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_database: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8
}

pub fn check_stat_settings(settings: StatSettings) -> StatSettings {
    check_required_filename(&settings.input_database, "Mapper database");

    info!("Input database: {:?}", settings.input_database);

    settings
}
