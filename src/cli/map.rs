
use clap::Args;
use log::info;
use std::path::PathBuf;

use crate::cli::core::check_required_filename;

#[derive(Clone, Args)]
#[clap(author, about)]
pub struct MapSettings {
    /// Input mapper database file (SQLite)
    #[clap(required = true)]
    #[clap(short = 'd')]
    #[clap(long = "database")]
    #[clap(value_name = "DB")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_database: PathBuf,

    /// Input gene list, one token per line
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-genes")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_genes: PathBuf,

    /// Output mapping report (JSON); written to stdout when omitted
    #[clap(short = 'o')]
    #[clap(long = "output-mapping")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_mapping: Option<PathBuf>,

    /// Destination species, by name or taxon id
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "species")]
    #[clap(value_name = "SPECIES")]
    #[clap(help_heading = Some("Mapping"))]
    pub dst_species: String,

    /// Destination authority (NCBI or ENSEMBL)
    #[clap(required = true)]
    #[clap(short = 'a')]
    #[clap(long = "authority")]
    #[clap(value_name = "AUTHORITY")]
    #[clap(help_heading = Some("Mapping"))]
    pub dst_authority: String,

    /// Citation backing ortholog groups for cross-species requests
    #[clap(long = "ortholog-citation")]
    #[clap(value_name = "NAME")]
    #[clap(default_value = "NCBI")]
    #[clap(help_heading = Some("Mapping"))]
    pub ortholog_citation: String,

    /// Optional prefix prepended to every placeholder name
    #[clap(long = "placeholder-prefix")]
    #[clap(value_name = "PREFIX")]
    #[clap(help_heading = Some("Mapping"))]
    pub placeholder_prefix: Option<String>,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8
}

pub fn check_map_settings(settings: MapSettings) -> MapSettings {
    check_required_filename(&settings.input_database, "Mapper database");
    check_required_filename(&settings.input_genes, "Input gene list");

    info!("Input database: {:?}", settings.input_database);
    info!("Input gene list: {:?}", settings.input_genes);
    info!("Destination species: {}", settings.dst_species);
    info!("Destination authority: {}", settings.dst_authority);
    match settings.output_mapping.as_ref() {
        Some(path) => info!("Output mapping: {path:?}"),
        None => info!("Output mapping: stdout")
    };

    settings
}
