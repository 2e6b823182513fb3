
use log::{LevelFilter, error, info};
use std::str::FromStr;

use genemapper::cli::core::{Commands, get_cli};
use genemapper::cli::map::{MapSettings, check_map_settings};
use genemapper::cli::stat::{StatSettings, check_stat_settings};
use genemapper::data_types::authority::Authority;
use genemapper::data_types::species::Species;
use genemapper::database::gene_db::GeneDatabase;
use genemapper::mapping::arbitrary::{ArbitraryMapping, arbitrary_mapping};
use genemapper::util::file_io::{load_gene_list, save_json};

/// This will run the "map" mode of the tool
/// # Arguments
/// * `settings` - the MapSettings object
fn run_map(settings: MapSettings) {
    // get the settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    // immediately setup logging first
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // okay, now we can check all the other settings
    let cli_settings: MapSettings = check_map_settings(settings);

    let dst_authority: Authority = match Authority::from_str(&cli_settings.dst_authority) {
        Ok(authority) => authority,
        Err(_) => {
            error!(
                "Unclear how to map to authority '{}'; must be either 'NCBI' or 'ENSEMBL'",
                cli_settings.dst_authority
            );
            std::process::exit(exitcode::USAGE);
        }
    };

    // first load the database
    info!("Opening mapper database {:?}...", cli_settings.input_database);
    let database: GeneDatabase = match GeneDatabase::open(&cli_settings.input_database) {
        Ok(db) => db,
        Err(e) => {
            error!("Error while opening mapper database: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    let dst_species: Species = match database.lookup_species(&cli_settings.dst_species) {
        Ok(species) => species,
        Err(e) => {
            error!("Error while resolving destination species: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    let gene_list: Vec<String> = match load_gene_list(&cli_settings.input_genes) {
        Ok(genes) => genes,
        Err(e) => {
            error!("Error while loading gene list: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // all the work
    let result: ArbitraryMapping = match arbitrary_mapping(
        &database,
        &gene_list,
        &dst_species,
        dst_authority,
        &cli_settings.ortholog_citation,
        cli_settings.placeholder_prefix.as_deref()
    ) {
        Ok(mapping) => mapping,
        Err(e) => {
            error!("Error while mapping gene list: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    // save the mapping to the defined file, or dump it to stdout
    match cli_settings.output_mapping.as_ref() {
        Some(filename) => {
            info!("Saving mapping to {filename:?}");
            if let Err(e) = save_json(&result, filename) {
                error!("Error while writing mapping to file: {e}");
                std::process::exit(exitcode::IOERR);
            }
        },
        None => {
            match serde_json::to_string_pretty(&result) {
                Ok(serialized) => println!("{serialized}"),
                Err(e) => {
                    error!("Error while serializing mapping: {e}");
                    std::process::exit(exitcode::IOERR);
                }
            }
        }
    };
}

/// This will run the "stat" mode of the tool
/// # Arguments
/// * `settings` - the StatSettings object
fn run_stat(settings: StatSettings) {
    // get the settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    // immediately setup logging first
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // okay, now we can check all the other settings
    let cli_settings: StatSettings = check_stat_settings(settings);

    info!("Opening mapper database {:?}...", cli_settings.input_database);
    let database: GeneDatabase = match GeneDatabase::open(&cli_settings.input_database) {
        Ok(db) => db,
        Err(e) => {
            error!("Error while opening mapper database: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // display the database statistics
    if let Err(e) = genemapper::db_stat::print_stats(&database) {
        error!("Error while generating database statistics: {e}");
        std::process::exit(exitcode::IOERR);
    }
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Map(settings) => {
            run_map(*settings);
        },
        Commands::Stat(settings) => {
            run_stat(*settings);
        }
    }

    info!("Process finished successfully.");
}
