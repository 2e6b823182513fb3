
/// Contains all the CLI related functionality
pub mod cli;
/// Contains any specialized data types that are shared across the tooling
pub mod data_types;
/// Contains the SQLite-backed gene identity store and its registries
pub mod database;
/// Contains functionality for displaying database statistics
pub mod db_stat;
/// Contains the mapping pipeline: detection, primitives, and the composer
pub mod mapping;
/// Contains the ortholog graph engine and group ingestion
pub mod ortholog;
/// Contains generic utilities that are handy wrappers
pub mod util;
