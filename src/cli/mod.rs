
/// Contains the core CLI parser and shared checks
pub mod core;
/// Contains the settings for the "map" subcommand
pub mod map;
/// Contains the settings for the "stat" subcommand
pub mod stat;
