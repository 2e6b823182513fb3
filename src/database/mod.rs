
/// Derived species bibliography and citation resolution
pub mod bibliography;
/// The SQLite gene identity store and its chunked query surface
pub mod gene_db;
/// Authority and citation registration with cascade deletes
pub mod registry;
/// DDL, data-table list, and index creation
pub mod schema;
