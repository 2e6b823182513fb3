
use rusqlite::Connection;

/// Full DDL for a new mapper database. No foreign-key engine is assumed;
/// referential integrity is enforced by caller ordering (registry rows are
/// written before the data rows that reference them).
pub const SCHEMA: &str = "
CREATE TABLE gene (
    authority INTEGER,
    species_taxon INTEGER,
    id INTEGER,
    symbol TEXT,
    identifier TEXT,
    citation INTEGER
);

CREATE TABLE gene_equivalence (
    species_taxon INTEGER,
    authority0 INTEGER,
    gene0 INTEGER,
    authority1 INTEGER,
    gene1 INTEGER,
    citation INTEGER
);

-- group membership; group numbers are only meaningful within one
-- (authority, citation) partition
CREATE TABLE gene_ortholog (
    authority INTEGER,
    citation INTEGER,
    species INTEGER,
    gene INTEGER,
    ortholog_group INTEGER
);

CREATE TABLE authority (
    id INTEGER,
    name TEXT
);

CREATE TABLE citation (
    id INTEGER,
    name TEXT,
    metadata TEXT
);

CREATE TABLE species (
    id INTEGER,
    name TEXT
);

-- derived from the gene table; rebuilt after every ingestion run
CREATE TABLE species_bibliography (
    authority INTEGER,
    species_taxon INTEGER,
    citation INTEGER,
    has_symbols INTEGER
);

CREATE TABLE mapper_metadata (
    timestamp TEXT
);
";

/// The tables holding per-citation data rows, in the order cascade deletes
/// visit them
pub const DATA_TABLES: [&str; 3] = ["gene", "gene_equivalence", "gene_ortholog"];

/// Creates all tables on a fresh database and stamps the build time
/// # Errors
/// * if any DDL statement fails (e.g. the tables already exist)
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute(
        "INSERT INTO mapper_metadata (timestamp) VALUES (?1)",
        [chrono::Utc::now().to_rfc3339()]
    )?;
    Ok(())
}

/// Creates the query indexes. Deferred until after bulk ingestion so the
/// inserts do not pay for incremental index maintenance.
/// # Errors
/// * if index creation fails
pub fn create_indexes(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS gene_idx
            ON gene (authority, species_taxon, symbol);
        CREATE INDEX IF NOT EXISTS gene_equivalence_idx
            ON gene_equivalence (species_taxon, authority0, authority1, gene0);
        CREATE INDEX IF NOT EXISTS gene_ortholog_idx
            ON gene_ortholog (authority, citation, species, gene);
        CREATE INDEX IF NOT EXISTS gene_ortholog_group_idx
            ON gene_ortholog (authority, citation, species, ortholog_group);
        CREATE INDEX IF NOT EXISTS species_idx
            ON species (name);
        "
    )
}
