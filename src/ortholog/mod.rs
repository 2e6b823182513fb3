
/// Connected-component partitioning of the declared-ortholog relation
pub mod graph;
/// Ortholog group ingestion into the gene identity store
pub mod ingest;
