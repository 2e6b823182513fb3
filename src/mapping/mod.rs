
/// The arbitrary mapping composer: any input list to any (species, authority)
pub mod arbitrary;
/// Bulk conversion of a mixed-authority gene list to one authority
pub mod bulk;
/// Species and per-token authority detection
pub mod detection;
/// The mapping primitives: symbols, equivalences, orthologs
pub mod functions;
/// Placeholder naming and degeneracy masking for genes that fail to map
pub mod placeholder;
