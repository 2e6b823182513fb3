
/// Contains the naming authorities and the lexical token pseudo-authority
pub mod authority;
/// Contains the citation (provenance source) record type
pub mod citation;
/// Contains the per-call failure tally returned with every mapping
pub mod failure_log;
/// Contains the provenance records that make up a mapping's audit trail
pub mod metadata;
/// Contains the species record type
pub mod species;
