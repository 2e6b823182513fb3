
use serde::{Deserialize, Serialize};

use crate::data_types::authority::TokenAuthority;
use crate::data_types::species::Species;

/// Which attribute of the genes a mapping step changed
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingAxis {
    Authority,
    Species
}

/// One endpoint of a mapping step. Authorities serialize as their bare name,
/// species as {"name", "taxon"}, matching the provenance format consumers audit.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MappingEndpoint {
    Authority(TokenAuthority),
    Species(Species)
}

/// The "mapping" block of one provenance record
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MappingStep {
    pub axis: MappingAxis,
    pub from: MappingEndpoint,
    pub to: MappingEndpoint
}

/// One entry in the ordered provenance trail returned with every mapping:
/// the axis that changed, both endpoints, and the citation that justified it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MappingMetadata {
    pub mapping: MappingStep,
    /// citation in provenance form (no internal row id)
    pub citation: serde_json::Value
}

impl MappingMetadata {
    /// A step along the authority axis (symbol -> NCBI, ENSEMBL -> NCBI, ...)
    pub fn authority_step(from: TokenAuthority, to: TokenAuthority, citation: serde_json::Value) -> MappingMetadata {
        MappingMetadata {
            mapping: MappingStep {
                axis: MappingAxis::Authority,
                from: MappingEndpoint::Authority(from),
                to: MappingEndpoint::Authority(to)
            },
            citation
        }
    }

    /// A step along the species axis (ortholog translation)
    pub fn species_step(from: Species, to: Species, citation: serde_json::Value) -> MappingMetadata {
        MappingMetadata {
            mapping: MappingStep {
                axis: MappingAxis::Species,
                from: MappingEndpoint::Species(from),
                to: MappingEndpoint::Species(to)
            },
            citation
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_step_serialization() {
        let meta = MappingMetadata::authority_step(
            TokenAuthority::Symbol,
            TokenAuthority::Ncbi,
            serde_json::json!({"name": "NCBI"})
        );
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["mapping"]["axis"], "authority");
        assert_eq!(value["mapping"]["from"], "symbol");
        assert_eq!(value["mapping"]["to"], "NCBI");
        assert_eq!(value["citation"]["name"], "NCBI");
    }

    #[test]
    fn test_species_step_serialization() {
        let meta = MappingMetadata::species_step(
            Species::new("human".to_string(), 9606),
            Species::new("mouse".to_string(), 10090),
            serde_json::json!({"name": "NCBI"})
        );
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["mapping"]["axis"], "species");
        assert_eq!(value["mapping"]["from"], serde_json::json!({"name": "human", "taxon": 9606}));
        assert_eq!(value["mapping"]["to"]["taxon"], 10090);
    }
}
