
use serde::{Deserialize, Serialize};

/// A species as resolved through the species table.
/// Many names (synonyms) may resolve to one taxon; the taxon is the identity.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Species {
    /// human-readable name, as it was looked up
    pub name: String,
    /// NCBI-style integer taxon id
    pub taxon: i64
}

impl Species {
    pub fn new(name: String, taxon: i64) -> Species {
        Species {
            name, taxon
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (taxon {})", self.name, self.taxon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_display() {
        let species = Species::new("human".to_string(), 9606);
        assert_eq!(species.to_string(), "human (taxon 9606)");
    }
}
