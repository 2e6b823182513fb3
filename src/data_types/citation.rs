
use serde::{Deserialize, Serialize};

/// A citation row: a named, versioned provenance source whose data rows can
/// be bulk-inserted and bulk-deleted as a unit.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Citation {
    /// stable integer id, assigned at insertion time (max existing + 1)
    pub idx: i64,
    /// unique name, e.g. "NCBI" or the name given to an ortholog CSV
    pub name: String,
    /// arbitrary JSON describing the source (file paths, hashes, versions)
    pub metadata: serde_json::Value
}

impl Citation {
    /// The serialized form reported in mapping provenance: the internal row
    /// id is an implementation detail and is stripped.
    pub fn to_provenance(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "metadata": self.metadata
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_strips_idx() {
        let citation = Citation {
            idx: 7,
            name: "NCBI".to_string(),
            metadata: serde_json::json!({"file": "gene_info.gz"})
        };
        let provenance = citation.to_provenance();
        assert!(provenance.get("idx").is_none());
        assert_eq!(provenance["name"], "NCBI");
        assert_eq!(provenance["metadata"]["file"], "gene_info.gz");
    }
}
