
use serde::{Deserialize, Serialize};

/// The naming authorities we can map between.
/// These are the only two authorities the composer will land on;
/// arbitrary additional authorities can still live in the registry.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, strum_macros::Display, strum_macros::EnumString)]
pub enum Authority {
    #[strum(to_string = "NCBI")]
    #[serde(rename = "NCBI")]
    Ncbi,
    #[strum(to_string = "ENSEMBL")]
    #[serde(rename = "ENSEMBL")]
    Ensembl
}

/// Lexical classification of a raw gene token, assigned before any
/// database lookup. `Symbol` is a pseudo-authority: it marks a token as a
/// human-readable name rather than an identifier, and is never persisted.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, strum_macros::Display, strum_macros::EnumString)]
pub enum TokenAuthority {
    #[strum(to_string = "NCBI")]
    #[serde(rename = "NCBI")]
    Ncbi,
    #[strum(to_string = "ENSEMBL")]
    #[serde(rename = "ENSEMBL")]
    Ensembl,
    #[strum(to_string = "symbol")]
    #[serde(rename = "symbol")]
    Symbol
}

impl From<Authority> for TokenAuthority {
    fn from(value: Authority) -> TokenAuthority {
        match value {
            Authority::Ncbi => TokenAuthority::Ncbi,
            Authority::Ensembl => TokenAuthority::Ensembl
        }
    }
}

impl TokenAuthority {
    /// Returns the persisted authority, or None for the symbol pseudo-authority
    pub fn as_authority(&self) -> Option<Authority> {
        match self {
            TokenAuthority::Ncbi => Some(Authority::Ncbi),
            TokenAuthority::Ensembl => Some(Authority::Ensembl),
            TokenAuthority::Symbol => None
        }
    }
}

/// An authority row as stored in the registry: stable integer id + unique name
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AuthorityRecord {
    /// stable integer id, assigned at insertion time (max existing + 1)
    pub idx: i64,
    /// unique name, e.g. "NCBI" or "ENSEMBL"
    pub name: String
}
