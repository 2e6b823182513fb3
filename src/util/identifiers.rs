
use lazy_static::lazy_static;
use regex::Regex;

use crate::data_types::authority::TokenAuthority;

lazy_static! {
    /// first run of digits anywhere in a token
    static ref INT_REGEX: Regex = Regex::new("[0-9]+").unwrap();
    /// trailing run of digits, used when pulling the integer id out of an identifier
    static ref TRAILING_INT_REGEX: Regex = Regex::new("[0-9]+$").unwrap();
    /// ENSEMBL-style prefix, e.g. "ENSG", "ENSMUSG"
    static ref ENSEMBL_PREFIX_REGEX: Regex = Regex::new("^ENS[A-Z]+").unwrap();
    /// NCBI-style prefix, e.g. "NCBIGene:"
    static ref NCBI_PREFIX_REGEX: Regex = Regex::new("^NCBI[A-Za-z]*:?").unwrap();
}

/// Error for identifiers that do not carry exactly one trailing integer block
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
#[error("could not get one integer from {identifier}")]
pub struct MalformedIdentifierError {
    pub identifier: String
}

/// Pulls the integer part off the end of a gene identifier,
/// e.g. "ENSMUSG00000003134" -> 3134, "NCBIGene:12" -> 12.
/// # Errors
/// * if the identifier does not end with a run of digits
pub fn int_from_identifier(identifier: &str) -> Result<i64, MalformedIdentifierError> {
    match TRAILING_INT_REGEX.find(identifier) {
        Some(m) => m.as_str().parse().map_err(|_| MalformedIdentifierError {
            identifier: identifier.to_string()
        }),
        None => Err(MalformedIdentifierError {
            identifier: identifier.to_string()
        })
    }
}

/// Lexically classifies a single gene token as an NCBI identifier, an
/// ENSEMBL identifier, or a symbol. A token only counts as an identifier
/// when it is exactly a recognized prefix followed by its first digit run;
/// anything else, digits or not, is a symbol.
pub fn classify_gene_token(token: &str) -> TokenAuthority {
    if let Some(int_match) = INT_REGEX.find(token) {
        let digits = int_match.as_str();
        if let Some(prefix) = ENSEMBL_PREFIX_REGEX.find(token) {
            if token == format!("{}{}", prefix.as_str(), digits) {
                return TokenAuthority::Ensembl;
            }
        } else if let Some(prefix) = NCBI_PREFIX_REGEX.find(token) {
            if token == format!("{}{}", prefix.as_str(), digits) {
                return TokenAuthority::Ncbi;
            }
        }
    }
    TokenAuthority::Symbol
}

/// Classifies every token in a list; see `classify_gene_token`
pub fn classify_gene_tokens(tokens: &[String]) -> Vec<TokenAuthority> {
    tokens.iter()
        .map(|t| classify_gene_token(t))
        .collect()
}
