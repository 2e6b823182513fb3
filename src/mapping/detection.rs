
use log::debug;
use thiserror::Error;

use crate::data_types::authority::TokenAuthority;
use crate::data_types::species::Species;
use crate::database::gene_db::GeneDatabase;
use crate::util::identifiers::classify_gene_tokens;

/// Default number of identifiers probed per detection query
pub const DETECTION_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Could not infer species and authority from gene list.{details}")]
    InconsistentSpecies { details: String }
}

/// What the detector inferred about a gene list: the per-token authority
/// classification and, when any identifier resolved, the shared species
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesDetection {
    pub authorities: Vec<TokenAuthority>,
    pub species: Option<Species>
}

/// Infers the species and per-token authority for a gene list. Tokens are
/// classified lexically, then the ENSEMBL- and NCBI-shaped buckets are
/// probed against the gene table in chunks. All genes are assumed to come
/// from one species, so the first chunk that hits is trusted for its whole
/// bucket; a chunk spanning several species or authorities, or the two
/// buckets disagreeing on species, is a hard error. If neither bucket
/// resolves, every token is treated as a symbol and no species is reported.
/// # Arguments
/// * `database` - the store to probe
/// * `gene_list` - the raw input tokens
/// * `chunk_size` - identifiers probed per query
/// # Errors
/// * `DetectionError::InconsistentSpecies` when the evidence conflicts
pub fn detect_species_and_authority(
    database: &GeneDatabase,
    gene_list: &[String],
    chunk_size: usize
) -> Result<SpeciesDetection, Box<dyn std::error::Error>> {
    let authorities = classify_gene_tokens(gene_list);

    let ensembl_bucket: Vec<String> = gene_list.iter().zip(authorities.iter())
        .filter(|(_, auth)| **auth == TokenAuthority::Ensembl)
        .map(|(gene, _)| gene.clone())
        .collect();
    let ncbi_bucket: Vec<String> = gene_list.iter().zip(authorities.iter())
        .filter(|(_, auth)| **auth == TokenAuthority::Ncbi)
        .map(|(gene, _)| gene.clone())
        .collect();

    let ensembl_species = detect_bucket_species(database, &ensembl_bucket, chunk_size)?;
    let ncbi_species = detect_bucket_species(database, &ncbi_bucket, chunk_size)?;

    let species = match (ensembl_species, ncbi_species) {
        (None, None) => None,
        (Some(species), None) | (None, Some(species)) => Some(species),
        (Some(ensembl), Some(ncbi)) => {
            if ensembl.taxon != ncbi.taxon {
                return Err(DetectionError::InconsistentSpecies {
                    details: format!(
                        "\nENSEMBL genes gave species '{ensembl}'\nNCBI genes gave species '{ncbi}'"
                    )
                }.into());
            }
            Some(ncbi)
        }
    };

    if species.is_none() {
        // nothing resolved; treat every token as a symbol
        debug!("No identifiers resolved to a species; classifying all tokens as symbols");
        return Ok(SpeciesDetection {
            authorities: vec![TokenAuthority::Symbol; gene_list.len()],
            species: None
        });
    }

    Ok(SpeciesDetection { authorities, species })
}

/// Probes one lexical bucket in chunks, trusting the first chunk with any
/// hits. Costly on buckets full of symbols (every chunk misses), which is
/// why symbol-shaped tokens are never probed.
fn detect_bucket_species(
    database: &GeneDatabase,
    bucket: &[String],
    chunk_size: usize
) -> Result<Option<Species>, Box<dyn std::error::Error>> {
    for chunk in bucket.chunks(chunk_size) {
        let hits = database.species_and_authority_hits(chunk)?;
        if hits.is_empty() {
            continue;
        }

        let mut taxa: Vec<i64> = hits.iter().map(|(taxon, _)| *taxon).collect();
        taxa.sort_unstable();
        taxa.dedup();
        let mut authorities: Vec<String> = hits.iter().map(|(_, name)| name.clone()).collect();
        authorities.sort();
        authorities.dedup();

        let mut details = String::new();
        if authorities.len() > 1 {
            details += &format!("\nMultiple authorities inferred: {authorities:?}");
        }
        if taxa.len() > 1 {
            details += &format!("\nMultiple species inferred: {taxa:?}");
        }
        if !details.is_empty() {
            return Err(DetectionError::InconsistentSpecies { details }.into());
        }

        return match database.species_from_taxon(taxa[0])? {
            Some(species) => Ok(Some(species)),
            None => Ok(Some(Species::new(taxa[0].to_string(), taxa[0])))
        };
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::gene_db::GeneRow;

    fn fixture_database() -> GeneDatabase {
        let mut database = GeneDatabase::create_in_memory().unwrap();
        database.insert_authority("NCBI").unwrap();
        database.insert_authority("ENSEMBL").unwrap();
        database.insert_species_rows(&[
            (9606, "human".to_string()),
            (10090, "mouse".to_string())
        ]).unwrap();
        database.insert_gene_rows(&[
            GeneRow {
                authority: 0, species_taxon: 9606, id: 12, symbol: Some("Gad2".to_string()),
                identifier: "NCBIGene:12".to_string(), citation: 0
            },
            GeneRow {
                authority: 1, species_taxon: 9606, id: 12, symbol: Some("Gad2".to_string()),
                identifier: "ENSG12".to_string(), citation: 0
            },
            GeneRow {
                authority: 0, species_taxon: 10090, id: 44, symbol: None,
                identifier: "NCBIGene:44".to_string(), citation: 0
            }
        ]).unwrap();
        database
    }

    fn to_strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_mixed_list() {
        let database = fixture_database();
        let gene_list = to_strings(&["Gad2", "NCBIGene:12", "ENSG12"]);
        let detection = detect_species_and_authority(&database, &gene_list, 1000).unwrap();

        assert_eq!(detection.authorities, vec![
            TokenAuthority::Symbol,
            TokenAuthority::Ncbi,
            TokenAuthority::Ensembl
        ]);
        assert_eq!(detection.species, Some(Species::new("human".to_string(), 9606)));
    }

    #[test]
    fn test_detect_nothing_resolves() {
        let database = fixture_database();
        // identifier-shaped tokens absent from the store become symbols
        let gene_list = to_strings(&["Gad1", "NCBIGene:99999", "ENSG99999"]);
        let detection = detect_species_and_authority(&database, &gene_list, 1000).unwrap();

        assert_eq!(detection.authorities, vec![TokenAuthority::Symbol; 3]);
        assert_eq!(detection.species, None);
    }

    #[test]
    fn test_detect_conflicting_species_in_chunk() {
        let database = fixture_database();
        let gene_list = to_strings(&["NCBIGene:12", "NCBIGene:44"]);
        let result = detect_species_and_authority(&database, &gene_list, 1000);
        assert!(result.unwrap_err().to_string().contains("Multiple species inferred"));
    }

    #[test]
    fn test_detect_cross_bucket_conflict() {
        let mut database = fixture_database();
        database.insert_gene_rows(&[GeneRow {
            authority: 1, species_taxon: 10090, id: 45, symbol: None,
            identifier: "ENSMUSG45".to_string(), citation: 0
        }]).unwrap();

        let gene_list = to_strings(&["NCBIGene:12", "ENSMUSG45"]);
        let result = detect_species_and_authority(&database, &gene_list, 1000);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("ENSEMBL genes gave species"));
        assert!(message.contains("NCBI genes gave species"));
    }

    #[test]
    fn test_first_chunk_with_hits_decides() {
        let database = fixture_database();
        // chunk size 1: the first identifier misses, the second chunk hits
        // and is trusted for the whole bucket
        let gene_list = to_strings(&["NCBIGene:99999", "NCBIGene:12"]);
        let detection = detect_species_and_authority(&database, &gene_list, 1).unwrap();
        assert_eq!(detection.species.unwrap().taxon, 9606);
        assert_eq!(detection.authorities, vec![TokenAuthority::Ncbi; 2]);
    }
}
