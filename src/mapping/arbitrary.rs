
use log::info;
use serde::{Deserialize, Serialize};

use crate::data_types::authority::{Authority, TokenAuthority};
use crate::data_types::metadata::MappingMetadata;
use crate::data_types::species::Species;
use crate::database::gene_db::GeneDatabase;
use crate::mapping::bulk::convert_authority_in_bulk;
use crate::mapping::detection::{detect_species_and_authority, DETECTION_CHUNK_SIZE};
use crate::mapping::functions::ortholog_genes;

/// The full output of an arbitrary mapping: the converted gene list plus the
/// ordered provenance trail of every translation step that was applied
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ArbitraryMapping {
    pub metadata: Vec<MappingMetadata>,
    pub gene_list: Vec<String>
}

/// Maps an arbitrary gene list onto a destination species and authority.
/// The species and per-token authority of the inputs are detected first;
/// inputs that resolve to no species are assumed to be symbols of the
/// destination species. Cross-species requests are funneled through NCBI
/// identifiers, translated via ortholog groups, then converted to the
/// destination authority if that is not already NCBI.
/// # Arguments
/// * `database` - the store to query
/// * `gene_list` - the raw input tokens
/// * `dst_species` - the species to land on
/// * `dst_authority` - the authority to land on
/// * `ortholog_citation` - citation backing ortholog groups (usually "NCBI")
/// * `invalid_mapping_prefix` - optional prefix prepended to every
///   placeholder assigned anywhere in the pipeline
/// # Errors
/// * if detection finds conflicting evidence, or any translation step fails
pub fn arbitrary_mapping(
    database: &GeneDatabase,
    gene_list: &[String],
    dst_species: &Species,
    dst_authority: Authority,
    ortholog_citation: &str,
    invalid_mapping_prefix: Option<&str>
) -> Result<ArbitraryMapping, Box<dyn std::error::Error>> {
    info!(
        "Mapping {} input genes to '{dst_species} -- {dst_authority}' \
         backed by a database created on {}",
        gene_list.len(),
        database.build_timestamp()?
    );

    let mut metadata: Vec<MappingMetadata> = vec![];

    let detection = detect_species_and_authority(database, gene_list, DETECTION_CHUNK_SIZE)?;
    let src_species = match detection.species {
        Some(species) => {
            info!("Input genes are from species '{species}'");
            species
        },
        None => {
            info!(
                "Could not find a species for input genes. This probably means \
                 gene symbols were passed in. Assuming they are already \
                 consistent with '{dst_species}'"
            );
            dst_species.clone()
        }
    };

    let mut current_genes: Vec<String>;
    let current_authorities: Vec<TokenAuthority>;

    if src_species.taxon != dst_species.taxon {
        // funnel everything through NCBI identifiers before crossing species
        let bulk = convert_authority_in_bulk(
            database,
            gene_list,
            &detection.authorities,
            &src_species,
            Authority::Ncbi,
            invalid_mapping_prefix
        )?;
        metadata.extend(bulk.metadata);

        info!("Mapping genes from species '{src_species}' to '{dst_species}'");
        let prefix = match invalid_mapping_prefix {
            Some(outer) => format!("{outer}:ortholog"),
            None => "ortholog".to_string()
        };
        let orthologs = ortholog_genes(
            database,
            Authority::Ncbi,
            &src_species,
            dst_species,
            &bulk.gene_list,
            ortholog_citation,
            true,
            Some(&prefix)
        )?;
        metadata.push(orthologs.metadata);

        current_genes = orthologs.gene_list;
        current_authorities = vec![TokenAuthority::Ncbi; gene_list.len()];
    } else {
        current_genes = gene_list.to_vec();
        current_authorities = detection.authorities;
    }

    let already_converted = current_authorities
        .iter()
        .all(|auth| *auth == TokenAuthority::from(dst_authority));
    if !already_converted {
        let bulk = convert_authority_in_bulk(
            database,
            &current_genes,
            &current_authorities,
            dst_species,
            dst_authority,
            invalid_mapping_prefix
        )?;
        metadata.extend(bulk.metadata);
        current_genes = bulk.gene_list;
    }

    Ok(ArbitraryMapping {
        metadata,
        gene_list: current_genes
    })
}
