
use log::info;

use crate::data_types::authority::{Authority, TokenAuthority};
use crate::data_types::failure_log::FailureLog;
use crate::data_types::metadata::MappingMetadata;
use crate::data_types::species::Species;
use crate::mapping::functions::{equivalent_genes, identifiers_from_symbols};
use crate::mapping::placeholder::mask_degenerate_genes;
use crate::database::gene_db::GeneDatabase;

/// Citation consulted for cross-authority equivalence claims
pub const EQUIVALENCE_CITATION: &str = "NCBI";

/// A gene list converted to a single authority, with one provenance record
/// per partition that actually required translation
#[derive(Clone, Debug)]
pub struct BulkConversion {
    pub metadata: Vec<MappingMetadata>,
    pub failure_log: FailureLog,
    pub gene_list: Vec<String>
}

/// Converts a gene list of mixed per-token authority into a single
/// destination authority. The list is partitioned by token authority:
/// symbols go through symbol lookup, foreign identifiers through the
/// equivalence table, and tokens already in the destination authority pass
/// through untouched. Partitions are reassembled positionally, the
/// like-named failure counters are summed, and batch-level degenerate
/// collisions are masked last.
/// # Arguments
/// * `database` - the store to query
/// * `gene_list` - the input tokens
/// * `authorities` - per-token authority, parallel to `gene_list`
/// * `species` - the species the genes belong to
/// * `dst_authority` - the authority to land on
/// * `invalid_mapping_prefix` - optional prefix prepended to every
///   placeholder assigned during this conversion
/// # Errors
/// * if the two input slices differ in length, or any partition lookup fails
pub fn convert_authority_in_bulk(
    database: &GeneDatabase,
    gene_list: &[String],
    authorities: &[TokenAuthority],
    species: &Species,
    dst_authority: Authority,
    invalid_mapping_prefix: Option<&str>
) -> Result<BulkConversion, Box<dyn std::error::Error>> {
    if gene_list.len() != authorities.len() {
        simple_error::bail!(
            "gene list has {} entries but {} authorities were supplied",
            gene_list.len(), authorities.len()
        );
    }

    let mut result: Vec<Option<String>> = vec![None; gene_list.len()];
    let mut metadata: Vec<MappingMetadata> = vec![];
    let mut failure_log = FailureLog::default();

    let partition = |wanted: TokenAuthority| -> (Vec<usize>, Vec<String>) {
        let indexes: Vec<usize> = authorities.iter().enumerate()
            .filter(|(_, auth)| **auth == wanted)
            .map(|(ii, _)| ii)
            .collect();
        let genes = indexes.iter().map(|&ii| gene_list[ii].clone()).collect();
        (indexes, genes)
    };

    let (symbol_indexes, symbols) = partition(TokenAuthority::Symbol);
    if !symbol_indexes.is_empty() {
        info!("Mapping input genes from 'symbol' to '{dst_authority}'");
        let prefix = prefixed(invalid_mapping_prefix, &format!("symbol:{dst_authority}"));
        let converted = identifiers_from_symbols(
            database, &symbols, species, dst_authority, true, Some(&prefix)
        )?;
        for (index, gene) in symbol_indexes.into_iter().zip(converted.gene_list) {
            result[index] = Some(gene);
        }
        metadata.push(converted.metadata);
        failure_log.absorb(&converted.failure_log);
    }

    for input_authority in [Authority::Ensembl, Authority::Ncbi] {
        let (indexes, genes) = partition(input_authority.into());
        if indexes.is_empty() {
            continue;
        }

        if input_authority == dst_authority {
            for (index, gene) in indexes.into_iter().zip(genes) {
                result[index] = Some(gene);
            }
        } else {
            info!("Mapping input genes from '{input_authority}' to '{dst_authority}'");
            let prefix = prefixed(
                invalid_mapping_prefix,
                &format!("{input_authority}:{dst_authority}")
            );
            let converted = equivalent_genes(
                database, input_authority, dst_authority, &genes,
                species, EQUIVALENCE_CITATION, true, Some(&prefix)
            )?;
            for (index, gene) in indexes.into_iter().zip(converted.gene_list) {
                result[index] = Some(gene);
            }
            metadata.push(converted.metadata);
            failure_log.absorb(&converted.failure_log);
        }
    }

    let assembled: Vec<String> = result.into_iter().flatten().collect();
    let (masked, n_degenerate) =
        mask_degenerate_genes(&assembled, Some(&dst_authority.to_string()));
    failure_log.degenerate_matches += n_degenerate;

    Ok(BulkConversion {
        metadata,
        failure_log,
        gene_list: masked
    })
}

fn prefixed(invalid_mapping_prefix: Option<&str>, step: &str) -> String {
    match invalid_mapping_prefix {
        Some(outer) => format!("{outer}:{step}"),
        None => step.to_string()
    }
}
