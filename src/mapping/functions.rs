
use rustc_hash::FxHashMap as HashMap;
use simple_error::bail;

use crate::data_types::authority::{Authority, TokenAuthority};
use crate::data_types::failure_log::FailureLog;
use crate::data_types::metadata::MappingMetadata;
use crate::data_types::species::Species;
use crate::database::gene_db::{GeneColumn, GeneDatabase};
use crate::mapping::placeholder::apply_mapping;

/// A resolved mapping relation plus the provenance record describing the
/// source it came from; no placeholder policy applied yet
#[derive(Clone, Debug)]
pub struct RawMapping {
    pub metadata: MappingMetadata,
    pub mapping: HashMap<String, Vec<String>>
}

/// A mapped gene list with provenance and the per-call failure tally
#[derive(Clone, Debug)]
pub struct MappingResult {
    pub metadata: MappingMetadata,
    pub failure_log: FailureLog,
    pub gene_list: Vec<String>
}

impl RawMapping {
    fn resolve(
        self,
        gene_list: &[String],
        assign_placeholders: bool,
        placeholder_prefix: Option<&str>
    ) -> MappingResult {
        let applied = apply_mapping(gene_list, &self.mapping, assign_placeholders, placeholder_prefix);
        MappingResult {
            metadata: self.metadata,
            failure_log: applied.failure_log,
            gene_list: applied.gene_list
        }
    }
}

/// Finds the relation taking gene symbols to identifiers under one
/// authority for one species. The backing citation is resolved through the
/// bibliography and must carry symbols.
/// # Arguments
/// * `database` - the store to query
/// * `gene_symbol_list` - the input symbols
/// * `species` - the species the symbols belong to
/// * `authority` - the authority whose identifiers we want
/// # Errors
/// * if the authority is unregistered or no single symbol-bearing citation
///   covers this (authority, species) pair
pub fn identifiers_from_symbols_mapping(
    database: &GeneDatabase,
    gene_symbol_list: &[String],
    species: &Species,
    authority: Authority
) -> Result<RawMapping, Box<dyn std::error::Error>> {
    let authority_idx = database.require_authority(&authority.to_string())?;
    let citation_idx = database.citation_from_bibliography(authority_idx, species.taxon, true)?;
    let citation = database.citation_from_idx(citation_idx)?;

    let mapping: HashMap<String, Vec<String>> = database.translate_gene_column(
        GeneColumn::Symbol,
        GeneColumn::Identifier,
        gene_symbol_list,
        citation_idx,
        authority_idx,
        species.taxon
    )?;

    Ok(RawMapping {
        metadata: MappingMetadata::authority_step(
            TokenAuthority::Symbol,
            authority.into(),
            citation.to_provenance()
        ),
        mapping
    })
}

/// Maps gene symbols to identifiers, applying the placeholder policy
pub fn identifiers_from_symbols(
    database: &GeneDatabase,
    gene_symbol_list: &[String],
    species: &Species,
    authority: Authority,
    assign_placeholders: bool,
    placeholder_prefix: Option<&str>
) -> Result<MappingResult, Box<dyn std::error::Error>> {
    let raw = identifiers_from_symbols_mapping(database, gene_symbol_list, species, authority)?;
    Ok(raw.resolve(gene_symbol_list, assign_placeholders, placeholder_prefix))
}

/// Finds the relation taking identifiers of one authority to equivalent
/// identifiers of another within one species, under a named equivalence
/// citation. Input identifiers are first translated to internal gene ids,
/// the equivalence table is consulted, and both sides are converted back to
/// identifiers strictly (a gene id without exactly one identifier is fatal).
/// # Arguments
/// * `database` - the store to query
/// * `input_authority`/`output_authority` - the endpoints
/// * `gene_list` - input identifiers under `input_authority`
/// * `species` - the species being mapped
/// * `citation_name` - the citation backing the equivalence claims
pub fn equivalent_genes_mapping(
    database: &GeneDatabase,
    input_authority: Authority,
    output_authority: Authority,
    gene_list: &[String],
    species: &Species,
    citation_name: &str
) -> Result<RawMapping, Box<dyn std::error::Error>> {
    let input_idx = database.require_authority(&input_authority.to_string())?;
    let output_idx = database.require_authority(&output_authority.to_string())?;
    let citation = database.require_citation(citation_name)?;

    let input_bib = database.citation_from_bibliography(input_idx, species.taxon, false)?;
    let id_translation: HashMap<String, Vec<i64>> = database.translate_gene_column(
        GeneColumn::Identifier,
        GeneColumn::Id,
        gene_list,
        input_bib,
        input_idx,
        species.taxon
    )?;

    let mut input_ids: Vec<i64> = id_translation.values().flatten().copied().collect();
    input_ids.sort_unstable();
    input_ids.dedup();

    let equivalence = database.equivalent_gene_ids(
        citation.idx, input_idx, output_idx, species.taxon, &input_ids
    )?;

    let key_identifiers = strict_identifiers_from_ids(
        database, &input_ids, input_idx, input_bib, species.taxon
    )?;
    let mut output_ids: Vec<i64> = equivalence.values().flatten().copied().collect();
    output_ids.sort_unstable();
    output_ids.dedup();
    let output_bib = database.citation_from_bibliography(output_idx, species.taxon, false)?;
    let value_identifiers = strict_identifiers_from_ids(
        database, &output_ids, output_idx, output_bib, species.taxon
    )?;

    let mut mapping: HashMap<String, Vec<String>> = Default::default();
    for (id, outputs) in &equivalence {
        let key = key_identifiers[id].clone();
        let values: Vec<String> = outputs.iter().map(|o| value_identifiers[o].clone()).collect();
        mapping.insert(key, values);
    }
    for gene in gene_list {
        mapping.entry(gene.clone()).or_default();
    }

    Ok(RawMapping {
        metadata: MappingMetadata::authority_step(
            input_authority.into(),
            output_authority.into(),
            citation.to_provenance()
        ),
        mapping
    })
}

/// Maps identifiers across authorities, applying the placeholder policy
pub fn equivalent_genes(
    database: &GeneDatabase,
    input_authority: Authority,
    output_authority: Authority,
    gene_list: &[String],
    species: &Species,
    citation_name: &str,
    assign_placeholders: bool,
    placeholder_prefix: Option<&str>
) -> Result<MappingResult, Box<dyn std::error::Error>> {
    let raw = equivalent_genes_mapping(
        database, input_authority, output_authority, gene_list, species, citation_name
    )?;
    Ok(raw.resolve(gene_list, assign_placeholders, placeholder_prefix))
}

/// Finds the relation taking identifiers at one species to the identifiers
/// of every gene sharing an ortholog group at another species, within one
/// authority and one ortholog citation.
/// # Arguments
/// * `database` - the store to query
/// * `authority` - the authority the identifiers live under
/// * `src_species`/`dst_species` - the species endpoints
/// * `gene_list` - input identifiers at `src_species`
/// * `citation_name` - the citation backing the ortholog groups
pub fn ortholog_genes_mapping(
    database: &GeneDatabase,
    authority: Authority,
    src_species: &Species,
    dst_species: &Species,
    gene_list: &[String],
    citation_name: &str
) -> Result<RawMapping, Box<dyn std::error::Error>> {
    let authority_idx = database.require_authority(&authority.to_string())?;
    let citation = database.require_citation(citation_name)?;

    let src_bib = database.citation_from_bibliography(authority_idx, src_species.taxon, false)?;
    let id_translation: HashMap<String, Vec<i64>> = database.translate_gene_column(
        GeneColumn::Identifier,
        GeneColumn::Id,
        gene_list,
        src_bib,
        authority_idx,
        src_species.taxon
    )?;

    let mut src_ids: Vec<i64> = id_translation.values().flatten().copied().collect();
    src_ids.sort_unstable();
    src_ids.dedup();

    let group_lookup = database.ortholog_groups_for_genes(
        authority_idx, citation.idx, src_species.taxon, &src_ids
    )?;
    let mut group_ids: Vec<i64> = group_lookup.values().copied().collect();
    group_ids.sort_unstable();
    group_ids.dedup();
    let group_members = database.genes_in_ortholog_groups(
        authority_idx, citation.idx, dst_species.taxon, &group_ids
    )?;

    let mut id_mapping: HashMap<i64, Vec<i64>> = Default::default();
    for src_id in &src_ids {
        let orthologs = group_lookup
            .get(src_id)
            .and_then(|group| group_members.get(group))
            .cloned()
            .unwrap_or_default();
        id_mapping.insert(*src_id, orthologs);
    }

    let key_identifiers = strict_identifiers_from_ids(
        database, &src_ids, authority_idx, src_bib, src_species.taxon
    )?;
    let mut dst_ids: Vec<i64> = id_mapping.values().flatten().copied().collect();
    dst_ids.sort_unstable();
    dst_ids.dedup();
    let dst_bib = database.citation_from_bibliography(authority_idx, dst_species.taxon, false)?;
    let value_identifiers = strict_identifiers_from_ids(
        database, &dst_ids, authority_idx, dst_bib, dst_species.taxon
    )?;

    let mut mapping: HashMap<String, Vec<String>> = Default::default();
    for (src_id, orthologs) in &id_mapping {
        let key = key_identifiers[src_id].clone();
        let values: Vec<String> = orthologs.iter().map(|o| value_identifiers[o].clone()).collect();
        mapping.insert(key, values);
    }
    for gene in gene_list {
        mapping.entry(gene.clone()).or_default();
    }

    Ok(RawMapping {
        metadata: MappingMetadata::species_step(
            src_species.clone(),
            dst_species.clone(),
            citation.to_provenance()
        ),
        mapping
    })
}

/// Maps identifiers across species via ortholog groups, applying the
/// placeholder policy
pub fn ortholog_genes(
    database: &GeneDatabase,
    authority: Authority,
    src_species: &Species,
    dst_species: &Species,
    gene_list: &[String],
    citation_name: &str,
    assign_placeholders: bool,
    placeholder_prefix: Option<&str>
) -> Result<MappingResult, Box<dyn std::error::Error>> {
    let raw = ortholog_genes_mapping(
        database, authority, src_species, dst_species, gene_list, citation_name
    )?;
    Ok(raw.resolve(gene_list, assign_placeholders, placeholder_prefix))
}

/// Converts internal gene ids to identifiers, demanding a 1:1 answer for
/// every id. Offenders are aggregated into one error message so a caller
/// sees the full extent of the problem at once.
fn strict_identifiers_from_ids(
    database: &GeneDatabase,
    ids: &[i64],
    authority_idx: i64,
    citation_idx: i64,
    species_taxon: i64
) -> Result<HashMap<i64, String>, Box<dyn std::error::Error>> {
    let mapping: HashMap<i64, Vec<String>> = database.translate_gene_column(
        GeneColumn::Id,
        GeneColumn::Identifier,
        ids,
        citation_idx,
        authority_idx,
        species_taxon
    )?;

    let mut errors = String::new();
    let mut results: HashMap<i64, String> =
        HashMap::with_capacity_and_hasher(ids.len(), Default::default());
    for id in ids {
        let identifiers = &mapping[id];
        if identifiers.len() == 1 {
            results.insert(*id, identifiers[0].clone());
        } else {
            errors += &format!(
                "id: {id} authority: {authority_idx} species: {species_taxon} n: {}\n",
                identifiers.len()
            );
        }
    }
    if !errors.is_empty() {
        bail!("gene ids did not map 1:1 to identifiers:\n{errors}");
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::metadata::{MappingAxis, MappingEndpoint};
    use crate::database::gene_db::{EquivalenceRow, GeneRow};
    use serde_json::json;

    fn to_strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    /// human and mouse NCBI genes, human ENSEMBL genes, one citation ("NCBI")
    /// backing everything, equivalences within human, one ortholog group per
    /// (human, mouse) gene pair
    fn fixture_database() -> GeneDatabase {
        let mut database = GeneDatabase::create_in_memory().unwrap();
        database.insert_authority("NCBI").unwrap();
        database.insert_authority("ENSEMBL").unwrap();
        database.insert_citation("NCBI", &json!({"source": "gene_info"})).unwrap();
        database.insert_species_rows(&[
            (9606, "human".to_string()),
            (10090, "mouse".to_string())
        ]).unwrap();

        let mut gene_rows: Vec<GeneRow> = vec![];
        for id in 1..=4_i64 {
            gene_rows.push(GeneRow {
                authority: 0, species_taxon: 9606, id,
                symbol: Some(format!("alpha{id}")),
                identifier: format!("NCBIGene:{id}"), citation: 0
            });
            gene_rows.push(GeneRow {
                authority: 1, species_taxon: 9606, id: 100 + id,
                symbol: Some(format!("alpha{id}")),
                identifier: format!("ENSG{id}"), citation: 0
            });
            gene_rows.push(GeneRow {
                authority: 0, species_taxon: 10090, id: 10 + id,
                symbol: None,
                identifier: format!("NCBIGene:{}", 10 + id), citation: 0
            });
        }
        database.insert_gene_rows(&gene_rows).unwrap();

        let equivalence_rows: Vec<EquivalenceRow> = (1..=4_i64).map(|id| EquivalenceRow {
            species_taxon: 9606,
            authority0: 0, gene0: id,
            authority1: 1, gene1: 100 + id,
            citation: 0
        }).collect();
        database.insert_equivalence_rows(&equivalence_rows).unwrap();

        let ortholog_rows: Vec<(i64, i64, i64)> = (1..=4_i64)
            .flat_map(|id| [(9606, id, id), (10090, 10 + id, id)])
            .collect();
        database.insert_ortholog_rows(0, 0, &ortholog_rows).unwrap();

        database.rebuild_bibliography().unwrap();
        database
    }

    fn human() -> Species {
        Species::new("human".to_string(), 9606)
    }

    fn mouse() -> Species {
        Species::new("mouse".to_string(), 10090)
    }

    #[test]
    fn test_identifiers_from_symbols() {
        let database = fixture_database();
        let symbols = to_strings(&["alpha1", "alpha3", "nonsense"]);
        let result = identifiers_from_symbols(
            &database, &symbols, &human(), Authority::Ncbi, true, None
        ).unwrap();

        assert_eq!(result.gene_list, to_strings(&[
            "NCBIGene:1", "NCBIGene:3", "UNMAPPABLE_NO_MATCH_0"
        ]));
        assert_eq!(result.failure_log.zero_matches, 1);
        assert_eq!(result.metadata.mapping.axis, MappingAxis::Authority);
        assert_eq!(
            result.metadata.mapping.from,
            MappingEndpoint::Authority(TokenAuthority::Symbol)
        );
        assert_eq!(result.metadata.citation["name"], "NCBI");
    }

    #[test]
    fn test_symbols_need_symbol_bearing_citation() {
        let database = fixture_database();
        // mouse NCBI facts carry no symbols; the bibliography refuses
        let symbols = to_strings(&["alpha1"]);
        let result = identifiers_from_symbols(
            &database, &symbols, &mouse(), Authority::Ncbi, true, None
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_equivalent_genes() {
        let database = fixture_database();
        let gene_list = to_strings(&["NCBIGene:2", "NCBIGene:4", "NCBIGene:77"]);
        let result = equivalent_genes(
            &database, Authority::Ncbi, Authority::Ensembl,
            &gene_list, &human(), "NCBI", true, Some("NCBI:ENSEMBL")
        ).unwrap();

        assert_eq!(result.gene_list, to_strings(&[
            "ENSG2", "ENSG4", "NCBI:ENSEMBL:UNMAPPABLE_NO_MATCH_0"
        ]));
        assert_eq!(
            result.metadata.mapping.to,
            MappingEndpoint::Authority(TokenAuthority::Ensembl)
        );
    }

    #[test]
    fn test_equivalent_genes_reverse_direction() {
        let database = fixture_database();
        let gene_list = to_strings(&["ENSG1"]);
        let result = equivalent_genes(
            &database, Authority::Ensembl, Authority::Ncbi,
            &gene_list, &human(), "NCBI", true, None
        ).unwrap();
        assert_eq!(result.gene_list, to_strings(&["NCBIGene:1"]));
    }

    #[test]
    fn test_ortholog_genes() {
        let database = fixture_database();
        let gene_list = to_strings(&["NCBIGene:1", "NCBIGene:4", "NCBIGene:77"]);
        let result = ortholog_genes(
            &database, Authority::Ncbi, &human(), &mouse(),
            &gene_list, "NCBI", true, Some("ortholog")
        ).unwrap();

        assert_eq!(result.gene_list, to_strings(&[
            "NCBIGene:11", "NCBIGene:14", "ortholog:UNMAPPABLE_NO_MATCH_0"
        ]));
        assert_eq!(result.metadata.mapping.axis, MappingAxis::Species);
        assert_eq!(
            result.metadata.mapping.from,
            MappingEndpoint::Species(human())
        );
    }

    #[test]
    fn test_unknown_citation_is_fatal() {
        let database = fixture_database();
        let gene_list = to_strings(&["NCBIGene:1"]);
        let result = ortholog_genes(
            &database, Authority::Ncbi, &human(), &mouse(),
            &gene_list, "GARBAGE", true, None
        );
        assert!(result.unwrap_err().to_string().contains("GARBAGE"));
    }
}
