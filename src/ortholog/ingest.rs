
use log::{info, warn};
use rustc_hash::FxHashMap as HashMap;
use simple_error::bail;

use crate::database::gene_db::GeneDatabase;
use crate::ortholog::graph::assign_ortholog_group;

/// Writes ortholog group membership rows for an already-resolved citation and
/// authority, given an explicit gene -> species lookup. Genes with no species
/// entry are logged and excluded; the remaining rows are inserted in gene-id
/// order so repeated ingestions produce byte-identical tables.
/// # Arguments
/// * `database` - the store to write to
/// * `gene0_list`/`gene1_list` - the declared ortholog pairs
/// * `gene_to_species` - species taxon for each gene id
/// * `citation_idx`/`authority_idx` - the registry rows backing these facts
/// # Errors
/// * if the pair lists differ in length, or the inserts fail
pub fn ingest_orthologs_with_species(
    database: &mut GeneDatabase,
    gene0_list: &[i64],
    gene1_list: &[i64],
    gene_to_species: &HashMap<i64, i64>,
    citation_idx: i64,
    authority_idx: i64
) -> Result<(), Box<dyn std::error::Error>> {
    let group_lookup = assign_ortholog_group(gene0_list, gene1_list)?;

    let mut genes: Vec<i64> = group_lookup.keys().copied().collect();
    genes.sort_unstable();

    let mut rows: Vec<(i64, i64, i64)> = Vec::with_capacity(genes.len());
    let mut missing_species: Vec<i64> = vec![];
    for gene in genes {
        match gene_to_species.get(&gene) {
            Some(&species) => rows.push((species, gene, i64::from(group_lookup[&gene]))),
            None => missing_species.push(gene)
        }
    }

    if !missing_species.is_empty() {
        warn!(
            "The following genes had no species and were excluded from ortholog ingestion: {missing_species:?}"
        );
    }

    database.insert_ortholog_rows(authority_idx, citation_idx, &rows)?;
    info!("Ingested {} ortholog group memberships", rows.len());
    Ok(())
}

/// Ingests declared ortholog pairs under a new citation, looking up each
/// gene's species from the gene table of the given authority.
/// # Arguments
/// * `database` - the store to write to
/// * `gene0_list`/`gene1_list` - the declared ortholog pairs
/// * `citation_name` - name for the new citation
/// * `citation_metadata` - provenance stored with the citation
/// * `gene_authority` - name of the authority whose gene table provides species
/// * `clobber` - whether an existing citation of this name may be replaced
/// # Errors
/// * if the pair lists differ in length, the authority is unknown, or the
///   citation already exists without clobbering
pub fn ingest_orthologs(
    database: &mut GeneDatabase,
    gene0_list: &[i64],
    gene1_list: &[i64],
    citation_name: &str,
    citation_metadata: &serde_json::Value,
    gene_authority: &str,
    clobber: bool
) -> Result<(), Box<dyn std::error::Error>> {
    if gene0_list.len() != gene1_list.len() {
        bail!(
            "length of gene lists does not match ({} vs {})",
            gene0_list.len(), gene1_list.len()
        );
    }
    let authority_idx = database.require_authority(gene_authority)?;

    let mut all_genes: Vec<i64> = gene0_list.iter().chain(gene1_list.iter()).copied().collect();
    all_genes.sort_unstable();
    all_genes.dedup();
    let gene_to_species = database.gene_to_species_map(authority_idx, &all_genes)?;

    let citation_idx = database.insert_unique_citation(citation_name, citation_metadata, clobber)?;
    info!(
        "Ingesting {} declared ortholog pairs under citation {citation_name}",
        gene0_list.len()
    );
    ingest_orthologs_with_species(
        database, gene0_list, gene1_list, &gene_to_species, citation_idx, authority_idx
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::gene_db::GeneRow;
    use serde_json::json;

    fn ortholog_table(database: &GeneDatabase) -> Vec<(i64, i64, i64, i64, i64)> {
        let mut stmt = database.conn.prepare(
            "SELECT authority, citation, species, gene, ortholog_group
             FROM gene_ortholog ORDER BY gene"
        ).unwrap();
        stmt.query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        }).unwrap().collect::<rusqlite::Result<_>>().unwrap()
    }

    #[test]
    fn test_ingest_with_species_lookup() {
        // even genes all connect to each other, as do odd genes
        let gene0_list: Vec<i64> = vec![0, 0, 0, 1, 2, 2, 3, 3];
        let gene1_list: Vec<i64> = vec![2, 4, 6, 5, 4, 8, 1, 7];
        let gene_to_species: HashMap<i64, i64> = (0..9).map(|ii| (ii, ii + 4)).collect();

        let mut database = GeneDatabase::create_in_memory().unwrap();
        ingest_orthologs_with_species(
            &mut database, &gene0_list, &gene1_list, &gene_to_species, 99, 999
        ).unwrap();

        let expected = vec![
            (999, 99, 4, 0, 0),
            (999, 99, 5, 1, 1),
            (999, 99, 6, 2, 0),
            (999, 99, 7, 3, 1),
            (999, 99, 8, 4, 0),
            (999, 99, 9, 5, 1),
            (999, 99, 10, 6, 0),
            (999, 99, 11, 7, 1),
            (999, 99, 12, 8, 0)
        ];
        assert_eq!(ortholog_table(&database), expected);
    }

    #[test]
    fn test_ingest_excludes_genes_without_species() {
        let gene0_list: Vec<i64> = vec![0, 0, 0, 1, 2, 2, 3, 3, 24];
        let gene1_list: Vec<i64> = vec![2, 4, 6, 5, 4, 8, 1, 7, 27];
        let gene_to_species: HashMap<i64, i64> = (0..9).map(|ii| (ii, ii + 4)).collect();

        let mut database = GeneDatabase::create_in_memory().unwrap();
        ingest_orthologs_with_species(
            &mut database, &gene0_list, &gene1_list, &gene_to_species, 99, 999
        ).unwrap();

        // 24 and 27 have no species and are dropped; everything else survives
        let rows = ortholog_table(&database);
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|row| row.3 < 24));
    }

    fn populated_database() -> GeneDatabase {
        let mut database = GeneDatabase::create_in_memory().unwrap();
        // pad the registries so the test ids are non-trivial
        for ii in 0..5 {
            database.insert_authority(&format!("FAKE{ii}")).unwrap();
        }
        for ii in 0..2 {
            database.insert_citation(&format!("FAKE_CITATION{ii}"), &json!({"okay": "fine"})).unwrap();
        }
        let authority_idx = database.insert_authority("FIAT").unwrap();
        assert_eq!(authority_idx, 5);

        let rows: Vec<GeneRow> = (0..12).map(|gene_id| GeneRow {
            authority: authority_idx,
            species_taxon: gene_id / 3,
            id: gene_id,
            symbol: Some(format!("symbol{gene_id}")),
            identifier: format!("identifier:{gene_id}"),
            citation: 0
        }).collect();
        database.insert_gene_rows(&rows).unwrap();
        database
    }

    #[test]
    fn test_ingest_creating_citation() {
        let mut database = populated_database();
        let gene0_list: Vec<i64> = vec![4, 4, 5, 5, 7, 3];
        let gene1_list: Vec<i64> = vec![0, 11, 1, 7, 10, 6];

        ingest_orthologs(
            &mut database,
            &gene0_list,
            &gene1_list,
            "CITE",
            &json!({"some": "metadata"}),
            "FIAT",
            false
        ).unwrap();

        let expected = vec![
            (5, 2, 0, 0, 1),
            (5, 2, 0, 1, 0),
            (5, 2, 1, 3, 2),
            (5, 2, 1, 4, 1),
            (5, 2, 1, 5, 0),
            (5, 2, 2, 6, 2),
            (5, 2, 2, 7, 0),
            (5, 2, 3, 10, 0),
            (5, 2, 3, 11, 1)
        ];
        assert_eq!(ortholog_table(&database), expected);
    }

    #[test]
    fn test_ingest_errors() {
        let mut database = populated_database();
        let gene0_list: Vec<i64> = vec![4, 4, 5, 5, 7, 3];
        let gene1_list: Vec<i64> = vec![0, 11, 1, 7, 10, 6];

        let result = ingest_orthologs(
            &mut database, &gene0_list, &gene1_list,
            "CITE", &json!({}), "GARBAGE", false
        );
        assert!(result.unwrap_err().to_string().contains("GARBAGE"));

        let result = ingest_orthologs(
            &mut database, &[1, 2, 3], &gene1_list,
            "CITE", &json!({}), "FIAT", false
        );
        assert!(result.unwrap_err().to_string().contains("does not match"));
    }
}
