
use log::debug;
use simple_error::bail;

use crate::database::gene_db::GeneDatabase;

/// The species bibliography: a derived summary of which citations carry gene
/// facts for each (authority, species) pair, and whether those facts include
/// symbols. Mapping uses it to resolve which citation backs a translation
/// without the caller naming one.
impl GeneDatabase {
    /// Rebuilds the bibliography from the gene table; call after ingestion
    pub fn rebuild_bibliography(&mut self) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM species_bibliography", [])?;
        let inserted = tx.execute(
            "INSERT INTO species_bibliography (authority, species_taxon, citation, has_symbols)
             SELECT authority, species_taxon, citation, MAX(symbol IS NOT NULL)
             FROM gene
             GROUP BY authority, species_taxon, citation",
            []
        )?;
        tx.commit()?;
        debug!("Rebuilt species bibliography with {inserted} entries");
        Ok(())
    }

    /// Resolves the single citation backing gene facts for an (authority,
    /// species) pair. Symbol translations additionally require the facts to
    /// carry symbols, since a symbol-free citation cannot answer them.
    /// # Arguments
    /// * `authority_idx` - the authority to translate under
    /// * `species_taxon` - the species being mapped
    /// * `require_symbols` - whether the citation must carry gene symbols
    /// # Errors
    /// * if no citation, or more than one, matches; mapping refuses to guess
    ///   between sources
    pub fn citation_from_bibliography(
        &self,
        authority_idx: i64,
        species_taxon: i64,
        require_symbols: bool
    ) -> Result<i64, Box<dyn std::error::Error>> {
        let query = if require_symbols {
            "SELECT DISTINCT citation FROM species_bibliography
             WHERE authority = ?1 AND species_taxon = ?2 AND has_symbols = 1"
        } else {
            "SELECT DISTINCT citation FROM species_bibliography
             WHERE authority = ?1 AND species_taxon = ?2"
        };
        let mut stmt = self.conn.prepare(query)?;
        let citations: Vec<i64> = stmt
            .query_map([authority_idx, species_taxon], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        match citations.len() {
            0 => bail!(
                "no citation provides gene data for authority {authority_idx}, \
                 species taxon {species_taxon} (require_symbols={require_symbols})"
            ),
            1 => Ok(citations[0]),
            n => bail!(
                "{n} citations provide gene data for authority {authority_idx}, \
                 species taxon {species_taxon}; cannot pick one"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::gene_db::GeneRow;

    fn gene_row(authority: i64, taxon: i64, id: i64, symbol: Option<&str>, citation: i64) -> GeneRow {
        GeneRow {
            authority,
            species_taxon: taxon,
            id,
            symbol: symbol.map(String::from),
            identifier: format!("NCBIGene:{id}"),
            citation
        }
    }

    #[test]
    fn test_bibliography_resolution() {
        let mut db = GeneDatabase::create_in_memory().unwrap();
        db.insert_gene_rows(&[
            gene_row(0, 9606, 1, Some("Gad1"), 0),
            gene_row(0, 9606, 2, Some("Gad2"), 0),
            // identifier-only facts for mouse under a different citation
            gene_row(0, 10090, 3, None, 1)
        ]).unwrap();
        db.rebuild_bibliography().unwrap();

        assert_eq!(db.citation_from_bibliography(0, 9606, true).unwrap(), 0);
        assert_eq!(db.citation_from_bibliography(0, 10090, false).unwrap(), 1);
        // mouse facts carry no symbols, so a symbol translation cannot use them
        assert!(db.citation_from_bibliography(0, 10090, true).is_err());
        // unknown species
        assert!(db.citation_from_bibliography(0, 7227, false).is_err());
    }

    #[test]
    fn test_bibliography_ambiguity_is_fatal() {
        let mut db = GeneDatabase::create_in_memory().unwrap();
        db.insert_gene_rows(&[
            gene_row(0, 9606, 1, Some("Gad1"), 0),
            gene_row(0, 9606, 1, Some("Gad1"), 1)
        ]).unwrap();
        db.rebuild_bibliography().unwrap();
        assert!(db.citation_from_bibliography(0, 9606, true).is_err());
    }

    #[test]
    fn test_rebuild_replaces_stale_entries() {
        let mut db = GeneDatabase::create_in_memory().unwrap();
        db.insert_gene_rows(&[gene_row(0, 9606, 1, None, 0)]).unwrap();
        db.rebuild_bibliography().unwrap();
        assert_eq!(db.citation_from_bibliography(0, 9606, false).unwrap(), 0);

        db.delete_citation(0).unwrap();
        db.rebuild_bibliography().unwrap();
        assert!(db.citation_from_bibliography(0, 9606, false).is_err());
    }
}
