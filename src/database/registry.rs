
use log::debug;
use simple_error::bail;

use crate::data_types::authority::AuthorityRecord;
use crate::data_types::citation::Citation;
use crate::database::gene_db::GeneDatabase;
use crate::database::schema::DATA_TABLES;

/// Registry bookkeeping: the authority and citation tables assign small
/// integer ids that the data tables reference. Ids are handed out as
/// max(id)+1, starting from 0 on an empty table, so they stay dense and
/// deterministic for a fixed ingestion order.
impl GeneDatabase {
    /// Looks up an authority id by name
    /// # Errors
    /// * if the name is registered more than once, which ingestion never does
    pub fn authority_idx(&self, name: &str) -> Result<Option<i64>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT id FROM authority WHERE name = ?1")?;
        let ids: Vec<i64> = stmt
            .query_map([name], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        match ids.len() {
            0 => Ok(None),
            1 => Ok(Some(ids[0])),
            n => bail!("{n} authority rows match name {name}; the registry is corrupt")
        }
    }

    /// Strict authority lookup by name
    /// # Errors
    /// * if the authority has never been registered
    pub fn require_authority(&self, name: &str) -> Result<i64, Box<dyn std::error::Error>> {
        match self.authority_idx(name)? {
            Some(idx) => Ok(idx),
            None => bail!("authority {name} is not present in this database")
        }
    }

    /// Registers an authority name, returning its id. Idempotent: a name
    /// that is already registered just returns the existing id.
    pub fn insert_authority(&mut self, name: &str) -> Result<i64, Box<dyn std::error::Error>> {
        if let Some(idx) = self.authority_idx(name)? {
            return Ok(idx);
        }
        let idx = self.next_registry_idx("authority")?;
        self.conn.execute(
            "INSERT INTO authority (id, name) VALUES (?1, ?2)",
            rusqlite::params![idx, name]
        )?;
        debug!("Registered authority {name} as {idx}");
        Ok(idx)
    }

    /// Looks up a citation by name, deserializing its stored metadata
    /// # Errors
    /// * if the name is registered more than once, or the metadata is not JSON
    pub fn citation_from_name(&self, name: &str) -> Result<Option<Citation>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT id, metadata FROM citation WHERE name = ?1")?;
        let rows: Vec<(i64, String)> = stmt
            .query_map([name], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        match rows.len() {
            0 => Ok(None),
            1 => {
                let (idx, raw) = rows.into_iter().next().unwrap();
                let metadata: serde_json::Value = serde_json::from_str(&raw)?;
                Ok(Some(Citation { idx, name: name.to_string(), metadata }))
            },
            n => bail!("{n} citation rows match name {name}; the registry is corrupt")
        }
    }

    /// Looks up a citation by its row id; used after bibliography resolution
    /// # Errors
    /// * if the id does not resolve to exactly one row
    pub fn citation_from_idx(&self, idx: i64) -> Result<Citation, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT name, metadata FROM citation WHERE id = ?1")?;
        let rows: Vec<(String, String)> = stmt
            .query_map([idx], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        if rows.len() != 1 {
            bail!("{} citation rows match id {idx}; expected exactly 1", rows.len());
        }
        let (name, raw) = rows.into_iter().next().unwrap();
        let metadata: serde_json::Value = serde_json::from_str(&raw)?;
        Ok(Citation { idx, name, metadata })
    }

    /// Strict citation lookup by name
    /// # Errors
    /// * if the citation has never been registered
    pub fn require_citation(&self, name: &str) -> Result<Citation, Box<dyn std::error::Error>> {
        match self.citation_from_name(name)? {
            Some(citation) => Ok(citation),
            None => bail!("citation {name} is not present in this database")
        }
    }

    /// Registers a citation, storing its metadata as JSON text
    /// # Errors
    /// * if the name is already registered; re-ingestion must go through
    ///   [`GeneDatabase::insert_unique_citation`] with clobbering enabled
    pub fn insert_citation(
        &mut self,
        name: &str,
        metadata: &serde_json::Value
    ) -> Result<i64, Box<dyn std::error::Error>> {
        if self.citation_from_name(name)?.is_some() {
            bail!("citation {name} is already present in this database");
        }
        let idx = self.next_registry_idx("citation")?;
        self.conn.execute(
            "INSERT INTO citation (id, name, metadata) VALUES (?1, ?2, ?3)",
            rusqlite::params![idx, name, serde_json::to_string(metadata)?]
        )?;
        debug!("Registered citation {name} as {idx}");
        Ok(idx)
    }

    /// Registers a citation, optionally replacing an existing one of the same
    /// name. Clobbering deletes the old citation and every data row citing it
    /// before re-registering, so the new id is freshly assigned.
    /// # Arguments
    /// * `name` - the citation name
    /// * `metadata` - free-form provenance, stored as JSON
    /// * `clobber` - whether an existing registration may be replaced
    pub fn insert_unique_citation(
        &mut self,
        name: &str,
        metadata: &serde_json::Value,
        clobber: bool
    ) -> Result<i64, Box<dyn std::error::Error>> {
        if let Some(existing) = self.citation_from_name(name)? {
            if !clobber {
                bail!("citation {name} is already present in this database (pass clobber to replace it)");
            }
            self.delete_citation(existing.idx)?;
        }
        self.insert_citation(name, metadata)
    }

    /// Deletes a citation row and cascades through every data table,
    /// removing the rows that cite it
    pub fn delete_citation(&mut self, citation_idx: i64) -> Result<(), Box<dyn std::error::Error>> {
        let tx = self.conn.transaction()?;
        for table in DATA_TABLES {
            let deleted = tx.execute(
                &format!("DELETE FROM {table} WHERE citation = ?1"),
                [citation_idx]
            )?;
            debug!("Deleted {deleted} rows citing {citation_idx} from {table}");
        }
        tx.execute("DELETE FROM citation WHERE id = ?1", [citation_idx])?;
        tx.commit()?;
        Ok(())
    }

    /// Deletes an authority row and cascades through every data table.
    /// Equivalence rows are removed when the authority appears on either
    /// side, since a one-sided leftover could never be queried coherently.
    pub fn delete_authority(&mut self, authority_idx: i64) -> Result<(), Box<dyn std::error::Error>> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM gene WHERE authority = ?1", [authority_idx])?;
        tx.execute(
            "DELETE FROM gene_equivalence WHERE authority0 = ?1 OR authority1 = ?1",
            [authority_idx]
        )?;
        tx.execute("DELETE FROM gene_ortholog WHERE authority = ?1", [authority_idx])?;
        tx.execute("DELETE FROM authority WHERE id = ?1", [authority_idx])?;
        tx.commit()?;
        Ok(())
    }

    /// Every registered authority, ordered by id
    pub fn list_authorities(&self) -> Result<Vec<AuthorityRecord>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM authority ORDER BY id")?;
        let records = stmt
            .query_map([], |row| Ok(AuthorityRecord { idx: row.get(0)?, name: row.get(1)? }))?
            .collect::<rusqlite::Result<_>>()?;
        Ok(records)
    }

    /// Every registered citation, ordered by id
    pub fn list_citations(&self) -> Result<Vec<Citation>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT id, name, metadata FROM citation ORDER BY id")?;
        let rows: Vec<(i64, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<rusqlite::Result<_>>()?;
        let mut citations = Vec::with_capacity(rows.len());
        for (idx, name, raw) in rows {
            let metadata: serde_json::Value = serde_json::from_str(&raw)?;
            citations.push(Citation { idx, name, metadata });
        }
        Ok(citations)
    }

    /// Next dense id for one of the registry tables
    fn next_registry_idx(&self, table: &str) -> rusqlite::Result<i64> {
        assert!(table == "authority" || table == "citation");
        let max: Option<i64> = self.conn.query_row(
            &format!("SELECT MAX(id) FROM {table}"),
            [],
            |row| row.get(0)
        )?;
        Ok(max.map(|m| m + 1).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::gene_db::{EquivalenceRow, GeneRow};
    use serde_json::json;

    #[test]
    fn test_authority_registration_idempotent() {
        let mut db = GeneDatabase::create_in_memory().unwrap();
        assert_eq!(db.insert_authority("NCBI").unwrap(), 0);
        assert_eq!(db.insert_authority("ENSEMBL").unwrap(), 1);
        assert_eq!(db.insert_authority("NCBI").unwrap(), 0);
        assert_eq!(db.authority_idx("ENSEMBL").unwrap(), Some(1));
        assert_eq!(db.authority_idx("FlyBase").unwrap(), None);
        assert!(db.require_authority("FlyBase").is_err());
    }

    #[test]
    fn test_citation_registration() {
        let mut db = GeneDatabase::create_in_memory().unwrap();
        let metadata = json!({"source": "gene_info.gz", "downloaded": "2026-08-01"});
        let idx = db.insert_citation("NCBI-2026-08", &metadata).unwrap();
        assert_eq!(idx, 0);

        let found = db.require_citation("NCBI-2026-08").unwrap();
        assert_eq!(found.idx, 0);
        assert_eq!(found.metadata, metadata);

        // plain insert refuses duplicates
        assert!(db.insert_citation("NCBI-2026-08", &metadata).is_err());
    }

    #[test]
    fn test_citation_clobber_cascades() {
        let mut db = GeneDatabase::create_in_memory().unwrap();
        let metadata = json!({"source": "orthologs.tsv"});
        let idx = db.insert_citation("orthologs", &metadata).unwrap();
        db.insert_gene_rows(&[GeneRow {
            authority: 0, species_taxon: 9606, id: 1, symbol: None,
            identifier: "NCBIGene:1".to_string(), citation: idx
        }]).unwrap();
        db.insert_ortholog_rows(0, idx, &[(9606, 1, 0)]).unwrap();

        // without clobber this is still an error
        assert!(db.insert_unique_citation("orthologs", &metadata, false).is_err());

        let new_idx = db.insert_unique_citation("orthologs", &metadata, true).unwrap();
        assert_eq!(new_idx, 1);
        assert_eq!(db.table_count("gene").unwrap(), 0);
        assert_eq!(db.table_count("gene_ortholog").unwrap(), 0);
        assert_eq!(db.table_count("citation").unwrap(), 1);
    }

    #[test]
    fn test_delete_authority_either_equivalence_side() {
        let mut db = GeneDatabase::create_in_memory().unwrap();
        let ncbi = db.insert_authority("NCBI").unwrap();
        let ensembl = db.insert_authority("ENSEMBL").unwrap();
        db.insert_equivalence_rows(&[EquivalenceRow {
            species_taxon: 9606,
            authority0: ncbi, gene0: 1,
            authority1: ensembl, gene1: 2,
            citation: 0
        }]).unwrap();
        // symmetric storage: two rows, authority appears on both sides
        assert_eq!(db.table_count("gene_equivalence").unwrap(), 2);

        db.delete_authority(ensembl).unwrap();
        assert_eq!(db.table_count("gene_equivalence").unwrap(), 0);
        assert_eq!(db.authority_idx("ENSEMBL").unwrap(), None);
        assert_eq!(db.authority_idx("NCBI").unwrap(), Some(ncbi));
    }
}
