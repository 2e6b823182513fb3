
use itertools::Itertools;
use rusqlite::types::FromSql;
use rusqlite::{Connection, ToSql};
use rustc_hash::FxHashMap as HashMap;
use simple_error::bail;
use std::hash::Hash;
use std::path::Path;

use crate::data_types::species::Species;
use crate::database::schema;

/// Default number of values bound into one `IN (...)` clause. SQLite caps
/// host parameters well above this; the chunking exists to keep statement
/// preparation cheap and memory flat on large gene lists.
pub const TRANSLATE_CHUNK_SIZE: usize = 500;

/// One gene fact, as handed over by the ingestion side
#[derive(Clone, Debug, PartialEq)]
pub struct GeneRow {
    pub authority: i64,
    pub species_taxon: i64,
    pub id: i64,
    pub symbol: Option<String>,
    pub identifier: String,
    pub citation: i64
}

/// One direct cross-authority equivalence fact. Stored symmetrically; the
/// insert path writes both directions.
#[derive(Clone, Debug, PartialEq)]
pub struct EquivalenceRow {
    pub species_taxon: i64,
    pub authority0: i64,
    pub gene0: i64,
    pub authority1: i64,
    pub gene1: i64,
    pub citation: i64
}

/// The queryable columns of the gene table
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GeneColumn {
    Id,
    Symbol,
    Identifier
}

impl GeneColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneColumn::Id => "id",
            GeneColumn::Symbol => "symbol",
            GeneColumn::Identifier => "identifier"
        }
    }
}

/// The SQLite-backed gene identity store. Owns its connection; write methods
/// take `&mut self` because ingestion assumes a single exclusive session.
pub struct GeneDatabase {
    pub(crate) conn: Connection
}

impl GeneDatabase {
    /// Opens an existing mapper database file
    /// # Arguments
    /// * `path` - the database file, which must already exist
    /// # Errors
    /// * if the path is not a file, or the connection fails
    pub fn open(path: &Path) -> Result<GeneDatabase, Box<dyn std::error::Error>> {
        if !path.is_file() {
            bail!("{} is not a file", path.display());
        }
        let conn = Connection::open(path)?;
        Ok(GeneDatabase { conn })
    }

    /// Creates a new mapper database file with the full schema
    /// # Arguments
    /// * `path` - where to create the database; must not already exist
    /// # Errors
    /// * if the path exists, or schema creation fails
    pub fn create(path: &Path) -> Result<GeneDatabase, Box<dyn std::error::Error>> {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        let conn = Connection::open(path)?;
        schema::create_tables(&conn)?;
        Ok(GeneDatabase { conn })
    }

    /// Creates an in-memory database with the full schema; used by tests
    pub fn create_in_memory() -> Result<GeneDatabase, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        schema::create_tables(&conn)?;
        Ok(GeneDatabase { conn })
    }

    /// Builds the query indexes; call once after all bulk ingestion is done
    pub fn create_indexes(&mut self) -> rusqlite::Result<()> {
        schema::create_indexes(&self.conn)
    }

    /// The timestamp recorded when the database file was created
    /// # Errors
    /// * if the metadata table does not hold exactly one row
    pub fn build_timestamp(&self) -> Result<String, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT timestamp FROM mapper_metadata")?;
        let stamps: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        if stamps.len() != 1 {
            bail!(
                "metadata table had {} rows; expected only 1 (is this a mapper database?)",
                stamps.len()
            );
        }
        Ok(stamps.into_iter().next().unwrap())
    }

    // ------------------------------------------------------------------
    // species
    // ------------------------------------------------------------------

    /// Bulk-inserts `(taxon, name)` species rows; synonyms are just extra rows
    pub fn insert_species_rows(&mut self, rows: &[(i64, String)]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO species (id, name) VALUES (?1, ?2)")?;
            for (taxon, name) in rows {
                stmt.execute(rusqlite::params![taxon, name])?;
            }
        }
        tx.commit()
    }

    /// Resolves a species name to a taxon. Multiple rows for the same name
    /// are tolerated as long as they agree on the taxon.
    /// # Errors
    /// * if the name resolves to more than one distinct taxon
    pub fn species_from_name(&self, name: &str) -> Result<Option<Species>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT id FROM species WHERE name = ?1")?;
        let mut taxa: Vec<i64> = stmt
            .query_map([name], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        taxa.sort_unstable();
        taxa.dedup();

        match taxa.len() {
            0 => Ok(None),
            1 => Ok(Some(Species::new(name.to_string(), taxa[0]))),
            n => bail!("{n} distinct taxa match species name {name}: {taxa:?}")
        }
    }

    /// Resolves a taxon id to a species, using the first recorded name
    pub fn species_from_taxon(&self, taxon: i64) -> Result<Option<Species>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT name FROM species WHERE id = ?1 LIMIT 1")?;
        let name: Option<String> = stmt
            .query_map([taxon], |row| row.get(0))?
            .next()
            .transpose()?;
        Ok(name.map(|n| Species::new(n, taxon)))
    }

    /// Strict species lookup by name
    /// # Errors
    /// * if the name is unknown or ambiguous
    pub fn require_species(&self, name: &str) -> Result<Species, Box<dyn std::error::Error>> {
        match self.species_from_name(name)? {
            Some(species) => Ok(species),
            None => bail!("no species match for {name}")
        }
    }

    /// Resolves a user-supplied species token: a bare integer is treated as a
    /// taxon id, anything else as a name
    pub fn lookup_species(&self, token: &str) -> Result<Species, Box<dyn std::error::Error>> {
        if let Ok(taxon) = token.parse::<i64>() {
            return match self.species_from_taxon(taxon)? {
                Some(species) => Ok(species),
                None => bail!("no species match for taxon {taxon}")
            };
        }
        self.require_species(token)
    }

    // ------------------------------------------------------------------
    // gene facts
    // ------------------------------------------------------------------

    /// Bulk-inserts gene facts. The referenced authority and citation rows
    /// must already exist; there is no foreign-key engine checking this.
    pub fn insert_gene_rows(&mut self, rows: &[GeneRow]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO gene (authority, species_taxon, id, symbol, identifier, citation)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.authority,
                    row.species_taxon,
                    row.id,
                    row.symbol,
                    row.identifier,
                    row.citation
                ])?;
            }
        }
        tx.commit()
    }

    /// Bulk-inserts equivalence facts, writing each one in both directions so
    /// lookups never have to probe the mirrored column order
    pub fn insert_equivalence_rows(&mut self, rows: &[EquivalenceRow]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO gene_equivalence (species_taxon, authority0, gene0, authority1, gene1, citation)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.species_taxon, row.authority0, row.gene0,
                    row.authority1, row.gene1, row.citation
                ])?;
                stmt.execute(rusqlite::params![
                    row.species_taxon, row.authority1, row.gene1,
                    row.authority0, row.gene0, row.citation
                ])?;
            }
        }
        tx.commit()
    }

    // ------------------------------------------------------------------
    // chunked read surface
    // ------------------------------------------------------------------

    /// Translates one gene-table column into another within a single
    /// (citation, authority, species) partition. Every input key appears in
    /// the result, mapped to all matches (possibly none, possibly many).
    /// # Arguments
    /// * `src_col`/`dst_col` - which columns to read from and to
    /// * `src_list` - the values to look up
    /// * `citation_idx`/`authority_idx`/`species_taxon` - the partition
    pub fn translate_gene_column<K, V>(
        &self,
        src_col: GeneColumn,
        dst_col: GeneColumn,
        src_list: &[K],
        citation_idx: i64,
        authority_idx: i64,
        species_taxon: i64
    ) -> rusqlite::Result<HashMap<K, Vec<V>>>
    where
        K: ToSql + FromSql + Clone + Eq + Hash,
        V: FromSql
    {
        let mut results: HashMap<K, Vec<V>> =
            HashMap::with_capacity_and_hasher(src_list.len(), Default::default());
        for key in src_list {
            results.entry(key.clone()).or_default();
        }

        for chunk in src_list.chunks(TRANSLATE_CHUNK_SIZE) {
            let query = format!(
                "SELECT {src}, {dst} FROM gene
                 WHERE citation = ?1 AND authority = ?2 AND species_taxon = ?3
                 AND {src} IN ({placeholders})",
                src = src_col.as_str(),
                dst = dst_col.as_str(),
                placeholders = placeholders(chunk.len(), 4)
            );
            let mut stmt = self.conn.prepare(&query)?;
            let mut params: Vec<&dyn ToSql> = vec![&citation_idx, &authority_idx, &species_taxon];
            for value in chunk {
                params.push(value);
            }
            let mut rows = stmt.query(&params[..])?;
            while let Some(row) = rows.next()? {
                let key: K = row.get(0)?;
                let value: V = row.get(1)?;
                results.entry(key).or_default().push(value);
            }
        }
        Ok(results)
    }

    /// Returns every (species_taxon, authority name) pair the gene table
    /// records for the given identifier strings; the detector's probe query
    pub fn species_and_authority_hits(&self, chunk: &[String]) -> rusqlite::Result<Vec<(i64, String)>> {
        let query = format!(
            "SELECT gene.species_taxon, authority.name
             FROM gene JOIN authority ON authority.id = gene.authority
             WHERE gene.identifier IN ({})",
            placeholders(chunk.len(), 1)
        );
        let mut stmt = self.conn.prepare(&query)?;
        let params: Vec<&dyn ToSql> = chunk.iter().map(|c| c as &dyn ToSql).collect();
        let mut rows = stmt.query(&params[..])?;
        let mut hits = vec![];
        while let Some(row) = rows.next()? {
            hits.push((row.get(0)?, row.get(1)?));
        }
        Ok(hits)
    }

    /// Looks up direct equivalences for `gene_ids` (authority0 side) into the
    /// output authority. Every input id appears in the result.
    pub fn equivalent_gene_ids(
        &self,
        citation_idx: i64,
        input_authority_idx: i64,
        output_authority_idx: i64,
        species_taxon: i64,
        gene_ids: &[i64]
    ) -> rusqlite::Result<HashMap<i64, Vec<i64>>> {
        let mut results: HashMap<i64, Vec<i64>> =
            HashMap::with_capacity_and_hasher(gene_ids.len(), Default::default());
        for id in gene_ids {
            results.entry(*id).or_default();
        }

        for chunk in gene_ids.chunks(TRANSLATE_CHUNK_SIZE) {
            let query = format!(
                "SELECT gene0, gene1 FROM gene_equivalence
                 WHERE citation = ?1 AND authority0 = ?2 AND authority1 = ?3
                 AND species_taxon = ?4 AND gene0 IN ({})",
                placeholders(chunk.len(), 5)
            );
            let mut stmt = self.conn.prepare(&query)?;
            let mut params: Vec<&dyn ToSql> = vec![
                &citation_idx, &input_authority_idx, &output_authority_idx, &species_taxon
            ];
            for id in chunk {
                params.push(id);
            }
            let mut rows = stmt.query(&params[..])?;
            while let Some(row) = rows.next()? {
                let g0: i64 = row.get(0)?;
                let g1: i64 = row.get(1)?;
                results.entry(g0).or_default().push(g1);
            }
        }
        Ok(results)
    }

    /// Returns gene -> ortholog_group for the given genes within one
    /// (authority, citation, species) slice of the ortholog table
    pub fn ortholog_groups_for_genes(
        &self,
        authority_idx: i64,
        citation_idx: i64,
        species_taxon: i64,
        gene_ids: &[i64]
    ) -> rusqlite::Result<HashMap<i64, i64>> {
        let mut groups: HashMap<i64, i64> = Default::default();
        for chunk in gene_ids.chunks(TRANSLATE_CHUNK_SIZE) {
            let query = format!(
                "SELECT gene, ortholog_group FROM gene_ortholog
                 WHERE authority = ?1 AND citation = ?2 AND species = ?3
                 AND gene IN ({})",
                placeholders(chunk.len(), 4)
            );
            let mut stmt = self.conn.prepare(&query)?;
            let mut params: Vec<&dyn ToSql> = vec![&authority_idx, &citation_idx, &species_taxon];
            for id in chunk {
                params.push(id);
            }
            let mut rows = stmt.query(&params[..])?;
            while let Some(row) = rows.next()? {
                groups.insert(row.get(0)?, row.get(1)?);
            }
        }
        Ok(groups)
    }

    /// Returns ortholog_group -> genes at the destination species for the
    /// given group ids; the second half of an ortholog translation
    pub fn genes_in_ortholog_groups(
        &self,
        authority_idx: i64,
        citation_idx: i64,
        species_taxon: i64,
        group_ids: &[i64]
    ) -> rusqlite::Result<HashMap<i64, Vec<i64>>> {
        let mut members: HashMap<i64, Vec<i64>> = Default::default();
        for chunk in group_ids.chunks(TRANSLATE_CHUNK_SIZE) {
            let query = format!(
                "SELECT ortholog_group, gene FROM gene_ortholog
                 WHERE authority = ?1 AND citation = ?2 AND species = ?3
                 AND ortholog_group IN ({})",
                placeholders(chunk.len(), 4)
            );
            let mut stmt = self.conn.prepare(&query)?;
            let mut params: Vec<&dyn ToSql> = vec![&authority_idx, &citation_idx, &species_taxon];
            for id in chunk {
                params.push(id);
            }
            let mut rows = stmt.query(&params[..])?;
            while let Some(row) = rows.next()? {
                let group: i64 = row.get(0)?;
                let gene: i64 = row.get(1)?;
                members.entry(group).or_default().push(gene);
            }
        }
        Ok(members)
    }

    /// Inserts ortholog-group membership rows for one (authority, citation)
    /// ingestion run
    pub fn insert_ortholog_rows(
        &mut self,
        authority_idx: i64,
        citation_idx: i64,
        rows: &[(i64, i64, i64)]
    ) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO gene_ortholog (authority, citation, species, gene, ortholog_group)
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            )?;
            for (species, gene, group) in rows {
                stmt.execute(rusqlite::params![authority_idx, citation_idx, species, gene, group])?;
            }
        }
        tx.commit()
    }

    /// Builds a gene id -> species taxon map from the gene table for one
    /// authority, across all citations
    /// # Errors
    /// * if any gene is assigned to different species across citations,
    ///   which well-formed data cannot produce
    pub fn gene_to_species_map(
        &self,
        authority_idx: i64,
        gene_ids: &[i64]
    ) -> Result<HashMap<i64, i64>, Box<dyn std::error::Error>> {
        let mut gene_to_species: HashMap<i64, i64> = Default::default();
        for chunk in gene_ids.chunks(TRANSLATE_CHUNK_SIZE) {
            let query = format!(
                "SELECT id, species_taxon FROM gene
                 WHERE authority = ?1 AND id IN ({})",
                placeholders(chunk.len(), 2)
            );
            let mut stmt = self.conn.prepare(&query)?;
            let mut params: Vec<&dyn ToSql> = vec![&authority_idx];
            for id in chunk {
                params.push(id);
            }
            let mut rows = stmt.query(&params[..])?;
            while let Some(row) = rows.next()? {
                let gene: i64 = row.get(0)?;
                let taxon: i64 = row.get(1)?;
                if let Some(&previous) = gene_to_species.get(&gene) {
                    if previous != taxon {
                        bail!(
                            "conflicting species taxa ({previous}, {taxon}) for gene id {gene} \
                             under authority {authority_idx}; unclear how to proceed"
                        );
                    }
                }
                gene_to_species.insert(gene, taxon);
            }
        }
        Ok(gene_to_species)
    }

    /// Per-(authority, citation) ortholog partition summary: distinct group
    /// count and total membership rows; used by the stat report
    pub fn ortholog_partition_summary(&self) -> rusqlite::Result<Vec<(String, String, i64, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT authority.name, citation.name,
                    COUNT(DISTINCT gene_ortholog.ortholog_group), COUNT(*)
             FROM gene_ortholog
             JOIN authority ON authority.id = gene_ortholog.authority
             JOIN citation ON citation.id = gene_ortholog.citation
             GROUP BY gene_ortholog.authority, gene_ortholog.citation
             ORDER BY authority.name, citation.name"
        )?;
        let summary = stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(summary)
    }

    /// Number of distinct species taxa in the species table
    pub fn distinct_species_count(&self) -> rusqlite::Result<i64> {
        self.conn.query_row("SELECT COUNT(DISTINCT id) FROM species", [], |row| row.get(0))
    }

    /// Row count for one of the fixed data tables; used by the stat report
    pub fn table_count(&self, table: &str) -> rusqlite::Result<i64> {
        assert!(
            schema::DATA_TABLES.contains(&table)
                || ["authority", "citation", "species"].contains(&table)
        );
        self.conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
    }
}

/// Builds "?4,?5,?6,..." for `count` parameters starting at 1-based `start`
fn placeholders(count: usize, start: usize) -> String {
    (start..start + count).map(|i| format!("?{i}")).join(",")
}
