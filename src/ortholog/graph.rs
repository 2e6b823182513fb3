
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use simple_error::bail;

/// Undirected adjacency structure over the "declared ortholog of" relation.
/// The traversal consumes the structure in place: nodes are popped as they are
/// absorbed into a component, so the map shrinks monotonically and peak memory
/// is bounded by a single copy of the adjacency data. That matters on the
/// multi-million-edge NCBI ortholog file, where a second copy does not fit
/// comfortably alongside the first.
#[derive(Debug, Default)]
pub struct OrthologGraph {
    /// gene -> set of directly linked genes; every pair is entered both ways
    adjacency: HashMap<i64, HashSet<i64>>,
    /// node ids in first-seen order; the deterministic fallback when picking
    /// the root of the next component
    insertion_order: Vec<i64>
}

impl OrthologGraph {
    /// Builds the bi-directional graph from two parallel gene lists where
    /// `gene0[i]` is declared an ortholog of `gene1[i]`. Self-pairs carry no
    /// connectivity information and must be filtered by the caller.
    /// # Arguments
    /// * `gene0_list` - left side of each declared pair
    /// * `gene1_list` - right side of each declared pair
    /// # Errors
    /// * if the two lists differ in length
    pub fn from_pairs(gene0_list: &[i64], gene1_list: &[i64]) -> Result<OrthologGraph, Box<dyn std::error::Error>> {
        if gene0_list.len() != gene1_list.len() {
            bail!(
                "gene0_list has {} elements; gene1_list has {} elements; these must be the same size",
                gene0_list.len(), gene1_list.len()
            );
        }

        let mut graph = OrthologGraph::default();
        for (&g0, &g1) in gene0_list.iter().zip(gene1_list.iter()) {
            graph.add_node(g0).insert(g1);
            graph.add_node(g1).insert(g0);
        }
        Ok(graph)
    }

    /// Returns the neighbor set for `gene`, creating an empty one (and
    /// recording first-seen order) if the node is new
    fn add_node(&mut self, gene: i64) -> &mut HashSet<i64> {
        if !self.adjacency.contains_key(&gene) {
            self.insertion_order.push(gene);
        }
        self.adjacency.entry(gene).or_default()
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    #[cfg(test)]
    pub fn neighbors(&self, gene: i64) -> Option<&HashSet<i64>> {
        self.adjacency.get(&gene)
    }

    /// Partitions the graph into connected components, consuming it.
    /// Components are numbered 0, 1, 2, ... in discovery order, so the
    /// numbering is deterministic for a fixed input order and root list.
    ///
    /// `root_gene_list` is an optional list of probably-high-degree seeds;
    /// they are visited in descending pre-traversal degree so that the big
    /// components are discovered, and their memory reclaimed, early. Roots
    /// already absorbed into an earlier component are skipped, and once the
    /// roots are exhausted the first remaining node in insertion order is
    /// used instead.
    /// # Arguments
    /// * `root_gene_list` - optional prioritized seed nodes
    pub fn assign_groups(mut self, root_gene_list: Option<&[i64]>) -> HashMap<i64, u32> {
        // degree-sorted copy of the seeds: ascending stable sort, then
        // reversed, so the highest-degree seed floods first and ties are
        // visited in reverse input order. Group numbering depends on this.
        let mut roots: Vec<i64> = root_gene_list.unwrap_or(&[]).to_vec();
        roots.sort_by_key(|g| self.adjacency.get(g).map(|n| n.len()).unwrap_or(0));
        roots.reverse();
        let mut root_iter = roots.into_iter();

        let mut group_lookup: HashMap<i64, u32> =
            HashMap::with_capacity_and_hasher(self.adjacency.len(), Default::default());
        let mut group_idx: u32 = 0;
        // cursor into insertion_order for the fallback scan; never rewinds,
        // so the whole partition stays O(V+E)
        let mut fallback_cursor: usize = 0;

        while !self.adjacency.is_empty() {
            let root = match self.next_root(&mut root_iter, &mut fallback_cursor) {
                Some(r) => r,
                None => break
            };

            // breadth-first flood from the root, popping nodes as they are absorbed
            let mut queue: std::collections::VecDeque<i64> = std::collections::VecDeque::new();
            queue.push_back(root);
            while let Some(gene) = queue.pop_front() {
                if let Some(neighbors) = self.adjacency.remove(&gene) {
                    group_lookup.insert(gene, group_idx);
                    for neighbor in neighbors {
                        if self.adjacency.contains_key(&neighbor) {
                            queue.push_back(neighbor);
                        }
                    }
                }
            }
            group_idx += 1;
        }
        group_lookup
    }

    /// Picks the next component root: unabsorbed seeds first, then the first
    /// remaining node in insertion order
    fn next_root(
        &self,
        root_iter: &mut impl Iterator<Item = i64>,
        fallback_cursor: &mut usize
    ) -> Option<i64> {
        for root in root_iter.by_ref() {
            if self.adjacency.contains_key(&root) {
                return Some(root);
            }
        }
        while *fallback_cursor < self.insertion_order.len() {
            let candidate = self.insertion_order[*fallback_cursor];
            *fallback_cursor += 1;
            if self.adjacency.contains_key(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Assigns every gene mentioned in the (self-pair filtered) input to an
/// ortholog group id such that two genes share an id iff they are connected,
/// directly or transitively, by the declared pairs. The left-hand genes are
/// used as traversal seeds. Genes appearing only as self-pairs are dropped.
/// # Arguments
/// * `gene0_list` - left side of each declared pair
/// * `gene1_list` - right side of each declared pair
/// # Errors
/// * if the two lists differ in length
pub fn assign_ortholog_group(gene0_list: &[i64], gene1_list: &[i64]) -> Result<HashMap<i64, u32>, Box<dyn std::error::Error>> {
    if gene0_list.len() != gene1_list.len() {
        bail!(
            "gene0_list has {} elements; gene1_list has {} elements; these must be the same size",
            gene0_list.len(), gene1_list.len()
        );
    }

    let mut g0_filtered: Vec<i64> = Vec::with_capacity(gene0_list.len());
    let mut g1_filtered: Vec<i64> = Vec::with_capacity(gene1_list.len());
    for (&g0, &g1) in gene0_list.iter().zip(gene1_list.iter()) {
        if g0 != g1 {
            g0_filtered.push(g0);
            g1_filtered.push(g1);
        }
    }

    let graph = OrthologGraph::from_pairs(&g0_filtered, &g1_filtered)?;
    Ok(graph.assign_groups(Some(&g0_filtered)))
}
