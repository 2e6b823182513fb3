
use lazy_static::lazy_static;
use regex::Regex;
use rustc_hash::FxHashMap as HashMap;
use std::collections::BTreeMap;

use crate::data_types::failure_log::FailureLog;

lazy_static! {
    /// matches previously assigned degenerate placeholders so repeated
    /// masking passes never reuse an index
    static ref DEGENERATE_LABEL_REGEX: Regex = Regex::new("(UNMAPPABLE_DEGENERATE_)([0-9]+)").unwrap();
}

/// The result of resolving a mapping over an ordered gene list: an output
/// list of the same length plus the tally of genes that failed to map 1:1
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedMapping {
    pub gene_list: Vec<String>,
    pub failure_log: FailureLog
}

/// Applies a `{input -> [outputs]}` relation to an ordered gene list,
/// keeping only 1:1 matches. Inputs with zero or many matches get
/// deterministic placeholder names (or pass through unchanged when
/// placeholders are disabled); inputs that already carry an UNMAPPABLE
/// marker are never re-wrapped, though their counter still advances.
/// Distinct inputs claiming the same 1:1 output are then masked as
/// degenerate.
/// # Arguments
/// * `gene_list` - the ordered inputs
/// * `mapping` - candidate outputs per input; absent keys count as zero
/// * `assign_placeholders` - whether failed genes get placeholder names
/// * `placeholder_prefix` - optional prefix marking where in a multi-step
///   mapping the failure happened
pub fn apply_mapping(
    gene_list: &[String],
    mapping: &HashMap<String, Vec<String>>,
    assign_placeholders: bool,
    placeholder_prefix: Option<&str>
) -> AppliedMapping {
    let mut failure_log = FailureLog::default();
    let empty: Vec<String> = vec![];

    let mut new_gene_list: Vec<String> = Vec::with_capacity(gene_list.len());
    for gene in gene_list {
        let matches = mapping.get(gene).unwrap_or(&empty);
        let assigned = if matches.len() == 1 {
            matches[0].clone()
        } else if matches.is_empty() {
            let count = failure_log.zero_matches;
            failure_log.zero_matches += 1;
            if assign_placeholders && !gene.contains("UNMAPPABLE") {
                match placeholder_prefix {
                    Some(prefix) => format!("{prefix}:UNMAPPABLE_NO_MATCH_{count}"),
                    None => format!("UNMAPPABLE_NO_MATCH_{count}")
                }
            } else {
                gene.clone()
            }
        } else {
            let count = failure_log.many_matches;
            failure_log.many_matches += 1;
            if assign_placeholders && !gene.contains("UNMAPPABLE") {
                match placeholder_prefix {
                    Some(prefix) => format!("{prefix}:UNMAPPABLE_MANY_MATCHES_{count}"),
                    None => format!("UNMAPPABLE_MANY_MATCHES_{count}")
                }
            } else {
                gene.clone()
            }
        };
        new_gene_list.push(assigned);
    }

    let (new_gene_list, n_degenerate) = mask_degenerate_genes(&new_gene_list, placeholder_prefix);
    failure_log.degenerate_matches = n_degenerate;

    AppliedMapping {
        gene_list: new_gene_list,
        failure_log
    }
}

/// Replaces every occurrence of a repeated value in `gene_list` with a
/// unique degenerate placeholder. Two distinct inputs resolving to the same
/// output is presumed ambiguous provenance, so both claimants lose their
/// match. Collided values are indexed in sorted order, offset past any
/// degenerate labels already present in the list; each occurrence of a value
/// gets its own trailing counter. Returns the masked list and the reported
/// degenerate count (twice the number of distinct collided values).
/// # Arguments
/// * `gene_list` - the candidate output list
/// * `placeholder_prefix` - optional prefix for the placeholder names
pub fn mask_degenerate_genes(
    gene_list: &[String],
    placeholder_prefix: Option<&str>
) -> (Vec<String>, usize) {
    // numbering offset from any degenerate labels already in the list
    let mut offset: usize = 0;
    for label in gene_list {
        if let Some(captures) = DEGENERATE_LABEL_REGEX.captures(label) {
            if let Ok(existing) = captures[2].parse::<usize>() {
                offset = offset.max(existing + 1);
            }
        }
    }

    // sorted tally; index assignment must not depend on input order
    let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
    for gene in gene_list {
        *counts.entry(gene).or_default() += 1;
    }
    let degenerate_to_idx: BTreeMap<&String, usize> = counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .enumerate()
        .map(|(ii, (&gene, _))| (gene, ii))
        .collect();

    if degenerate_to_idx.is_empty() {
        return (gene_list.to_vec(), 0);
    }

    let n_degenerate = degenerate_to_idx.len() * 2;
    let mut occurrence: BTreeMap<&String, usize> = BTreeMap::new();
    let mut new_gene_list: Vec<String> = Vec::with_capacity(gene_list.len());
    for gene in gene_list {
        match degenerate_to_idx.get(gene) {
            Some(&idx) => {
                let salt = occurrence.entry(gene).or_default();
                let assigned = match placeholder_prefix {
                    Some(prefix) => format!(
                        "{prefix}:UNMAPPABLE_DEGENERATE_{}_{salt}", idx + offset
                    ),
                    None => format!("UNMAPPABLE_DEGENERATE_{}_{salt}", idx + offset)
                };
                *salt += 1;
                new_gene_list.push(assigned);
            },
            None => new_gene_list.push(gene.clone())
        }
    }
    (new_gene_list, n_degenerate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apply_mapping_documented_fixture() {
        let gene_list = to_strings(&["a", "b", "c", "d", "e", "f", "g", "h", "i"]);
        let mut mapping: HashMap<String, Vec<String>> = Default::default();
        mapping.insert("a".to_string(), vec![]);
        mapping.insert("b".to_string(), to_strings(&["bb"]));
        mapping.insert("c".to_string(), to_strings(&["cc1", "cc2"]));
        mapping.insert("d".to_string(), vec![]);
        mapping.insert("e".to_string(), to_strings(&["ee"]));
        mapping.insert("f".to_string(), to_strings(&["ff"]));
        mapping.insert("g".to_string(), to_strings(&["ee"]));
        mapping.insert("h".to_string(), to_strings(&["hh"]));
        mapping.insert("i".to_string(), to_strings(&["ff"]));

        let result = apply_mapping(&gene_list, &mapping, true, None);
        assert_eq!(result.gene_list, to_strings(&[
            "UNMAPPABLE_NO_MATCH_0",
            "bb",
            "UNMAPPABLE_MANY_MATCHES_0",
            "UNMAPPABLE_NO_MATCH_1",
            "UNMAPPABLE_DEGENERATE_0_0",
            "UNMAPPABLE_DEGENERATE_1_0",
            "UNMAPPABLE_DEGENERATE_0_1",
            "hh",
            "UNMAPPABLE_DEGENERATE_1_1"
        ]));
        assert_eq!(result.failure_log, FailureLog {
            zero_matches: 2,
            many_matches: 1,
            degenerate_matches: 4
        });
    }

    #[test]
    fn test_apply_mapping_with_prefix() {
        let gene_list = to_strings(&["a", "b"]);
        let mut mapping: HashMap<String, Vec<String>> = Default::default();
        mapping.insert("b".to_string(), to_strings(&["b0", "b1"]));

        let result = apply_mapping(&gene_list, &mapping, true, Some("symbol:NCBI"));
        assert_eq!(result.gene_list, to_strings(&[
            "symbol:NCBI:UNMAPPABLE_NO_MATCH_0",
            "symbol:NCBI:UNMAPPABLE_MANY_MATCHES_0"
        ]));
    }

    #[test]
    fn test_apply_mapping_placeholders_disabled() {
        let gene_list = to_strings(&["a", "c"]);
        let mut mapping: HashMap<String, Vec<String>> = Default::default();
        mapping.insert("c".to_string(), to_strings(&["cc1", "cc2"]));

        let result = apply_mapping(&gene_list, &mapping, false, None);
        // inputs echo through, but the failures are still counted
        assert_eq!(result.gene_list, gene_list);
        assert_eq!(result.failure_log.zero_matches, 1);
        assert_eq!(result.failure_log.many_matches, 1);
    }

    #[test]
    fn test_unmappable_inputs_never_rewrapped() {
        let gene_list = to_strings(&["NCBI:UNMAPPABLE_NO_MATCH_0", "x"]);
        let mapping: HashMap<String, Vec<String>> = Default::default();

        let result = apply_mapping(&gene_list, &mapping, true, Some("ortholog"));
        assert_eq!(result.gene_list[0], "NCBI:UNMAPPABLE_NO_MATCH_0");
        assert_eq!(result.gene_list[1], "ortholog:UNMAPPABLE_NO_MATCH_1");
        assert_eq!(result.failure_log.zero_matches, 2);
    }

    #[test]
    fn test_mask_degenerate_offset() {
        // a degenerate label from an earlier pass pushes the numbering past it
        let gene_list = to_strings(&[
            "UNMAPPABLE_DEGENERATE_3_0", "x", "y", "x"
        ]);
        let (masked, n_degenerate) = mask_degenerate_genes(&gene_list, None);
        assert_eq!(masked, to_strings(&[
            "UNMAPPABLE_DEGENERATE_3_0",
            "UNMAPPABLE_DEGENERATE_4_0",
            "y",
            "UNMAPPABLE_DEGENERATE_4_1"
        ]));
        assert_eq!(n_degenerate, 2);
    }

    #[test]
    fn test_mask_degenerate_no_collisions() {
        let gene_list = to_strings(&["a", "b", "c"]);
        let (masked, n_degenerate) = mask_degenerate_genes(&gene_list, None);
        assert_eq!(masked, gene_list);
        assert_eq!(n_degenerate, 0);
    }
}
