
use serde::{Deserialize, Serialize};

/// Tally of genes that failed to map 1:1 within a single call.
/// Counters are independent and reset per call; the spaced JSON keys are the
/// historical report format downstream tooling parses.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FailureLog {
    /// inputs with no match at all
    #[serde(rename = "zero matches")]
    pub zero_matches: usize,
    /// inputs with more than one candidate match
    #[serde(rename = "many matches")]
    pub many_matches: usize,
    /// outputs claimed 1:1 by more than one distinct input
    #[serde(rename = "degenerate matches")]
    pub degenerate_matches: usize
}

impl FailureLog {
    /// Fold another log into this one by summing like-named counters
    pub fn absorb(&mut self, other: &FailureLog) {
        self.zero_matches += other.zero_matches;
        self.many_matches += other.many_matches;
        self.degenerate_matches += other.degenerate_matches;
    }
}
