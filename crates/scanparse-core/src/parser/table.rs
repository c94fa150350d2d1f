//! Parse table construction (spec component 4.11): for each rule, compute
//! PREDICT and insert the rule index into every cell it predicts. Conflict
//! cells (more than one rule index) are preserved rather than rejected —
//! LL(1) conflicts are data, not errors (spec section 7, section 9).

use crate::parser::grammar::Grammar;
use crate::parser::sets::first_of_sequence;
use crate::parser::symbol::{FirstElem, FollowElem};
use std::collections::{HashMap, HashSet};

/// `(cells, row_index, col_index)` view of the LL(1) parse table, per spec
/// section 6: rows are nonterminals, columns are terminals-or-EOI, each
/// cell holds the set of applicable rule indices.
#[derive(Clone, Debug)]
pub struct ParseTable {
    pub cells: Vec<Vec<HashSet<usize>>>,
    pub row_index: HashMap<String, usize>,
    pub col_index: HashMap<FollowElem, usize>,
}

impl ParseTable {
    pub fn has_conflicts(&self) -> bool {
        self.cells
            .iter()
            .any(|row| row.iter().any(|cell| cell.len() > 1))
    }
}

pub fn predict(
    lhs: &str,
    rhs: &[crate::parser::symbol::GrammarSymbol],
    first: &HashMap<String, HashSet<FirstElem>>,
    follow: &HashMap<String, HashSet<FollowElem>>,
) -> HashSet<FollowElem> {
    let seq_first = first_of_sequence(rhs, first);
    let nullable = seq_first.contains(&FirstElem::Eps);
    let mut result: HashSet<FollowElem> = seq_first
        .into_iter()
        .filter_map(FirstElem::into_follow)
        .collect();
    if nullable {
        result.extend(follow.get(lhs).cloned().unwrap_or_default());
    }
    result
}

pub fn build_table(
    grammar: &Grammar,
    first: &HashMap<String, HashSet<FirstElem>>,
    follow: &HashMap<String, HashSet<FollowElem>>,
) -> ParseTable {
    let mut row_index: HashMap<String, usize> = HashMap::new();
    let mut nonterminals: Vec<&String> = grammar.nonterminals.iter().collect();
    nonterminals.sort();
    for (i, nt) in nonterminals.iter().enumerate() {
        row_index.insert((*nt).clone(), i);
    }

    let mut col_index: HashMap<FollowElem, usize> = HashMap::new();
    col_index.insert(FollowElem::Eoi, 0);
    let mut terminals: Vec<&String> = grammar.terminals.iter().collect();
    terminals.sort();
    for (i, t) in terminals.iter().enumerate() {
        col_index.insert(FollowElem::Terminal((*t).clone()), i + 1);
    }

    let mut cells = vec![vec![HashSet::new(); col_index.len()]; row_index.len()];

    for (rule_idx, (lhs, rhs)) in grammar.rules.iter().enumerate() {
        let row = row_index[lhs];
        for elem in predict(lhs, rhs, first, follow) {
            let col = col_index[&elem];
            cells[row][col].insert(rule_idx);
        }
    }

    ParseTable {
        cells,
        row_index,
        col_index,
    }
}
