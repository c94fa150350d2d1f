//! The scanner compiler: regex atom streams in, one minimized, type-labeled
//! DFA out (spec components 4.1-4.7, public API in spec section 6).

pub mod atom;
pub mod interval;
pub mod shunting;
pub mod thompson;
pub mod validate;

use crate::automaton::{Dfa, Nfa, NfaState, StateId};
use crate::error::CompileError;
use atom::Atom;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Reserved label attached to the sink state, when one exists.
pub const SINK_LABEL: &str = "_sink";

/// `(col-index, row-index, table)` view of a DFA's transition function, per
/// spec section 6: rows are indexed by alphabet symbol, columns by state.
#[derive(Clone, Debug)]
pub struct TransitionTable {
    pub row_index: HashMap<char, usize>,
    pub col_index: HashMap<StateId, usize>,
    pub table: Vec<Vec<StateId>>,
}

/// A compiled scanner: one minimized DFA recognizing every named pattern at
/// once, with accepting states labeled by the pattern(s) they satisfy.
#[derive(Clone, Debug)]
pub struct Scanner {
    name: String,
    pattern_order: Vec<String>,
    expressions: HashMap<String, Vec<Atom>>,
    dfa: Dfa,
    types: HashMap<String, HashSet<StateId>>,
}

impl Scanner {
    /// Compiles `patterns` (in declaration order — order is significant: it
    /// is the tie-break spec section 4.7 names for overlapping accepts)
    /// into a single scanner. `patterns` must be non-empty and its names
    /// unique.
    pub fn new(
        name: impl Into<String>,
        patterns: Vec<(String, Vec<Atom>)>,
    ) -> Result<Self, CompileError> {
        let name = name.into();
        if patterns.is_empty() {
            return Err(CompileError::invalid_value(
                "a scanner must declare at least one pattern",
            ));
        }

        let mut pattern_order = Vec::with_capacity(patterns.len());
        let mut expressions = HashMap::with_capacity(patterns.len());
        let mut seen = HashSet::new();
        for (pattern_name, atoms) in &patterns {
            if !seen.insert(pattern_name.clone()) {
                return Err(CompileError::invalid_value(format!(
                    "duplicate pattern name: {pattern_name}"
                )));
            }
            pattern_order.push(pattern_name.clone());
            expressions.insert(pattern_name.clone(), atoms.clone());
        }

        let (master, master_start, accept_labels) = merge_patterns(&patterns)?;

        let (raw_dfa, raw_labels) = master.subset_construct(
            master_start,
            |s| accept_labels.contains_key(&s),
            |s| accept_labels.get(&s).cloned(),
        );

        let initial_partition = label_aware_partition(&raw_dfa, &raw_labels);
        let (dfa, old_to_new) = raw_dfa.minimize_with_partition(initial_partition);

        let mut types: HashMap<String, HashSet<StateId>> = HashMap::new();
        for (old_state, labels) in &raw_labels {
            let new_state = old_to_new[old_state];
            for label in labels {
                types.entry(label.clone()).or_default().insert(new_state);
            }
        }
        if let Some(sink) = find_sink(&dfa) {
            types.entry(SINK_LABEL.to_string()).or_default().insert(sink);
        }

        Ok(Scanner {
            name,
            pattern_order,
            expressions,
            dfa,
            types,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expressions(&self) -> HashMap<String, Vec<Atom>> {
        self.expressions.clone()
    }

    pub fn alphabet(&self) -> HashSet<char> {
        self.dfa.alphabet.iter().copied().collect()
    }

    pub fn states(&self) -> HashSet<StateId> {
        (0..self.dfa.num_states()).collect()
    }

    pub fn start(&self) -> StateId {
        self.dfa.start
    }

    pub fn accepting(&self) -> HashSet<StateId> {
        self.dfa.accepting.clone()
    }

    pub fn types(&self) -> HashMap<String, HashSet<StateId>> {
        self.types.clone()
    }

    pub fn has_sink(&self) -> bool {
        self.types.contains_key(SINK_LABEL)
    }

    pub fn transitions(&self) -> TransitionTable {
        let row_index: HashMap<char, usize> = self
            .dfa
            .alphabet
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();
        let col_index: HashMap<StateId, usize> = (0..self.dfa.num_states()).map(|s| (s, s)).collect();

        let mut table = vec![vec![0; self.dfa.num_states()]; self.dfa.alphabet.len()];
        for (state, row) in self.dfa.transitions.iter().enumerate() {
            for (symbol_idx, &next) in row.iter().enumerate() {
                table[symbol_idx][state] = next;
            }
        }

        TransitionTable {
            row_index,
            col_index,
            table,
        }
    }

    /// Runs the scanner over `input`, returning the label of the pattern it
    /// matched, if `input` as a whole is accepted. Ties among patterns
    /// sharing a final state break toward whichever was declared first,
    /// per spec section 3.
    pub fn accepts(&self, input: &str) -> Option<&str> {
        let final_state = self.dfa.run(input.chars())?;
        if !self.dfa.accepting.contains(&final_state) {
            return None;
        }
        self.pattern_order
            .iter()
            .find(|name| {
                self.types
                    .get(name.as_str())
                    .is_some_and(|states| states.contains(&final_state))
            })
            .map(|s| s.as_str())
    }
}

fn compile_pattern(atoms: &[Atom]) -> Result<(Nfa, StateId, StateId), CompileError> {
    let validated = validate::validate(atoms)?;
    let expanded = interval::expand_intervals(&validated)?;
    let postfix = shunting::to_postfix(&expanded)?;
    Ok(thompson::build_nfa(&postfix)?)
}

/// Builds one NFA with a fresh start epsilon-linked to every pattern's
/// start (spec section 4.7), returning the merge together with a map from
/// merged-NFA accept state to the pattern name it signals.
fn merge_patterns(
    patterns: &[(String, Vec<Atom>)],
) -> Result<(Nfa, StateId, HashMap<StateId, String>), CompileError> {
    let mut master = Nfa::new();
    let master_start = master.new_state();
    let mut accept_labels = HashMap::new();

    for (name, atoms) in patterns {
        let (sub_nfa, sub_start, sub_accept) = compile_pattern(atoms)?;
        let offset = master.states.len();
        for state in &sub_nfa.states {
            let mut shifted = NfaState::default();
            shifted.epsilon = state.epsilon.iter().map(|&s| s + offset).collect();
            shifted.on = state.on.iter().map(|&(c, s)| (c, s + offset)).collect();
            master.states.push(shifted);
        }
        master.add_epsilon(master_start, sub_start + offset);
        accept_labels.insert(sub_accept + offset, name.clone());
    }

    Ok((master, master_start, accept_labels))
}

/// The initial Hopcroft partition for 4.7's label-aware merge: states split
/// first by accepting-ness, and accepting states further split by their
/// exact label set, so two accepts with different token types can never be
/// collapsed into one state.
fn label_aware_partition(
    dfa: &Dfa,
    labels: &HashMap<usize, HashSet<String>>,
) -> Vec<HashSet<usize>> {
    let mut groups: HashMap<Option<BTreeSet<String>>, HashSet<usize>> = HashMap::new();
    for state in 0..dfa.num_states() {
        let key = labels.get(&state).map(|set| set.iter().cloned().collect());
        groups.entry(key).or_default().insert(state);
    }
    groups.into_values().collect()
}

/// The sink is the unique non-accepting state whose every transition is a
/// self-loop, if one exists (spec section 4.5/4.7).
fn find_sink(dfa: &Dfa) -> Option<StateId> {
    (0..dfa.num_states()).find(|&s| {
        !dfa.accepting.contains(&s) && dfa.transitions[s].iter().all(|&next| next == s)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use atom::OpKind;

    fn scanner(patterns: Vec<(&str, Vec<Atom>)>) -> Scanner {
        let owned = patterns
            .into_iter()
            .map(|(name, atoms)| (name.to_string(), atoms))
            .collect();
        Scanner::new("test", owned).unwrap()
    }

    #[test]
    fn single_literal_scenario() {
        // spec section 8, scenario 1
        let s = scanner(vec![("alpha", vec![Atom::Char('a')])]);
        assert_eq!(s.alphabet(), HashSet::from(['a']));
        assert_eq!(s.states().len(), 3);
        assert!(s.has_sink());
        assert_eq!(s.accepting().len(), 1);
        let accept = *s.accepting().iter().next().unwrap();
        assert_eq!(s.types()["alpha"], HashSet::from([accept]));
        assert!(s.accepts("a").is_some());
        assert!(s.accepts("aa").is_none());
    }

    #[test]
    fn kleene_star_scenario_has_no_sink() {
        // spec section 8, scenario 2
        let s = scanner(vec![("star", vec![Atom::Char('a'), Atom::op(OpKind::Star)])]);
        assert!(!s.has_sink());
        assert_eq!(s.states().len(), 1);
        assert_eq!(s.accepting().len(), 1);
    }

    #[test]
    fn alternation_with_precedence_scenario() {
        // spec section 8, scenario 3: a|b* accepts a, eps, b, bb, ... but not ab
        let s = scanner(vec![(
            "p",
            vec![
                Atom::Char('a'),
                Atom::op(OpKind::Alt),
                Atom::Char('b'),
                Atom::op(OpKind::Star),
            ],
        )]);
        assert!(s.accepts("a").is_some());
        assert!(s.accepts("").is_some());
        assert!(s.accepts("b").is_some());
        assert!(s.accepts("bb").is_some());
        assert!(s.accepts("ab").is_none());
        assert_eq!(s.states().len(), 3);
    }

    #[test]
    fn duplicate_pattern_names_rejected() {
        let err = Scanner::new(
            "t",
            vec![
                ("a".to_string(), vec![Atom::Char('x')]),
                ("a".to_string(), vec![Atom::Char('y')]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::InvalidValue(_)));
    }

    #[test]
    fn overlapping_patterns_favor_earlier_declaration() {
        // both patterns accept "a"; "first" was declared first
        let s = scanner(vec![
            ("first", vec![Atom::Char('a')]),
            ("second", vec![Atom::Char('a')]),
        ]);
        assert_eq!(s.accepts("a"), Some("first"));
    }
}
