//! FIRST and FOLLOW fixed-point computation (spec components 4.9-4.10),
//! grounded on `examples/original_source/src/parser.py`'s `_first`/`_follow`
//! methods — the Rust port keeps the same two fixed-point loops but threads
//! `EPS`/`EOI` through the type system instead of through integer sentinels.

use crate::parser::grammar::Grammar;
use crate::parser::symbol::{FirstElem, FollowElem, GrammarSymbol};
use std::collections::{HashMap, HashSet};

/// FIRST of a single symbol: `{t}` for a terminal, the nonterminal's
/// current FIRST set otherwise.
fn first_of_symbol(
    symbol: &GrammarSymbol,
    first: &HashMap<String, HashSet<FirstElem>>,
) -> HashSet<FirstElem> {
    match symbol {
        GrammarSymbol::Terminal(t) => HashSet::from([FirstElem::Terminal(t.clone())]),
        GrammarSymbol::Nonterminal(n) => first.get(n).cloned().unwrap_or_default(),
    }
}

/// "First-of-sequence" from spec section 4.9: `{EPS}` for the empty
/// sequence; otherwise `FIRST(X1) \ EPS`, plus the first-of-sequence of the
/// rest when `X1` is nullable.
pub fn first_of_sequence(
    seq: &[GrammarSymbol],
    first: &HashMap<String, HashSet<FirstElem>>,
) -> HashSet<FirstElem> {
    let Some((head, rest)) = seq.split_first() else {
        return HashSet::from([FirstElem::Eps]);
    };
    let head_first = first_of_symbol(head, first);
    let nullable = head_first.contains(&FirstElem::Eps);
    let mut result: HashSet<FirstElem> = head_first
        .into_iter()
        .filter(|e| *e != FirstElem::Eps)
        .collect();
    if nullable {
        result.extend(first_of_sequence(rest, first));
    }
    result
}

/// Computes FIRST for every nonterminal in `grammar` by iterating the
/// section 4.9 update rule to a fixed point.
pub fn compute_first(grammar: &Grammar) -> HashMap<String, HashSet<FirstElem>> {
    let mut first: HashMap<String, HashSet<FirstElem>> = grammar
        .nonterminals
        .iter()
        .map(|n| (n.clone(), HashSet::new()))
        .collect();

    loop {
        let mut changed = false;
        for (lhs, rhs) in &grammar.rules {
            let seq_first = first_of_sequence(rhs, &first);
            let entry = first.get_mut(lhs).expect("lhs is always a nonterminal");
            for elem in seq_first {
                changed |= entry.insert(elem);
            }
        }
        if !changed {
            break;
        }
    }
    first
}

/// Computes FOLLOW for every nonterminal by iterating the section 4.10
/// update rule to a fixed point. `FOLLOW(start) = {EOI}` seeds the loop.
pub fn compute_follow(
    grammar: &Grammar,
    first: &HashMap<String, HashSet<FirstElem>>,
) -> HashMap<String, HashSet<FollowElem>> {
    let mut follow: HashMap<String, HashSet<FollowElem>> = grammar
        .nonterminals
        .iter()
        .map(|n| (n.clone(), HashSet::new()))
        .collect();
    follow
        .get_mut(&grammar.start)
        .expect("start is always a nonterminal")
        .insert(FollowElem::Eoi);

    loop {
        let mut changed = false;
        for (lhs, rhs) in &grammar.rules {
            for (i, symbol) in rhs.iter().enumerate() {
                let GrammarSymbol::Nonterminal(b) = symbol else {
                    continue;
                };
                let beta = &rhs[i + 1..];
                let beta_first = first_of_sequence(beta, first);
                let nullable = beta_first.contains(&FirstElem::Eps);

                let entry = follow.get_mut(b).expect("b is always a nonterminal");
                for elem in &beta_first {
                    if let Some(f) = elem.clone().into_follow() {
                        changed |= entry.insert(f);
                    }
                }
                if nullable {
                    let lhs_follow = follow
                        .get(lhs)
                        .cloned()
                        .expect("lhs is always a nonterminal");
                    let entry = follow.get_mut(b).unwrap();
                    for elem in lhs_follow {
                        changed |= entry.insert(elem);
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::Grammar;

    #[test]
    fn eps_in_first_iff_nullable() {
        // E -> b | (empty)
        let g = Grammar::new("g", vec![("E".to_string(), "b | ".to_string())], "E").unwrap();
        let first = compute_first(&g);
        assert!(first["E"].contains(&FirstElem::Eps));
        assert!(first["E"].contains(&FirstElem::Terminal("b".to_string())));
    }

    #[test]
    fn eoi_always_in_follow_of_start() {
        let g = Grammar::new("g", vec![("S".to_string(), "a".to_string())], "S").unwrap();
        let first = compute_first(&g);
        let follow = compute_follow(&g, &first);
        assert!(follow["S"].contains(&FollowElem::Eoi));
    }

    #[test]
    fn json_value_first_and_follow_scenario() {
        // spec section 8 scenario 5 (abbreviated): <VALUE> -> string | number
        // | bool | null | <OBJ> | <ARR>; the object/array bodies are
        // simplified here to isolate FIRST/FOLLOW without a full JSON grammar.
        let g = Grammar::new(
            "json",
            vec![
                (
                    "VALUE".to_string(),
                    "string | number | bool | null | OBJ | ARR".to_string(),
                ),
                ("OBJ".to_string(), "{ }".to_string()),
                ("ARR".to_string(), "[ ]".to_string()),
                ("START".to_string(), "VALUE".to_string()),
            ],
            "START",
        )
        .unwrap();
        let first = compute_first(&g);
        let expected_value_first: HashSet<FirstElem> = [
            "string", "number", "bool", "null", "{", "[",
        ]
        .into_iter()
        .map(|t| FirstElem::Terminal(t.to_string()))
        .collect();
        assert_eq!(first["VALUE"], expected_value_first);

        let follow = compute_follow(&g, &first);
        assert!(follow["VALUE"].contains(&FollowElem::Eoi));
    }
}
