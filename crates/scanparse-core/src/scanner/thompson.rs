//! Postfix -> NFA (spec component 4.4): Thompson construction over a
//! postfix token stream, one fragment per operator exactly as in the
//! construction table. Also resolves character classes (range enumeration
//! and negation materialization, spec section 9) at the point a class
//! fragment is built.

use crate::automaton::{Nfa, StateId};
use crate::error::CompileError;
use crate::scanner::atom::OpKind;
use crate::scanner::validate::{ClassItem, ClassSpec, ValidatedToken};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThompsonError {
    #[error("operator is missing an operand")]
    StackUnderflow,
    #[error("pattern is empty")]
    EmptyPattern,
    #[error("pattern has disconnected fragments")]
    LeftoverFragments,
    #[error("character class resolves to no code points")]
    EmptyResolvedClass,
    #[error("unexpected token in postfix stream")]
    UnexpectedToken,
}

impl From<ThompsonError> for CompileError {
    fn from(err: ThompsonError) -> Self {
        CompileError::invalid_value(err.to_string())
    }
}

/// Fixed domain negation is materialized against: printable ASCII
/// (`!` through `~`) plus the whitespace set. Spec section 9: "a deliberate
/// simplification; Unicode negation is a non-goal."
pub const WHITESPACE: [char; 6] = [' ', '\t', '\n', '\r', '\x0c', '\x0b'];

pub fn negation_domain() -> BTreeSet<char> {
    let mut set: BTreeSet<char> = ('!'..='~').collect();
    set.extend(WHITESPACE);
    set
}

/// Enumerates the code points a class spec denotes: ranges become per-point
/// enumerations, then negation (if any) is materialized against
/// [`negation_domain`].
pub fn resolve_class(spec: &ClassSpec) -> BTreeSet<char> {
    let mut positive = BTreeSet::new();
    for item in &spec.items {
        match item {
            ClassItem::Char(c) => {
                positive.insert(*c);
            }
            ClassItem::Range(lo, hi) => {
                for code in (*lo as u32)..=(*hi as u32) {
                    if let Some(c) = char::from_u32(code) {
                        positive.insert(c);
                    }
                }
            }
        }
    }
    if spec.negate {
        negation_domain().difference(&positive).copied().collect()
    } else {
        positive
    }
}

#[derive(Clone, Copy)]
struct Fragment {
    entry: StateId,
    exit: StateId,
}

/// Builds an NFA from a postfix token stream, returning the automaton
/// together with its single entry and single exit state (the Thompson
/// fragment invariant holds right up until the caller wires this fragment
/// into a larger construction, e.g. the multi-pattern merge of 4.7).
pub fn build_nfa(postfix: &[ValidatedToken]) -> Result<(Nfa, StateId, StateId), ThompsonError> {
    let mut nfa = Nfa::new();
    let mut stack: Vec<Fragment> = Vec::new();

    for token in postfix {
        match token {
            ValidatedToken::Char(c) => {
                let entry = nfa.new_state();
                let exit = nfa.new_state();
                nfa.add_transition(entry, *c, exit);
                stack.push(Fragment { entry, exit });
            }

            ValidatedToken::Class(spec) => {
                let chars = resolve_class(spec);
                if chars.is_empty() {
                    return Err(ThompsonError::EmptyResolvedClass);
                }
                let entry = nfa.new_state();
                let exit = nfa.new_state();
                for c in chars {
                    nfa.add_transition(entry, c, exit);
                }
                stack.push(Fragment { entry, exit });
            }

            ValidatedToken::Op(OpKind::Concat) => {
                let b = stack.pop().ok_or(ThompsonError::StackUnderflow)?;
                let a = stack.pop().ok_or(ThompsonError::StackUnderflow)?;
                nfa.add_epsilon(a.exit, b.entry);
                stack.push(Fragment {
                    entry: a.entry,
                    exit: b.exit,
                });
            }

            ValidatedToken::Op(OpKind::Alt) => {
                let b = stack.pop().ok_or(ThompsonError::StackUnderflow)?;
                let a = stack.pop().ok_or(ThompsonError::StackUnderflow)?;
                let entry = nfa.new_state();
                let exit = nfa.new_state();
                nfa.add_epsilon(entry, a.entry);
                nfa.add_epsilon(entry, b.entry);
                nfa.add_epsilon(a.exit, exit);
                nfa.add_epsilon(b.exit, exit);
                stack.push(Fragment { entry, exit });
            }

            ValidatedToken::Op(OpKind::Star) => {
                let a = stack.pop().ok_or(ThompsonError::StackUnderflow)?;
                let entry = nfa.new_state();
                let exit = nfa.new_state();
                nfa.add_epsilon(entry, a.entry);
                nfa.add_epsilon(entry, exit);
                nfa.add_epsilon(a.exit, a.entry);
                nfa.add_epsilon(a.exit, exit);
                stack.push(Fragment { entry, exit });
            }

            ValidatedToken::Op(OpKind::Plus) => {
                let a = stack.pop().ok_or(ThompsonError::StackUnderflow)?;
                let entry = nfa.new_state();
                let exit = nfa.new_state();
                nfa.add_epsilon(entry, a.entry);
                nfa.add_epsilon(a.exit, a.entry);
                nfa.add_epsilon(a.exit, exit);
                stack.push(Fragment { entry, exit });
            }

            ValidatedToken::Op(OpKind::Maybe) => {
                let a = stack.pop().ok_or(ThompsonError::StackUnderflow)?;
                let entry = nfa.new_state();
                let exit = nfa.new_state();
                nfa.add_epsilon(entry, a.entry);
                nfa.add_epsilon(entry, exit);
                nfa.add_epsilon(a.exit, exit);
                stack.push(Fragment { entry, exit });
            }

            _ => return Err(ThompsonError::UnexpectedToken),
        }
    }

    let frag = stack.pop().ok_or(ThompsonError::EmptyPattern)?;
    if !stack.is_empty() {
        return Err(ThompsonError::LeftoverFragments);
    }
    Ok((nfa, frag.entry, frag.exit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::atom::Atom;
    use crate::scanner::interval::expand_intervals;
    use crate::scanner::shunting::to_postfix;
    use crate::scanner::validate::validate;

    fn compile(atoms: &[Atom]) -> (Nfa, StateId, StateId) {
        let validated = validate(atoms).unwrap();
        let expanded = expand_intervals(&validated).unwrap();
        let postfix = to_postfix(&expanded).unwrap();
        build_nfa(&postfix).unwrap()
    }

    #[test]
    fn literal_nfa_accepts_exactly_one_string() {
        let (nfa, start, accept) = compile(&[Atom::Char('a')]);
        let closure = nfa.epsilon_closure(&std::collections::BTreeSet::from([start]));
        assert!(closure.contains(&start));
        assert_ne!(start, accept);
    }

    #[test]
    fn negated_class_spanning_printable_ascii_yields_whitespace() {
        let spec = ClassSpec {
            negate: true,
            items: vec![ClassItem::Range('!', '~')],
        };
        let resolved = resolve_class(&spec);
        let expected: BTreeSet<char> = WHITESPACE.into_iter().collect();
        assert_eq!(resolved, expected);
    }

    #[test]
    fn alternation_nfa_has_two_branches() {
        let (nfa, start, _accept) = compile(&[
            Atom::Char('a'),
            Atom::op(OpKind::Alt),
            Atom::Char('b'),
        ]);
        let closure = nfa.epsilon_closure(&BTreeSet::from([start]));
        // entry state plus both branch entries reachable via epsilon
        assert!(closure.len() >= 3);
    }
}
