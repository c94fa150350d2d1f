//! Tokenizer & validator (spec component 4.1).
//!
//! Walks the raw atom stream left to right with a small completion state
//! tracking what kind of construct was just closed, validating operator
//! arity and group/class/interval balance, inserting implicit concatenation,
//! and folding character classes into a resolved [`ClassSpec`]. Interval
//! contents (`{n}` / `{n,m}`) are left as literal `Int`/`LInterval`/
//! `RInterval` tokens for [`crate::scanner::interval`] to expand — this pass
//! only checks that their *shape* is well-formed.

use crate::error::CompileError;
use crate::scanner::atom::{Atom, OpKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("integer atom outside of an interval")]
    IntOutsideInterval,
    #[error("{0:?} requires a preceding complete atom")]
    MissingOperand(OpKind),
    #[error("unbalanced group")]
    UnbalancedGroup,
    #[error("character classes cannot nest")]
    NestedClass,
    #[error("unterminated character class")]
    UnterminatedClass,
    #[error("empty character class")]
    EmptyClass,
    #[error("range requires a code point on both sides")]
    InvalidRange,
    #[error("negation must be the first token in a class")]
    MisplacedNegate,
    #[error("unexpected token inside character class")]
    InvalidClassToken,
    #[error("range marker outside a character class")]
    RangeOutsideClass,
    #[error("negation marker outside a character class")]
    NegateOutsideClass,
    #[error("intervals cannot nest")]
    NestedInterval,
    #[error("unterminated interval")]
    UnterminatedInterval,
    #[error("interval must contain one or two integers")]
    MalformedInterval,
    #[error("interval must follow a literal or a closed group")]
    IntervalNotAfterAtom,
    #[error("empty pattern")]
    EmptyPattern,
}

impl From<TokenizeError> for CompileError {
    fn from(err: TokenizeError) -> Self {
        match err {
            TokenizeError::IntOutsideInterval => CompileError::invalid_type(err.to_string()),
            other => CompileError::invalid_value(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSpec {
    pub negate: bool,
    pub items: Vec<ClassItem>,
}

/// A token in the validated, concat-inserted stream handed to interval
/// expansion and then to Shunting-Yard. Structurally narrower than [`Atom`]:
/// classes have been resolved to a [`ClassSpec`], but integers and interval
/// delimiters survive for the next stage.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidatedToken {
    Char(char),
    Class(ClassSpec),
    Int(u32),
    Op(OpKind),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Completion {
    None,
    Atom,      // literal or closed group: can be interval-quantified
    Quantified, // class, closed interval, or star/plus/maybe result
}

/// Validates `atoms` and returns the concat-inserted token stream.
pub fn validate(atoms: &[Atom]) -> Result<Vec<ValidatedToken>, TokenizeError> {
    if atoms.is_empty() {
        return Err(TokenizeError::EmptyPattern);
    }

    let mut out = Vec::with_capacity(atoms.len());
    let mut completion = Completion::None;
    let mut group_depth: u32 = 0;
    let mut i = 0;

    while i < atoms.len() {
        match &atoms[i] {
            Atom::Int(_) => return Err(TokenizeError::IntOutsideInterval),

            Atom::Char(c) => {
                insert_implicit_concat(&mut out, completion);
                out.push(ValidatedToken::Char(*c));
                completion = Completion::Atom;
                i += 1;
            }

            Atom::Op(OpKind::LGroup) => {
                insert_implicit_concat(&mut out, completion);
                out.push(ValidatedToken::Op(OpKind::LGroup));
                group_depth += 1;
                completion = Completion::None;
                i += 1;
            }

            Atom::Op(OpKind::RGroup) => {
                if group_depth == 0 || completion == Completion::None {
                    return Err(TokenizeError::UnbalancedGroup);
                }
                group_depth -= 1;
                out.push(ValidatedToken::Op(OpKind::RGroup));
                completion = Completion::Atom;
                i += 1;
            }

            Atom::Op(op @ (OpKind::Star | OpKind::Plus | OpKind::Maybe)) => {
                if completion == Completion::None {
                    return Err(TokenizeError::MissingOperand(*op));
                }
                out.push(ValidatedToken::Op(*op));
                completion = Completion::Quantified;
                i += 1;
            }

            Atom::Op(op @ (OpKind::Concat | OpKind::Alt)) => {
                if completion == Completion::None {
                    return Err(TokenizeError::MissingOperand(*op));
                }
                out.push(ValidatedToken::Op(*op));
                completion = Completion::None;
                i += 1;
            }

            Atom::Op(OpKind::LClass) => {
                insert_implicit_concat(&mut out, completion);
                let (spec, next) = parse_class(atoms, i + 1)?;
                out.push(ValidatedToken::Class(spec));
                completion = Completion::Quantified;
                i = next;
            }

            Atom::Op(OpKind::RClass) => return Err(TokenizeError::InvalidClassToken),
            Atom::Op(OpKind::Range) => return Err(TokenizeError::RangeOutsideClass),
            Atom::Op(OpKind::Negate) => return Err(TokenizeError::NegateOutsideClass),

            Atom::Op(OpKind::LInterval) => {
                if completion != Completion::Atom {
                    return Err(TokenizeError::IntervalNotAfterAtom);
                }
                let (ints, next) = parse_interval_contents(atoms, i + 1)?;
                out.push(ValidatedToken::Op(OpKind::LInterval));
                for n in ints {
                    out.push(ValidatedToken::Int(n));
                }
                out.push(ValidatedToken::Op(OpKind::RInterval));
                completion = Completion::Quantified;
                i = next;
            }

            Atom::Op(OpKind::RInterval) => return Err(TokenizeError::UnterminatedInterval),
        }
    }

    if group_depth != 0 || completion == Completion::None {
        return Err(TokenizeError::UnbalancedGroup);
    }
    Ok(out)
}

fn insert_implicit_concat(out: &mut Vec<ValidatedToken>, completion: Completion) {
    if completion != Completion::None {
        out.push(ValidatedToken::Op(OpKind::Concat));
    }
}

/// Parses class contents starting at `start` (just past `LClass`). Returns
/// the resolved spec and the index just past the matching `RClass`.
fn parse_class(atoms: &[Atom], start: usize) -> Result<(ClassSpec, usize), TokenizeError> {
    let mut items = Vec::new();
    let mut negate = false;
    let mut negate_seen = false;
    let mut i = start;
    let mut seen_any = false;
    let mut pending_char: Option<char> = None;

    loop {
        match atoms.get(i) {
            None => return Err(TokenizeError::UnterminatedClass),
            Some(Atom::Op(OpKind::RClass)) => {
                if let Some(c) = pending_char.take() {
                    items.push(ClassItem::Char(c));
                }
                if !seen_any {
                    return Err(TokenizeError::EmptyClass);
                }
                return Ok((ClassSpec { negate, items }, i + 1));
            }
            Some(Atom::Op(OpKind::LClass)) => return Err(TokenizeError::NestedClass),
            Some(Atom::Op(OpKind::Negate)) => {
                if seen_any || pending_char.is_some() || negate_seen {
                    return Err(TokenizeError::MisplacedNegate);
                }
                negate = true;
                negate_seen = true;
                i += 1;
            }
            Some(Atom::Char(c)) => {
                if let Some(prev) = pending_char.take() {
                    items.push(ClassItem::Char(prev));
                }
                pending_char = Some(*c);
                seen_any = true;
                i += 1;
            }
            Some(Atom::Op(OpKind::Range)) => {
                let lo = pending_char.take().ok_or(TokenizeError::InvalidRange)?;
                i += 1;
                let hi = match atoms.get(i) {
                    Some(Atom::Char(c)) => *c,
                    _ => return Err(TokenizeError::InvalidRange),
                };
                if hi < lo {
                    return Err(TokenizeError::InvalidRange);
                }
                items.push(ClassItem::Range(lo, hi));
                seen_any = true;
                i += 1;
            }
            Some(_) => return Err(TokenizeError::InvalidClassToken),
        }
    }
}

/// Parses interval contents starting at `start` (just past `LInterval`).
/// Returns the one or two integers found and the index just past the
/// matching `RInterval`. Only structural shape is checked here; arithmetic
/// validity (`n <= m`, `{0,0}`) is [`crate::scanner::interval`]'s job.
fn parse_interval_contents(atoms: &[Atom], start: usize) -> Result<(Vec<u32>, usize), TokenizeError> {
    let mut ints = Vec::new();
    let mut i = start;
    loop {
        match atoms.get(i) {
            None => return Err(TokenizeError::UnterminatedInterval),
            Some(Atom::Op(OpKind::RInterval)) => {
                if ints.is_empty() || ints.len() > 2 {
                    return Err(TokenizeError::MalformedInterval);
                }
                return Ok((ints, i + 1));
            }
            Some(Atom::Op(OpKind::LInterval)) => return Err(TokenizeError::NestedInterval),
            Some(Atom::Int(n)) => {
                ints.push(*n);
                i += 1;
            }
            Some(_) => return Err(TokenizeError::MalformedInterval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> Atom {
        Atom::Char(c)
    }
    fn op(k: OpKind) -> Atom {
        Atom::Op(k)
    }

    #[test]
    fn single_literal_is_valid() {
        let result = validate(&[lit('a')]).unwrap();
        assert_eq!(result, vec![ValidatedToken::Char('a')]);
    }

    #[test]
    fn implicit_concat_between_adjacent_literals() {
        let result = validate(&[lit('a'), lit('b')]).unwrap();
        assert_eq!(
            result,
            vec![
                ValidatedToken::Char('a'),
                ValidatedToken::Op(OpKind::Concat),
                ValidatedToken::Char('b'),
            ]
        );
    }

    #[test]
    fn star_requires_preceding_atom() {
        let err = validate(&[op(OpKind::Star)]).unwrap_err();
        assert_eq!(err, TokenizeError::MissingOperand(OpKind::Star));
    }

    #[test]
    fn unbalanced_group_is_rejected() {
        assert_eq!(
            validate(&[op(OpKind::LGroup), lit('a')]).unwrap_err(),
            TokenizeError::UnbalancedGroup
        );
        assert_eq!(
            validate(&[op(OpKind::RGroup)]).unwrap_err(),
            TokenizeError::UnbalancedGroup
        );
    }

    #[test]
    fn empty_class_is_rejected() {
        let err = validate(&[op(OpKind::LClass), op(OpKind::RClass)]).unwrap_err();
        assert_eq!(err, TokenizeError::EmptyClass);
    }

    #[test]
    fn negated_class_parses() {
        let result = validate(&[
            op(OpKind::LClass),
            op(OpKind::Negate),
            lit('!'),
            op(OpKind::Range),
            lit('~'),
            op(OpKind::RClass),
        ])
        .unwrap();
        assert_eq!(
            result,
            vec![ValidatedToken::Class(ClassSpec {
                negate: true,
                items: vec![ClassItem::Range('!', '~')],
            })]
        );
    }

    #[test]
    fn interval_must_follow_atom() {
        let err = validate(&[
            lit('a'),
            op(OpKind::Maybe),
            op(OpKind::LInterval),
            Atom::Int(2),
            op(OpKind::RInterval),
        ])
        .unwrap_err();
        assert_eq!(err, TokenizeError::IntervalNotAfterAtom);
    }

    #[test]
    fn double_negation_is_rejected() {
        let err = validate(&[
            op(OpKind::LClass),
            op(OpKind::Negate),
            op(OpKind::Negate),
            lit('a'),
            op(OpKind::RClass),
        ])
        .unwrap_err();
        assert_eq!(err, TokenizeError::MisplacedNegate);
    }

    #[test]
    fn int_outside_interval_is_invalid_type() {
        let err = validate(&[Atom::Int(3)]).unwrap_err();
        assert_eq!(err, TokenizeError::IntOutsideInterval);
    }
}
