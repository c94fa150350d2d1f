//! Interval expansion (spec component 4.2): rewrites `atom{n}` / `atom{n,m}`
//! into an equivalent operator-only subexpression before Shunting-Yard sees
//! the stream. Edge cases (backwards range, `{0,0}`) are grounded in
//! `examples/original_source/tests/test_scanner.py`'s interval tests.

use crate::error::CompileError;
use crate::scanner::atom::OpKind;
use crate::scanner::validate::ValidatedToken;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("interval lower bound {0} is greater than upper bound {1}")]
    BackwardsRange(u32, u32),
    #[error("interval is empty")]
    EmptyInterval,
    #[error("interval does not follow a literal or a closed group")]
    MisplacedInterval,
}

impl From<IntervalError> for CompileError {
    fn from(err: IntervalError) -> Self {
        CompileError::invalid_value(err.to_string())
    }
}

/// Expands every `{..}` span in `tokens`, returning a stream with no
/// `LInterval`/`RInterval`/`Int` tokens left.
pub fn expand_intervals(tokens: &[ValidatedToken]) -> Result<Vec<ValidatedToken>, IntervalError> {
    let mut result: Vec<ValidatedToken> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            ValidatedToken::Op(OpKind::LInterval) => {
                let (start, end) = atom_span(&result)?;
                let atom_tokens: Vec<ValidatedToken> = result[start..end].to_vec();
                result.truncate(start);

                i += 1;
                let mut ints = Vec::new();
                while let Some(ValidatedToken::Int(n)) = tokens.get(i) {
                    ints.push(*n);
                    i += 1;
                }
                debug_assert!(matches!(tokens.get(i), Some(ValidatedToken::Op(OpKind::RInterval))));
                i += 1; // RInterval, already shape-checked by validate()

                let (n, m) = match ints.as_slice() {
                    [n] => (*n, None),
                    [n, m] => (*n, Some(*m)),
                    _ => unreachable!("validate() only admits one or two integers"),
                };
                result.extend(build_repetition(&atom_tokens, n, m)?);
            }
            other => {
                result.push(other.clone());
                i += 1;
            }
        }
    }
    Ok(result)
}

/// Locates the atom immediately preceding the end of `result`: either a
/// single literal/class token, or a fully parenthesized group (scanning
/// back to its matching `LGroup`). This mirrors the restriction enforced in
/// `validate()` that intervals only ever follow a literal or a closed group.
fn atom_span(result: &[ValidatedToken]) -> Result<(usize, usize), IntervalError> {
    let end = result.len();
    match result.last() {
        Some(ValidatedToken::Op(OpKind::RGroup)) => {
            let mut depth = 0i32;
            let mut i = end;
            loop {
                if i == 0 {
                    return Err(IntervalError::MisplacedInterval);
                }
                i -= 1;
                match &result[i] {
                    ValidatedToken::Op(OpKind::RGroup) => depth += 1,
                    ValidatedToken::Op(OpKind::LGroup) => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok((i, end));
                        }
                    }
                    _ => {}
                }
            }
        }
        Some(ValidatedToken::Char(_)) | Some(ValidatedToken::Class(_)) => Ok((end - 1, end)),
        _ => Err(IntervalError::MisplacedInterval),
    }
}

fn wrapped(atom: &[ValidatedToken]) -> Vec<ValidatedToken> {
    if atom.len() == 1 {
        atom.to_vec()
    } else {
        let mut out = Vec::with_capacity(atom.len() + 2);
        out.push(ValidatedToken::Op(OpKind::LGroup));
        out.extend(atom.iter().cloned());
        out.push(ValidatedToken::Op(OpKind::RGroup));
        out
    }
}

fn repeat_concat(atom: &[ValidatedToken], n: u32) -> Vec<ValidatedToken> {
    let mut out = Vec::new();
    for i in 0..n {
        if i > 0 {
            out.push(ValidatedToken::Op(OpKind::Concat));
        }
        out.extend(wrapped(atom));
    }
    out
}

fn build_repetition(
    atom: &[ValidatedToken],
    n: u32,
    m: Option<u32>,
) -> Result<Vec<ValidatedToken>, IntervalError> {
    match m {
        // `{n}`: exactly n copies. Zero copies would erase the atom
        // entirely, leaving nothing for a neighboring implicit Concat to
        // join to, so it is rejected the same as `{0,0}`.
        None => {
            if n == 0 {
                return Err(IntervalError::EmptyInterval);
            }
            Ok(repeat_concat(atom, n))
        }

        // `{0,0}`: empty, rejected outright. Must be checked before the
        // `{n,0}` unbounded case below, since both match on `m == 0`.
        Some(0) if n == 0 => Err(IntervalError::EmptyInterval),

        // `{n,0}`: unbounded, "n or more".
        Some(0) => {
            let mut out = repeat_concat(atom, n);
            if !out.is_empty() {
                out.push(ValidatedToken::Op(OpKind::Concat));
            }
            out.extend(wrapped(atom));
            out.push(ValidatedToken::Op(OpKind::Star));
            Ok(out)
        }

        Some(m) => {
            if m < n {
                return Err(IntervalError::BackwardsRange(n, m));
            }
            let mut out = repeat_concat(atom, n);
            for _ in 0..(m - n) {
                if !out.is_empty() {
                    out.push(ValidatedToken::Op(OpKind::Concat));
                }
                out.extend(wrapped(atom));
                out.push(ValidatedToken::Op(OpKind::Maybe));
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::atom::Atom;
    use crate::scanner::validate::validate;

    fn expand(atoms: &[Atom]) -> Vec<ValidatedToken> {
        let validated = validate(atoms).unwrap();
        expand_intervals(&validated).unwrap()
    }

    #[test]
    fn fixed_count_repeats_literal() {
        let tokens = expand(&[
            Atom::Char('a'),
            Atom::op(OpKind::LInterval),
            Atom::Int(3),
            Atom::op(OpKind::RInterval),
        ]);
        assert_eq!(
            tokens,
            vec![
                ValidatedToken::Char('a'),
                ValidatedToken::Op(OpKind::Concat),
                ValidatedToken::Char('a'),
                ValidatedToken::Op(OpKind::Concat),
                ValidatedToken::Char('a'),
            ]
        );
    }

    #[test]
    fn unbounded_interval_appends_star() {
        let tokens = expand(&[
            Atom::Char('a'),
            Atom::op(OpKind::LInterval),
            Atom::Int(1),
            Atom::Int(0),
            Atom::op(OpKind::RInterval),
        ]);
        assert_eq!(tokens.last(), Some(&ValidatedToken::Op(OpKind::Star)));
    }

    #[test]
    fn backwards_range_is_rejected() {
        let validated = validate(&[
            Atom::Char('a'),
            Atom::op(OpKind::LInterval),
            Atom::Int(3),
            Atom::Int(1),
            Atom::op(OpKind::RInterval),
        ])
        .unwrap();
        let err = expand_intervals(&validated).unwrap_err();
        assert_eq!(err, IntervalError::BackwardsRange(3, 1));
    }

    #[test]
    fn zero_zero_interval_is_empty() {
        let validated = validate(&[
            Atom::Char('a'),
            Atom::op(OpKind::LInterval),
            Atom::Int(0),
            Atom::Int(0),
            Atom::op(OpKind::RInterval),
        ])
        .unwrap();
        let err = expand_intervals(&validated).unwrap_err();
        assert_eq!(err, IntervalError::EmptyInterval);
    }

    #[test]
    fn interval_on_group_wraps_group() {
        let tokens = expand(&[
            Atom::op(OpKind::LGroup),
            Atom::Char('a'),
            Atom::op(OpKind::Concat),
            Atom::Char('b'),
            Atom::op(OpKind::RGroup),
            Atom::op(OpKind::LInterval),
            Atom::Int(2),
            Atom::op(OpKind::RInterval),
        ]);
        // (ab){2} -> (ab) CONCAT (ab)
        assert_eq!(
            tokens,
            vec![
                ValidatedToken::Op(OpKind::LGroup),
                ValidatedToken::Char('a'),
                ValidatedToken::Op(OpKind::Concat),
                ValidatedToken::Char('b'),
                ValidatedToken::Op(OpKind::RGroup),
                ValidatedToken::Op(OpKind::Concat),
                ValidatedToken::Op(OpKind::LGroup),
                ValidatedToken::Char('a'),
                ValidatedToken::Op(OpKind::Concat),
                ValidatedToken::Char('b'),
                ValidatedToken::Op(OpKind::RGroup),
            ]
        );
    }
}
