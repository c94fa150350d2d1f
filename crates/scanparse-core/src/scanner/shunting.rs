//! Infix -> postfix conversion (spec component 4.3): Dijkstra's Shunting-Yard
//! algorithm over the interval-expanded token stream. Character classes are
//! opaque atoms here; only `Concat`/`Alt`/`Star`/`Plus`/`Maybe`/groups are
//! operators.

use crate::error::CompileError;
use crate::scanner::atom::OpKind;
use crate::scanner::validate::ValidatedToken;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShuntingError {
    #[error("unbalanced group")]
    UnbalancedGroup,
    #[error("unexpected token in postfix conversion")]
    UnexpectedToken,
}

impl From<ShuntingError> for CompileError {
    fn from(err: ShuntingError) -> Self {
        CompileError::invalid_value(err.to_string())
    }
}

fn precedence(op: OpKind) -> u8 {
    match op {
        OpKind::Star | OpKind::Plus | OpKind::Maybe => 3,
        OpKind::Concat => 2,
        OpKind::Alt => 1,
        _ => 0,
    }
}

/// Converts an interval-expanded infix token stream to postfix.
pub fn to_postfix(tokens: &[ValidatedToken]) -> Result<Vec<ValidatedToken>, ShuntingError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut op_stack: Vec<ValidatedToken> = Vec::new();

    for token in tokens {
        match token {
            ValidatedToken::Char(_) | ValidatedToken::Class(_) => output.push(token.clone()),

            ValidatedToken::Op(OpKind::LGroup) => op_stack.push(token.clone()),

            ValidatedToken::Op(OpKind::RGroup) => loop {
                match op_stack.pop() {
                    Some(ValidatedToken::Op(OpKind::LGroup)) => break,
                    Some(other) => output.push(other),
                    None => return Err(ShuntingError::UnbalancedGroup),
                }
            },

            ValidatedToken::Op(
                op @ (OpKind::Star | OpKind::Plus | OpKind::Maybe | OpKind::Concat | OpKind::Alt),
            ) => {
                while let Some(ValidatedToken::Op(top)) = op_stack.last() {
                    if *top != OpKind::LGroup && precedence(*top) >= precedence(*op) {
                        output.push(op_stack.pop().unwrap());
                    } else {
                        break;
                    }
                }
                op_stack.push(token.clone());
            }

            ValidatedToken::Int(_) | ValidatedToken::Op(_) => {
                return Err(ShuntingError::UnexpectedToken)
            }
        }
    }

    while let Some(top) = op_stack.pop() {
        if matches!(top, ValidatedToken::Op(OpKind::LGroup)) {
            return Err(ShuntingError::UnbalancedGroup);
        }
        output.push(top);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_outranks_alt() {
        // a CONCAT b ALT c  ->  a b CONCAT c ALT
        let infix = vec![
            ValidatedToken::Char('a'),
            ValidatedToken::Op(OpKind::Concat),
            ValidatedToken::Char('b'),
            ValidatedToken::Op(OpKind::Alt),
            ValidatedToken::Char('c'),
        ];
        let postfix = to_postfix(&infix).unwrap();
        assert_eq!(
            postfix,
            vec![
                ValidatedToken::Char('a'),
                ValidatedToken::Char('b'),
                ValidatedToken::Op(OpKind::Concat),
                ValidatedToken::Char('c'),
                ValidatedToken::Op(OpKind::Alt),
            ]
        );
    }

    #[test]
    fn groups_override_precedence() {
        // (a ALT b) CONCAT c -> a b ALT c CONCAT
        let infix = vec![
            ValidatedToken::Op(OpKind::LGroup),
            ValidatedToken::Char('a'),
            ValidatedToken::Op(OpKind::Alt),
            ValidatedToken::Char('b'),
            ValidatedToken::Op(OpKind::RGroup),
            ValidatedToken::Op(OpKind::Concat),
            ValidatedToken::Char('c'),
        ];
        let postfix = to_postfix(&infix).unwrap();
        assert_eq!(
            postfix,
            vec![
                ValidatedToken::Char('a'),
                ValidatedToken::Char('b'),
                ValidatedToken::Op(OpKind::Alt),
                ValidatedToken::Char('c'),
                ValidatedToken::Op(OpKind::Concat),
            ]
        );
    }

    #[test]
    fn star_binds_tighter_than_concat() {
        // a STAR CONCAT b -> a STAR b CONCAT
        let infix = vec![
            ValidatedToken::Char('a'),
            ValidatedToken::Op(OpKind::Star),
            ValidatedToken::Op(OpKind::Concat),
            ValidatedToken::Char('b'),
        ];
        let postfix = to_postfix(&infix).unwrap();
        assert_eq!(
            postfix,
            vec![
                ValidatedToken::Char('a'),
                ValidatedToken::Op(OpKind::Star),
                ValidatedToken::Char('b'),
                ValidatedToken::Op(OpKind::Concat),
            ]
        );
    }
}
