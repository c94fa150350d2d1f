//! Reads the human-authored symbolic-regex text format a scanner
//! specification body is written in, producing the `Atom` stream
//! [`scanparse::scanner::Scanner`] actually consumes. This is deliberately
//! a CLI-only concern (spec section 9: "operator sentinels vs characters" —
//! the core never parses text); the combinator style is grounded on
//! `examples/CMDJojo-dandy/dandy/src/parser/regex.rs`.

use nom::branch::alt;
use nom::character::complete::{anychar, char, digit1, none_of};
use nom::combinator::{map, opt, value};
use nom::multi::{many1, separated_list1};
use nom::sequence::{delimited, preceded};
use nom::IResult;
use scanparse::scanner::atom::{Atom, OpKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegexTextError {
    #[error("could not parse regex text {0:?}")]
    Parse(String),
    #[error("unexpected trailing input after regex: {0:?}")]
    TrailingInput(String),
}

pub fn parse(input: &str) -> Result<Vec<Atom>, RegexTextError> {
    let (rest, atoms) =
        alternation(input).map_err(|_| RegexTextError::Parse(input.to_string()))?;
    if !rest.is_empty() {
        return Err(RegexTextError::TrailingInput(rest.to_string()));
    }
    Ok(atoms)
}

fn alternation(input: &str) -> IResult<&str, Vec<Atom>> {
    let (input, first) = sequence(input)?;
    let (input, rest) = nom::multi::many0(preceded(char('|'), sequence))(input)?;
    let mut atoms = first;
    for seq in rest {
        atoms.push(Atom::op(OpKind::Alt));
        atoms.extend(seq);
    }
    Ok((input, atoms))
}

fn sequence(input: &str) -> IResult<&str, Vec<Atom>> {
    let (input, items) = many1(quantified_atom)(input)?;
    Ok((input, items.into_iter().flatten().collect()))
}

fn quantified_atom(input: &str) -> IResult<&str, Vec<Atom>> {
    let (input, mut atoms) = atom(input)?;
    let (input, unary) = opt(alt((
        value(OpKind::Star, char('*')),
        value(OpKind::Plus, char('+')),
        value(OpKind::Maybe, char('?')),
    )))(input)?;
    if let Some(op) = unary {
        atoms.push(Atom::op(op));
        return Ok((input, atoms));
    }

    let (input, interval) = opt(interval_suffix)(input)?;
    if let Some(ints) = interval {
        atoms.push(Atom::op(OpKind::LInterval));
        atoms.extend(ints);
        atoms.push(Atom::op(OpKind::RInterval));
    }
    Ok((input, atoms))
}

fn interval_suffix(input: &str) -> IResult<&str, Vec<Atom>> {
    delimited(
        char('{'),
        separated_list1(char(','), map(digit1, |s: &str| Atom::Int(s.parse().unwrap()))),
        char('}'),
    )(input)
}

fn atom(input: &str) -> IResult<&str, Vec<Atom>> {
    alt((group, class, map(plain_char, |c| vec![Atom::Char(c)])))(input)
}

fn group(input: &str) -> IResult<&str, Vec<Atom>> {
    let (input, inner) = delimited(char('('), alternation, char(')'))(input)?;
    let mut atoms = vec![Atom::op(OpKind::LGroup)];
    atoms.extend(inner);
    atoms.push(Atom::op(OpKind::RGroup));
    Ok((input, atoms))
}

fn class(input: &str) -> IResult<&str, Vec<Atom>> {
    let (input, _) = char('[')(input)?;
    let (input, negate) = opt(char('^'))(input)?;
    let (input, items) = many1(class_item)(input)?;
    let (input, _) = char(']')(input)?;

    let mut atoms = vec![Atom::op(OpKind::LClass)];
    if negate.is_some() {
        atoms.push(Atom::op(OpKind::Negate));
    }
    for item in items {
        atoms.extend(item);
    }
    atoms.push(Atom::op(OpKind::RClass));
    Ok((input, atoms))
}

fn class_item(input: &str) -> IResult<&str, Vec<Atom>> {
    let (input, lo) = class_char(input)?;
    let (input, hi) = opt(preceded(char('-'), class_char))(input)?;
    match hi {
        Some(hi) => Ok((
            input,
            vec![Atom::Char(lo), Atom::op(OpKind::Range), Atom::Char(hi)],
        )),
        None => Ok((input, vec![Atom::Char(lo)])),
    }
}

fn plain_char(input: &str) -> IResult<&str, char> {
    alt((escaped_char, none_of("()[]{}|*+?\\")))(input)
}

fn class_char(input: &str) -> IResult<&str, char> {
    alt((escaped_char, none_of("]\\^-")))(input)
}

fn escaped_char(input: &str) -> IResult<&str, char> {
    preceded(char('\\'), anychar)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_concat() {
        let atoms = parse("ab").unwrap();
        assert_eq!(atoms, vec![Atom::Char('a'), Atom::Char('b')]);
    }

    #[test]
    fn parses_alternation_and_star() {
        let atoms = parse("a|b*").unwrap();
        assert_eq!(
            atoms,
            vec![
                Atom::Char('a'),
                Atom::op(OpKind::Alt),
                Atom::Char('b'),
                Atom::op(OpKind::Star),
            ]
        );
    }

    #[test]
    fn parses_negated_class() {
        let atoms = parse("[^!-~]*").unwrap();
        assert_eq!(
            atoms,
            vec![
                Atom::op(OpKind::LClass),
                Atom::op(OpKind::Negate),
                Atom::Char('!'),
                Atom::op(OpKind::Range),
                Atom::Char('~'),
                Atom::op(OpKind::RClass),
                Atom::op(OpKind::Star),
            ]
        );
    }

    #[test]
    fn parses_bounded_interval() {
        let atoms = parse("a{2,4}").unwrap();
        assert_eq!(
            atoms,
            vec![
                Atom::Char('a'),
                Atom::op(OpKind::LInterval),
                Atom::Int(2),
                Atom::Int(4),
                Atom::op(OpKind::RInterval),
            ]
        );
    }
}
