//! Grammar normalizer and terminal/nonterminal classification (spec
//! component 4.8), grounded on `examples/original_source/src/parser.py`'s
//! `ContextFreeGrammar` constructor: split each nonterminal's body on `|`,
//! whitespace-tokenize each alternative, and derive terminals as whatever
//! symbol appears on some right-hand side but is never a left-hand side.

use crate::error::CompileError;
use crate::parser::symbol::GrammarSymbol;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar must declare at least one production")]
    EmptyGrammar,
    #[error("start symbol {0:?} is not a declared nonterminal")]
    UnknownStart(String),
    #[error("nonterminal name cannot be empty")]
    EmptyNonterminalName,
    #[error("duplicate nonterminal: {0}")]
    DuplicateNonterminal(String),
}

impl From<GrammarError> for CompileError {
    fn from(err: GrammarError) -> Self {
        CompileError::invalid_value(err.to_string())
    }
}

/// A normalized, classified grammar: productions are fixed into rule
/// indices by insertion order (insertion order of `productions`, then
/// left-to-right order of `|`-separated alternatives within each one).
#[derive(Clone, Debug)]
pub struct Grammar {
    pub name: String,
    pub start: String,
    pub nonterminals: HashSet<String>,
    pub terminals: HashSet<String>,
    pub rules: Vec<(String, Vec<GrammarSymbol>)>,
}

impl Grammar {
    /// `productions` is `(nonterminal, body)` in declaration order, where
    /// `body` is `alt1 | alt2 | ...` and each alternative is whitespace
    /// separated symbols. An empty alternative (including a wholly blank
    /// body) produces an epsilon rule.
    pub fn new(
        name: impl Into<String>,
        productions: Vec<(String, String)>,
        start: impl Into<String>,
    ) -> Result<Self, GrammarError> {
        if productions.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        let mut nonterminals = HashSet::with_capacity(productions.len());
        for (lhs, _) in &productions {
            if lhs.trim().is_empty() {
                return Err(GrammarError::EmptyNonterminalName);
            }
            if !nonterminals.insert(lhs.clone()) {
                return Err(GrammarError::DuplicateNonterminal(lhs.clone()));
            }
        }

        let mut raw_rules: Vec<(String, Vec<String>)> = Vec::new();
        for (lhs, body) in &productions {
            for alt in body.split('|') {
                let symbols: Vec<String> = alt.split_whitespace().map(str::to_string).collect();
                raw_rules.push((lhs.clone(), symbols));
            }
        }

        let mut all_rhs_symbols: HashSet<String> = HashSet::new();
        for (_, symbols) in &raw_rules {
            all_rhs_symbols.extend(symbols.iter().cloned());
        }
        let terminals: HashSet<String> = all_rhs_symbols
            .difference(&nonterminals)
            .cloned()
            .collect();

        let rules = raw_rules
            .into_iter()
            .map(|(lhs, symbols)| {
                let body = symbols
                    .into_iter()
                    .map(|s| {
                        if nonterminals.contains(&s) {
                            GrammarSymbol::Nonterminal(s)
                        } else {
                            GrammarSymbol::Terminal(s)
                        }
                    })
                    .collect();
                (lhs, body)
            })
            .collect();

        let start = start.into();
        if !nonterminals.contains(&start) {
            return Err(GrammarError::UnknownStart(start));
        }

        Ok(Grammar {
            name: name.into(),
            start,
            nonterminals,
            terminals,
            rules,
        })
    }
}
