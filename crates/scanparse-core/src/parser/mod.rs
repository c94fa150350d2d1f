//! The parser compiler: a BNF-like grammar in, FIRST/FOLLOW sets and an
//! LL(1) parse table out (spec components 4.8-4.11, public API in spec
//! section 6).

pub mod grammar;
pub mod sets;
pub mod symbol;
pub mod table;

use crate::error::CompileError;
use grammar::Grammar as NormalizedGrammar;
pub use symbol::{FirstElem, FollowElem, GrammarSymbol};
pub use table::ParseTable;

use std::collections::{HashMap, HashSet};

/// A compiled grammar: FIRST, FOLLOW, and an LL(1) parse table, all
/// computed once at construction and exposed as total, read-only views.
#[derive(Clone, Debug)]
pub struct Parser {
    grammar: NormalizedGrammar,
    first: HashMap<String, HashSet<FirstElem>>,
    follow: HashMap<String, HashSet<FollowElem>>,
    table: ParseTable,
}

impl Parser {
    /// `productions` is `(nonterminal, body)` in declaration order, `body`
    /// being `alt1 | alt2 | ...` with whitespace-separated symbols per
    /// alternative (spec section 4.8).
    pub fn new(
        name: impl Into<String>,
        productions: Vec<(String, String)>,
        start: impl Into<String>,
    ) -> Result<Self, CompileError> {
        let grammar = NormalizedGrammar::new(name, productions, start)?;
        let first = sets::compute_first(&grammar);
        let follow = sets::compute_follow(&grammar, &first);
        let table = table::build_table(&grammar, &first, &follow);
        Ok(Parser {
            grammar,
            first,
            follow,
            table,
        })
    }

    pub fn name(&self) -> &str {
        &self.grammar.name
    }

    pub fn start(&self) -> &str {
        &self.grammar.start
    }

    pub fn terminals(&self) -> HashSet<String> {
        self.grammar.terminals.clone()
    }

    pub fn nonterminals(&self) -> HashSet<String> {
        self.grammar.nonterminals.clone()
    }

    pub fn first(&self) -> HashMap<String, HashSet<FirstElem>> {
        self.first.clone()
    }

    pub fn follow(&self) -> HashMap<String, HashSet<FollowElem>> {
        self.follow.clone()
    }

    pub fn rules(&self) -> &[(String, Vec<GrammarSymbol>)] {
        &self.grammar.rules
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn has_conflicts(&self) -> bool {
        self.table.has_conflicts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuilding_from_the_same_productions_is_deterministic() {
        let productions = vec![
            ("S".to_string(), "E | E a".to_string()),
            ("E".to_string(), "b | ".to_string()),
        ];
        let p1 = Parser::new("g", productions.clone(), "S").unwrap();
        let p2 = Parser::new("g", productions, "S").unwrap();
        assert_eq!(p1.first(), p2.first());
        assert_eq!(p1.follow(), p2.follow());
        assert_eq!(p1.rules(), p2.rules());
        assert_eq!(p1.table().cells, p2.table().cells);
    }

    #[test]
    fn left_recursive_arithmetic_grammar_converges() {
        // grounded in the left-recursion golden example of
        // examples/original_source/src/parser.py's __main__ block.
        let productions = vec![
            ("E".to_string(), "E plus T | T".to_string()),
            ("T".to_string(), "T star F | F".to_string()),
            ("F".to_string(), "lparen E rparen | id".to_string()),
        ];
        let p = Parser::new("arith", productions, "E").unwrap();
        assert!(p.first()["F"].contains(&FirstElem::Terminal("id".to_string())));
        assert!(p.follow()["E"].contains(&FollowElem::Eoi));
    }
}
