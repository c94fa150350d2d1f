//! Grammar symbol and sentinel types.
//!
//! `EOI` and `EPS` are reserved in analysis but must never collide with a
//! grammar symbol (spec section 3). Rather than reserve two string values
//! the way the original implementation reserves two integers, they are
//! structurally distinct enum variants here: no terminal name, however
//! chosen, can ever be mistaken for a sentinel.

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GrammarSymbol {
    Terminal(String),
    Nonterminal(String),
}

/// An element of a FIRST set: a terminal, or the empty-string marker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FirstElem {
    Eps,
    Terminal(String),
}

/// An element of a FOLLOW set, or a parse table column: a terminal, or
/// end-of-input.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FollowElem {
    Eoi,
    Terminal(String),
}

impl FirstElem {
    pub fn into_follow(self) -> Option<FollowElem> {
        match self {
            FirstElem::Eps => None,
            FirstElem::Terminal(t) => Some(FollowElem::Terminal(t)),
        }
    }
}
