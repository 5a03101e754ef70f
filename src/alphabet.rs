use std::{
    fmt::{Debug, Display},
    ops::Add,
    str::FromStr,
};

use itertools::Itertools;

use crate::InvalidSymbol;

/// The marker used for the empty word, both when reading and when showing words.
pub const EPSILON: char = 'ε';

/// A symbol of the fixed two-letter alphabet. Symbols are ordered `A < B`, which is also
/// the order in which all algorithms of this crate explore successors.
///
/// Older clients spell the symbols `L` and `R`, both spellings are accepted when parsing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Symbol {
    /// The first symbol, also read from `L`.
    A,
    /// The second symbol, also read from `R`.
    B,
}

impl Symbol {
    /// All symbols of the alphabet, in exploration order.
    pub const ALL: [Symbol; 2] = [Symbol::A, Symbol::B];

    /// Position of the symbol in [`Symbol::ALL`].
    pub fn index(self) -> usize {
        match self {
            Symbol::A => 0,
            Symbol::B => 1,
        }
    }
}

impl TryFrom<char> for Symbol {
    type Error = InvalidSymbol;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'A' | 'L' => Ok(Symbol::A),
            'B' | 'R' => Ok(Symbol::B),
            other => Err(InvalidSymbol(other)),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::A => write!(f, "A"),
            Symbol::B => write!(f, "B"),
        }
    }
}

/// A finite word over the alphabet. The empty word is displayed as `ε`.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(Vec<Symbol>);

impl Word {
    /// The empty word.
    pub fn epsilon() -> Self {
        Self(vec![])
    }

    /// The word consisting of the single symbol `sym`.
    pub fn letter(sym: Symbol) -> Self {
        Self(vec![sym])
    }

    /// Number of symbols in the word.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true iff this is the empty word.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The symbols of the word, in order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Appends `sym` at the end of the word.
    pub fn push(&mut self, sym: Symbol) {
        self.0.push(sym)
    }

    /// Parses a whitespace separated list of words. An empty list stands for the list that only
    /// contains the empty word, which is how table files encode a lone `ε` row or column.
    pub fn parse_list(input: &str) -> Result<Vec<Word>, InvalidSymbol> {
        let words = input
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Word>, _>>()?;
        if words.is_empty() {
            Ok(vec![Word::epsilon()])
        } else {
            Ok(words)
        }
    }
}

impl FromStr for Word {
    type Err = InvalidSymbol;

    /// Reads a word, where `ε` (or nothing at all) is the empty word and a leading `ε` is
    /// ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(EPSILON).unwrap_or(s);
        s.chars().map(Symbol::try_from).collect::<Result<_, _>>().map(Word)
    }
}

impl From<Vec<Symbol>> for Word {
    fn from(value: Vec<Symbol>) -> Self {
        Self(value)
    }
}

impl FromIterator<Symbol> for Word {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Word {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Add<Symbol> for &Word {
    type Output = Word;

    fn add(self, rhs: Symbol) -> Self::Output {
        let mut out = self.clone();
        out.push(rhs);
        out
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "{EPSILON}")
        } else {
            write!(f, "{}", self.0.iter().join(""))
        }
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}
