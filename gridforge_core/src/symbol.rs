//! Display symbols and legends.
//!
//! A [`Symbol`] is a single printable character. A [`Legend`] is the ordered
//! alphabet of a model: a cell holding byte `i` displays `legend[i]`.

use crate::error::GridError;
use std::fmt;
use std::str::FromStr;

/// Wildcard used by rule patterns; never a legend symbol.
pub const WILDCARD: char = '*';

/// A validated display symbol.
///
/// Whitespace and control characters are rejected so that every symbol
/// renders as exactly one visible column in the text dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(char);

impl Symbol {
    /// Creates a symbol, rejecting whitespace and control characters.
    pub fn new(c: char) -> Result<Self, GridError> {
        if c.is_whitespace() || c.is_control() {
            return Err(GridError::InvalidSymbol(c));
        }
        Ok(Self(c))
    }

    /// Returns the underlying character.
    pub fn as_char(&self) -> char {
        self.0
    }
}

impl TryFrom<char> for Symbol {
    type Error = GridError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::new(c)
    }
}

impl FromStr for Symbol {
    type Err = GridError;

    /// Parses a table key such as `"W"`; the key must be exactly one character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => Err(GridError::SymbolKey(s.to_string())),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered symbol alphabet; position = cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    symbols: Vec<Symbol>,
}

impl Legend {
    /// Builds a legend from a `values` string such as `"BWR"`.
    pub fn parse(values: &str) -> Result<Self, GridError> {
        let mut symbols: Vec<Symbol> = Vec::with_capacity(values.len());
        for c in values.chars() {
            if c == WILDCARD {
                return Err(GridError::InvalidSymbol(c));
            }
            let symbol = Symbol::new(c)?;
            if symbols.contains(&symbol) {
                return Err(GridError::DuplicateSymbol(c));
            }
            symbols.push(symbol);
        }
        if symbols.is_empty() || symbols.len() > 256 {
            return Err(GridError::LegendSize(symbols.len()));
        }
        Ok(Self { symbols })
    }

    /// Returns the symbol for a cell value.
    pub fn get(&self, index: u8) -> Option<Symbol> {
        self.symbols.get(index as usize).copied()
    }

    /// Returns the cell value for a symbol.
    pub fn index_of(&self, c: char) -> Option<u8> {
        self.symbols
            .iter()
            .position(|s| s.as_char() == c)
            .map(|i| i as u8)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_rejects_whitespace() {
        assert!(Symbol::new('A').is_ok());
        assert!(matches!(Symbol::new(' '), Err(GridError::InvalidSymbol(' '))));
        assert!(Symbol::new('\n').is_err());
    }

    #[test]
    fn test_symbol_from_key() {
        assert_eq!("W".parse::<Symbol>().unwrap().as_char(), 'W');
        assert!(matches!("WB".parse::<Symbol>(), Err(GridError::SymbolKey(_))));
        assert!("".parse::<Symbol>().is_err());
    }

    #[test]
    fn test_legend_lookup() {
        let legend = Legend::parse("BWR").unwrap();
        assert_eq!(legend.len(), 3);
        assert_eq!(legend.get(1).map(|s| s.as_char()), Some('W'));
        assert_eq!(legend.get(3), None);
        assert_eq!(legend.index_of('R'), Some(2));
        assert_eq!(legend.to_string(), "BWR");
    }

    #[test]
    fn test_legend_rejects_duplicates_and_wildcard() {
        assert!(matches!(Legend::parse("BWB"), Err(GridError::DuplicateSymbol('B'))));
        assert!(Legend::parse("B*").is_err());
        assert!(matches!(Legend::parse(""), Err(GridError::LegendSize(0))));
    }
}
