use crate::error::{ChainError, Result};
use std::fmt;

/// Underlying symbol, three non-numeric characters, uppercased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.chars().any(|c| c.is_ascii_digit()) {
            return Err(ChainError::InvalidSymbol(format!(
                "No numerical values allowed in tickers, you entered {}",
                raw
            )));
        }
        if raw.chars().count() != 3 {
            return Err(ChainError::InvalidSymbol(format!(
                "Must enter 3 characters, you entered {}",
                raw
            )));
        }
        Ok(Self(raw.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_valid_symbol() {
        assert_eq!(Symbol::parse("btc").unwrap().as_str(), "BTC");
    }

    #[test]
    fn rejects_digits_and_wrong_length() {
        assert!(Symbol::parse("b7c").is_err());
        assert!(Symbol::parse("bt").is_err());
        assert!(Symbol::parse("btcu").is_err());
    }
}
