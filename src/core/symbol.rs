use crate::core::error::QuoteError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A ticker symbol as understood by the data provider, e.g. `AAPL` or `BTC-USD`.
///
/// Always trimmed and upper-cased; construct with [`Symbol::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self, QuoteError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(QuoteError::InvalidSymbol(raw.to_string()));
        }

        let valid = normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '_'));
        if !valid {
            return Err(QuoteError::InvalidSymbol(raw.to_string()));
        }

        Ok(Symbol(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-encodes the characters that are not safe in a URL path or query.
    pub fn url_encoded(&self) -> String {
        self.0.replace('^', "%5E").replace('=', "%3D")
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = QuoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let symbol = Symbol::parse("  nvda ").unwrap();
        assert_eq!(symbol.as_str(), "NVDA");
        assert_eq!(Symbol::parse("btc-usd").unwrap().as_str(), "BTC-USD");
        assert_eq!(Symbol::parse("^gspc").unwrap().url_encoded(), "%5EGSPC");
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert_eq!(
            Symbol::parse("   "),
            Err(QuoteError::InvalidSymbol("   ".to_string()))
        );
        assert!(Symbol::parse("").is_err());
        assert!(Symbol::parse("AA PL").is_err());
        assert!(Symbol::parse("AAPL/../x").is_err());
    }

    #[test]
    fn test_deserialize_through_parse() {
        let symbols: Vec<Symbol> = serde_yaml::from_str("[aapl, ' tsla']").unwrap();
        assert_eq!(symbols[0].as_str(), "AAPL");
        assert_eq!(symbols[1].as_str(), "TSLA");
        assert!(serde_yaml::from_str::<Symbol>("''").is_err());
    }
}
