//! Company profile and valuation figures

use serde::{Deserialize, Serialize};

/// Slow-moving company data served next to quotes.
///
/// Every figure is optional: upstreams routinely omit ratios that are
/// undefined for a company (no dividend, negative earnings, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    /// Name of the provider that served the values.
    pub source: String,
    pub long_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    /// Fraction, e.g. `0.0044` for 0.44%.
    pub dividend_yield: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub forward_eps: Option<f64>,
    /// Fraction of revenue.
    pub profit_margin: Option<f64>,
    /// Fraction of shareholder equity.
    pub return_on_equity: Option<f64>,
}

impl Fundamentals {
    /// True when at least one descriptive field or figure is present.
    pub fn has_any_field(&self) -> bool {
        let figures = [
            self.market_cap,
            self.beta,
            self.trailing_pe,
            self.forward_pe,
            self.dividend_yield,
            self.enterprise_value,
            self.trailing_eps,
            self.forward_eps,
            self.profit_margin,
            self.return_on_equity,
        ];
        self.long_name.is_some()
            || self.industry.is_some()
            || self.website.is_some()
            || figures.iter().any(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_any_field() {
        let empty = Fundamentals {
            source: "yahoo".to_string(),
            ..Fundamentals::default()
        };
        assert!(!empty.has_any_field());

        let with_beta = Fundamentals {
            beta: Some(1.2),
            ..empty.clone()
        };
        assert!(with_beta.has_any_field());

        let with_industry = Fundamentals {
            industry: Some("Semiconductors".to_string()),
            ..empty
        };
        assert!(with_industry.has_any_field());
    }
}
