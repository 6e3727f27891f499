//! Fixed-coefficient "boardroom" scoring.
//!
//! Two views: a debate between three analysts that shift the observed
//! one-month move by a fixed bias, and a synthesized consensus over a panel of
//! analysts that each weigh bull/base/bear scenarios by a probability vector.
use crate::core::analytics;
use crate::core::error::QuoteError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Bias added to (bull) or removed from (bear) the observed move.
pub const OPINION_BIAS: f64 = 0.05;
/// Expected move above which the consensus directive is to accumulate.
pub const ACCUMULATE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Bull,
    Bear,
    Math,
}

impl Stance {
    pub fn label(&self) -> &'static str {
        match self {
            Stance::Bull => "Agent Alpha (Bull)",
            Stance::Bear => "Agent Beta (Bear)",
            Stance::Math => "Agent Gamma (Math)",
        }
    }

    pub fn temperament(&self) -> &'static str {
        match self {
            Stance::Bull => "Optimistic",
            Stance::Bear => "Cynical",
            Stance::Math => "Neutral",
        }
    }

    fn bias(&self) -> f64 {
        match self {
            Stance::Bull => OPINION_BIAS,
            Stance::Bear => -OPINION_BIAS,
            Stance::Math => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Buy,
    Sell,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Verdict::Buy => "BUY",
            Verdict::Sell => "SELL",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Debate {
    pub price_change: f64,
    pub volatility: Option<f64>,
    pub opinions: Vec<(Stance, f64)>,
    pub consensus: f64,
    pub verdict: Verdict,
}

/// Runs the three-analyst debate over a series of closes.
pub fn debate(closes: &[f64]) -> Result<Debate, QuoteError> {
    let price_change = analytics::period_change(closes)?;
    let volatility = analytics::volatility(&analytics::daily_returns(closes)).ok();

    let opinions: Vec<(Stance, f64)> = [Stance::Bull, Stance::Bear, Stance::Math]
        .into_iter()
        .map(|stance| (stance, price_change + stance.bias()))
        .collect();
    let consensus = opinions.iter().map(|(_, v)| v).sum::<f64>() / opinions.len() as f64;

    Ok(Debate {
        price_change,
        volatility,
        opinions,
        consensus,
        verdict: if consensus > 0.0 {
            Verdict::Buy
        } else {
            Verdict::Sell
        },
    })
}

/// One analyst's scenario targets and the probability it gives each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioView {
    pub name: String,
    pub bull: f64,
    pub base: f64,
    pub bear: f64,
    /// Probabilities of the bull, base and bear scenarios, in that order.
    pub probabilities: [f64; 3],
}

impl ScenarioView {
    pub fn expected_value(&self) -> f64 {
        let [p_bull, p_base, p_bear] = self.probabilities;
        self.bull * p_bull + self.base * p_base + self.bear * p_bear
    }

    /// The highest scenario probability.
    pub fn confidence(&self) -> f64 {
        self.probabilities.iter().copied().fold(0.0, f64::max)
    }
}

pub fn default_panel() -> Vec<ScenarioView> {
    vec![
        ScenarioView {
            name: "Alpha (Technician)".to_string(),
            bull: 0.08,
            base: 0.02,
            bear: -0.05,
            probabilities: [0.3, 0.5, 0.2],
        },
        ScenarioView {
            name: "Beta (Historian)".to_string(),
            bull: 0.04,
            base: 0.01,
            bear: -0.02,
            probabilities: [0.2, 0.6, 0.2],
        },
        ScenarioView {
            name: "Gamma (Philosopher)".to_string(),
            bull: 0.12,
            base: 0.03,
            bear: -0.10,
            probabilities: [0.4, 0.3, 0.3],
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    Stable,
    Caution,
}

impl Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MarketState::Stable => "STABLE",
            MarketState::Caution => "CAUTION",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Accumulate,
    Hold,
}

impl Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Directive::Accumulate => "ACCUMULATE",
            Directive::Hold => "HOLD",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub expected_values: Vec<(String, f64)>,
    pub target: f64,
    /// `1 - std_dev(expected values)`; higher when the panel agrees.
    pub conviction: f64,
    pub market_state: MarketState,
    pub directive: Directive,
}

pub fn synthesize(panel: &[ScenarioView]) -> Result<Synthesis, QuoteError> {
    if panel.is_empty() {
        return Err(QuoteError::ComputationUndefined("consensus of an empty panel"));
    }

    let expected_values: Vec<(String, f64)> = panel
        .iter()
        .map(|view| (view.name.clone(), view.expected_value()))
        .collect();
    let evs: Vec<f64> = expected_values.iter().map(|(_, ev)| *ev).collect();

    let target = evs.iter().sum::<f64>() / evs.len() as f64;
    let conviction = 1.0 - analytics::population_std_dev(&evs)?;

    Ok(Synthesis {
        expected_values,
        target,
        conviction,
        market_state: if target > 0.0 {
            MarketState::Stable
        } else {
            MarketState::Caution
        },
        directive: if target > ACCUMULATE_THRESHOLD {
            Directive::Accumulate
        } else {
            Directive::Hold
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debate_biases_and_verdict() {
        let result = debate(&[100.0, 104.0, 102.0]).unwrap();
        assert!((result.price_change - 0.02).abs() < 1e-12);
        assert_eq!(result.opinions.len(), 3);
        assert!((result.opinions[0].1 - 0.07).abs() < 1e-12);
        assert!((result.opinions[1].1 + 0.03).abs() < 1e-12);
        assert!((result.opinions[2].1 - 0.02).abs() < 1e-12);
        // the biases cancel, so the consensus is the raw move
        assert!((result.consensus - 0.02).abs() < 1e-12);
        assert_eq!(result.verdict, Verdict::Buy);
        assert!(result.volatility.is_some());
    }

    #[test]
    fn test_debate_flat_market_is_sell() {
        let result = debate(&[50.0]).unwrap();
        assert_eq!(result.consensus, 0.0);
        assert_eq!(result.verdict, Verdict::Sell);
        assert!(result.volatility.is_none());
    }

    #[test]
    fn test_debate_without_data_is_undefined() {
        assert!(debate(&[]).unwrap_err().is_undefined());
        assert!(debate(&[0.0, 1.0]).unwrap_err().is_undefined());
    }

    #[test]
    fn test_synthesize_default_panel() {
        let panel = default_panel();
        let synthesis = synthesize(&panel).unwrap();

        let evs: Vec<f64> = synthesis.expected_values.iter().map(|(_, v)| *v).collect();
        assert!((evs[0] - 0.024).abs() < 1e-12);
        assert!((evs[1] - 0.010).abs() < 1e-12);
        assert!((evs[2] - 0.027).abs() < 1e-12);

        assert!((synthesis.target - 0.061 / 3.0).abs() < 1e-12);
        assert!(synthesis.conviction > 0.99 && synthesis.conviction < 1.0);
        assert_eq!(synthesis.market_state, MarketState::Stable);
        assert_eq!(synthesis.directive, Directive::Accumulate);
        assert!((panel[0].confidence() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_synthesize_bearish_panel_holds() {
        let panel = vec![ScenarioView {
            name: "Doom".to_string(),
            bull: 0.01,
            base: -0.01,
            bear: -0.2,
            probabilities: [0.1, 0.5, 0.4],
        }];
        let synthesis = synthesize(&panel).unwrap();
        assert!(synthesis.target < 0.0);
        assert_eq!(synthesis.conviction, 1.0);
        assert_eq!(synthesis.market_state, MarketState::Caution);
        assert_eq!(synthesis.directive, Directive::Hold);
    }

    #[test]
    fn test_synthesize_empty_panel() {
        assert!(synthesize(&[]).unwrap_err().is_undefined());
    }
}
