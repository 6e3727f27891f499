//! Derived numbers shown next to quotes and charts.
//!
//! Every ratio here checks its denominator and returns
//! [`QuoteError::ComputationUndefined`] rather than letting a NaN or an
//! infinity reach the display.
use crate::core::error::QuoteError;

fn finite(value: f64, what: &'static str) -> Result<f64, QuoteError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QuoteError::ComputationUndefined(what))
    }
}

/// Percentage change of `price` over `previous_close`, e.g. `2.0` for +2%.
pub fn percent_change(price: Option<f64>, previous_close: Option<f64>) -> Result<f64, QuoteError> {
    const WHAT: &str = "percent change";
    let (Some(price), Some(base)) = (price, previous_close) else {
        return Err(QuoteError::ComputationUndefined(WHAT));
    };
    if base == 0.0 || !base.is_finite() {
        return Err(QuoteError::ComputationUndefined(WHAT));
    }
    finite(((price - base) / base) * 100.0, WHAT)
}

/// Fractional change from the first to the last close, e.g. `0.05` for +5%.
pub fn period_change(closes: &[f64]) -> Result<f64, QuoteError> {
    const WHAT: &str = "period change";
    match (closes.first(), closes.last()) {
        (Some(first), Some(last)) if *first != 0.0 => finite(last / first - 1.0, WHAT),
        _ => Err(QuoteError::ComputationUndefined(WHAT)),
    }
}

/// Close-to-close fractional returns. Pairs with a zero base are skipped.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .filter(|r| r.is_finite())
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1) of daily returns.
pub fn volatility(returns: &[f64]) -> Result<f64, QuoteError> {
    if returns.len() < 2 {
        return Err(QuoteError::ComputationUndefined("volatility"));
    }
    let m = mean(returns);
    let variance =
        returns.iter().map(|r| (r - m).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    finite(variance.sqrt(), "volatility")
}

/// Population standard deviation.
pub fn population_std_dev(values: &[f64]) -> Result<f64, QuoteError> {
    if values.is_empty() {
        return Err(QuoteError::ComputationUndefined("standard deviation"));
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    finite(variance.sqrt(), "standard deviation")
}

/// Mean return over its standard deviation, not annualized.
pub fn sharpe_like(returns: &[f64]) -> Result<f64, QuoteError> {
    const WHAT: &str = "sharpe ratio";
    let std_dev = volatility(returns).map_err(|_| QuoteError::ComputationUndefined(WHAT))?;
    if std_dev == 0.0 {
        return Err(QuoteError::ComputationUndefined(WHAT));
    }
    finite(mean(returns) / std_dev, WHAT)
}

/// Trailing simple moving average aligned with `closes`.
///
/// Positions before the window fills are `None`.
pub fn moving_average(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }

    let mut result = Vec::with_capacity(closes.len());
    let mut sum = 0.0;
    for (i, close) in closes.iter().enumerate() {
        sum += close;
        if i >= window {
            sum -= closes[i - window];
        }
        if i + 1 >= window {
            result.push(Some(sum / window as f64));
        } else {
            result.push(None);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_matches_expected() {
        let change = percent_change(Some(153.0), Some(150.0)).unwrap();
        assert!((change - 2.0).abs() < 1e-9);

        let drop = percent_change(Some(90.0), Some(100.0)).unwrap();
        assert!((drop + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_change_undefined_denominators() {
        assert_eq!(
            percent_change(Some(153.0), Some(0.0)),
            Err(QuoteError::ComputationUndefined("percent change"))
        );
        assert!(percent_change(Some(153.0), None).is_err());
        assert!(percent_change(None, Some(150.0)).is_err());
        assert!(percent_change(Some(1.0), Some(f64::NAN)).is_err());
        assert!(percent_change(Some(f64::INFINITY), Some(1.0)).is_err());
    }

    #[test]
    fn test_period_change() {
        assert!((period_change(&[100.0, 90.0, 110.0]).unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(period_change(&[42.0]).unwrap(), 0.0);
        assert!(period_change(&[]).is_err());
        assert!(period_change(&[0.0, 10.0]).is_err());
    }

    #[test]
    fn test_volatility_uses_sample_std_dev() {
        let returns = daily_returns(&[100.0, 110.0, 99.0, 99.0]);
        assert_eq!(returns.len(), 3);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] + 0.1).abs() < 1e-12);
        assert_eq!(returns[2], 0.0);

        // mean 0, squared deviations 0.01 + 0.01 + 0 over n - 1 = 2
        let vol = volatility(&returns).unwrap();
        assert!((vol - 0.1).abs() < 1e-12);

        assert!(volatility(&[0.01]).unwrap_err().is_undefined());
    }

    #[test]
    fn test_sharpe_like_undefined_for_flat_series() {
        let flat = daily_returns(&[10.0, 10.0, 10.0]);
        assert!(sharpe_like(&flat).unwrap_err().is_undefined());

        let returns = [0.01, 0.03];
        let expected = 0.02 / (0.0002_f64).sqrt();
        assert!((sharpe_like(&returns).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_moving_average_alignment() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0)]);

        assert_eq!(moving_average(&[1.0, 2.0], 50), vec![None, None]);
        assert_eq!(moving_average(&[1.0], 0), vec![None]);
    }

    #[test]
    fn test_population_std_dev() {
        let std = population_std_dev(&[1.0, 3.0]).unwrap();
        assert!((std - 1.0).abs() < 1e-12);
        assert!(population_std_dev(&[]).is_err());
    }
}
