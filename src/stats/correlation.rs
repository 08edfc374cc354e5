//! Pearson and Spearman correlation coefficients.

use super::rank::rank;
use crate::error::{Result, TaxCompareError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signature shared by the correlation functions.
pub type CorrelationFn = fn(&[f64], &[f64]) -> Result<f64>;

/// Correlation coefficient used to compare two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationType {
    /// Pearson product-moment correlation.
    #[default]
    Pearson,
    /// Spearman rank correlation.
    Spearman,
}

impl CorrelationType {
    /// All supported correlation types.
    pub const ALL: [CorrelationType; 2] = [CorrelationType::Pearson, CorrelationType::Spearman];

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
        }
    }

    /// The function computing this coefficient.
    pub fn function(&self) -> CorrelationFn {
        match self {
            Self::Pearson => pearson,
            Self::Spearman => spearman,
        }
    }

    /// Correlate two equal-length vectors.
    pub fn correlate(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        (self.function())(x, y)
    }
}

impl fmt::Display for CorrelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CorrelationType {
    type Err = TaxCompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            _ => Err(TaxCompareError::InvalidConfiguration(format!(
                "Invalid correlation type '{}'. Must be one of: {}",
                s,
                Self::ALL.map(|c| c.name()).join(", ")
            ))),
        }
    }
}

/// Pearson product-moment correlation coefficient.
///
/// Returns NaN when either vector is constant.
///
/// # Errors
/// Fails if the vectors differ in length or hold fewer than two values.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(TaxCompareError::Cardinality(format!(
            "Vectors must be the same length for pearson correlation ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(TaxCompareError::Cardinality(
            "Vectors must contain at least two values for pearson correlation".to_string(),
        ));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x > 0.0 && var_y > 0.0 {
        // Rounding can push |r| a hair past 1 for perfectly correlated input.
        Ok((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
    } else {
        Ok(f64::NAN)
    }
}

/// Spearman rank correlation coefficient.
///
/// Without ties the closed form `1 - 6 * sum(d^2) / (n * (n^2 - 1))` is used;
/// when either vector has ties the Pearson correlation of the ranks is
/// returned instead, which is the tie-corrected coefficient.
///
/// # Errors
/// Fails on empty input, NaN values or vectors of different lengths.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.is_empty() || y.is_empty() {
        return Err(TaxCompareError::EmptyData(
            "Vectors must not be empty for spearman correlation".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(TaxCompareError::Cardinality(format!(
            "Vectors must be the same length for spearman correlation ({} vs {})",
            x.len(),
            y.len()
        )));
    }

    let rank_x = rank(x)?;
    let rank_y = rank(y)?;

    if rank_x.has_ties() || rank_y.has_ties() {
        return pearson(&rank_x.ranks, &rank_y.ranks);
    }

    let n = x.len() as f64;
    let sum_d2: f64 = rank_x
        .ranks
        .iter()
        .zip(rank_y.ranks.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    Ok(1.0 - 6.0 * sum_d2 / (n * (n * n - 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pearson_perfect() {
        assert_relative_eq!(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_symmetric() {
        let x = [0.1, 0.7, 0.3, 0.05, 0.9];
        let y = [0.2, 0.4, 0.5, 0.1, 0.6];
        assert_eq!(pearson(&x, &y).unwrap(), pearson(&y, &x).unwrap());
    }

    #[test]
    fn test_pearson_known_value() {
        let r = pearson(&[0.4, 0.5, 0.4], &[0.5, 0.6, 0.4]).unwrap();
        assert_relative_eq!(r, 3.0_f64.sqrt() / 2.0, epsilon = 1e-9);
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(r, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_constant_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap().is_nan());
    }

    #[test]
    fn test_pearson_invalid_input() {
        assert!(matches!(
            pearson(&[1.4, 2.5], &[5.6, 8.8, 9.0]),
            Err(TaxCompareError::Cardinality(_))
        ));
        assert!(matches!(
            pearson(&[1.4], &[5.6]),
            Err(TaxCompareError::Cardinality(_))
        ));
    }

    #[test]
    fn test_spearman_identity() {
        let x = [0.3, 0.1, 0.8, 0.8, 0.2];
        assert_relative_eq!(spearman(&x, &x).unwrap(), 1.0, epsilon = 1e-12);
        let x = [5.0, 1.0, 3.0];
        assert_relative_eq!(spearman(&x, &x).unwrap(), 1.0);
    }

    #[test]
    fn test_spearman_no_ties() {
        // ranks x: 1 2 3 4 5, ranks y: 2 1 4 3 5 -> sum d^2 = 4
        let r = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[0.2, 0.1, 0.4, 0.3, 0.5]).unwrap();
        assert_relative_eq!(r, 0.8, epsilon = 1e-12);
        let r = spearman(&[1.0, 2.0, 3.0], &[30.0, 20.0, 10.0]).unwrap();
        assert_relative_eq!(r, -1.0);
    }

    #[test]
    fn test_spearman_with_ties() {
        let r = spearman(&[0.4, 0.5, 0.4], &[0.5, 0.6, 0.4]).unwrap();
        assert_relative_eq!(r, 0.866025, epsilon = 1e-6);
        assert_relative_eq!(r, 3.0_f64.sqrt() / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spearman_invalid_input() {
        assert!(matches!(spearman(&[], &[]), Err(TaxCompareError::EmptyData(_))));
        assert!(matches!(
            spearman(&[1.0, 2.0], &[1.0]),
            Err(TaxCompareError::Cardinality(_))
        ));
        assert!(spearman(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_correlation_type_parse() {
        assert_eq!("pearson".parse::<CorrelationType>().unwrap(), CorrelationType::Pearson);
        assert_eq!("Spearman".parse::<CorrelationType>().unwrap(), CorrelationType::Spearman);
        match "foo".parse::<CorrelationType>() {
            Err(TaxCompareError::InvalidConfiguration(msg)) => {
                assert!(msg.ends_with("Must be one of: pearson, spearman"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(CorrelationType::default(), CorrelationType::Pearson);
    }

    #[test]
    fn test_correlation_type_dispatch() {
        let x = [0.4, 0.5, 0.4];
        let y = [0.5, 0.6, 0.4];
        assert_eq!(
            CorrelationType::Pearson.correlate(&x, &y).unwrap(),
            pearson(&x, &y).unwrap()
        );
        assert_eq!(
            CorrelationType::Spearman.correlate(&x, &y).unwrap(),
            spearman(&x, &y).unwrap()
        );
    }
}
