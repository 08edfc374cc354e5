//! Fractional ranking with tie tracking.

use crate::error::{Result, TaxCompareError};

/// Ranks of a vector of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranks {
    /// Rank of each value (1-based, in input order).
    pub ranks: Vec<f64>,
    /// Number of values that tied with an earlier value of the same magnitude,
    /// i.e. the sum over tie groups of `group_size - 1`.
    pub ties: usize,
}

impl Ranks {
    /// Check if any values were tied.
    pub fn has_ties(&self) -> bool {
        self.ties > 0
    }
}

/// Rank values in ascending order, averaging the ranks of tied values.
///
/// Two values tied for ranks 3 and 4 both receive rank 3.5.
///
/// # Errors
/// Fails on empty input or if any value is NaN.
pub fn rank(values: &[f64]) -> Result<Ranks> {
    if values.is_empty() {
        return Err(TaxCompareError::EmptyData(
            "Cannot rank an empty vector".to_string(),
        ));
    }
    if let Some(idx) = values.iter().position(|v| v.is_nan()) {
        return Err(TaxCompareError::Numerical(format!(
            "Cannot rank NaN value at position {}",
            idx
        )));
    }

    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut ties = 0;
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // Positions start..=end share the average of ranks start+1..=end+1.
        let avg_rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = avg_rank;
        }
        ties += end - start;
        start = end + 1;
    }

    Ok(Ranks { ranks, ties })
}
