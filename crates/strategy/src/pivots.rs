//! Local extrema over a symmetric window.

use crate::error::StrategyError;

fn check_window(left: usize, right: usize) -> Result<(), StrategyError> {
    if left < 1 || right < 1 {
        return Err(StrategyError::invalid_params(format!(
            "pivot window must be >= 1 on both sides (left={left}, right={right})"
        )));
    }
    Ok(())
}

fn pivots_by(
    values: &[f64],
    left: usize,
    right: usize,
    is_extreme: impl Fn(f64, f64) -> bool,
) -> Result<Vec<usize>, StrategyError> {
    check_window(left, right)?;
    if values.len() < left + right + 1 {
        return Ok(Vec::new());
    }

    let pivots = (left..values.len() - right)
        .filter(|&i| {
            let value = values[i];
            values[i - left..=i + right]
                .iter()
                .all(|&other| !is_extreme(other, value))
        })
        .collect();
    Ok(pivots)
}

/// Indices `i` with `value[i] == min(value[i-left ..= i+right])`, ascending.
///
/// Equal minima inside one window all qualify.
///
/// # Errors
/// Returns [`StrategyError::InvalidParams`] when `left` or `right` is zero.
pub fn pivot_lows(values: &[f64], left: usize, right: usize) -> Result<Vec<usize>, StrategyError> {
    pivots_by(values, left, right, |other, value| other < value)
}

/// Indices `i` with `value[i] == max(value[i-left ..= i+right])`, ascending.
///
/// Equal maxima inside one window all qualify.
///
/// # Errors
/// Returns [`StrategyError::InvalidParams`] when `left` or `right` is zero.
pub fn pivot_highs(values: &[f64], left: usize, right: usize) -> Result<Vec<usize>, StrategyError> {
    pivots_by(values, left, right, |other, value| other > value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pivot_lows_reference() {
        let values = [5.0, 4.0, 3.0, 4.0, 5.0, 2.0, 3.0, 4.0];
        assert_eq!(pivot_lows(&values, 1, 1).unwrap(), vec![2, 5]);
    }

    #[test]
    fn test_pivot_highs_reference() {
        let values = [1.0, 3.0, 2.0, 4.0, 1.0, 5.0, 3.0];
        assert_eq!(pivot_highs(&values, 1, 1).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_ties_all_qualify() {
        let values = [3.0, 1.0, 1.0, 3.0];
        assert_eq!(pivot_lows(&values, 1, 1).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_edges_excluded() {
        let values = [1.0, 2.0, 3.0, 2.0, 1.0];
        assert_eq!(pivot_lows(&values, 1, 1).unwrap(), Vec::<usize>::new());
        assert_eq!(pivot_highs(&values, 2, 2).unwrap(), vec![2]);
        assert!(pivot_highs(&values, 3, 2).unwrap().is_empty());
    }

    #[test]
    fn test_short_input_is_empty() {
        assert!(pivot_lows(&[], 1, 1).unwrap().is_empty());
        assert!(pivot_highs(&[1.0, 2.0], 1, 1).unwrap().is_empty());
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            pivot_lows(&[1.0, 2.0, 3.0], 0, 1),
            Err(StrategyError::InvalidParams(_))
        ));
        assert!(pivot_highs(&[1.0, 2.0, 3.0], 1, 0).is_err());
    }

    proptest! {
        #[test]
        fn prop_pivots_are_window_extrema(
            values in prop::collection::vec(-50.0f64..50.0, 0..80),
            left in 1usize..5,
            right in 1usize..5,
        ) {
            let lows = pivot_lows(&values, left, right).unwrap();
            let highs = pivot_highs(&values, left, right).unwrap();

            prop_assert!(lows.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(highs.windows(2).all(|w| w[0] < w[1]));

            for &i in &lows {
                prop_assert!(i >= left && i + right < values.len());
                let window = &values[i - left..=i + right];
                prop_assert!(window.iter().all(|&v| v >= values[i]));
            }
            for &i in &highs {
                prop_assert!(i >= left && i + right < values.len());
                let window = &values[i - left..=i + right];
                prop_assert!(window.iter().all(|&v| v <= values[i]));
            }
        }
    }
}
