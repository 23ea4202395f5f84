/// Centered moving average over `values`.
///
/// The output has the same length as the input. The centre sits at offset
/// `(window - 1) / 2` from the window start, so index `i` averages
/// `[i - (window - 1) / 2, i + window / 2]`: for a window of 30 that is
/// `[i - 14, i + 15]`, for a window of 3 it is `[i - 1, i + 1]`. Positions
/// without a full window are `None`.
pub fn centered_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let lead = (window - 1) / 2;
    for (start, slice) in values.windows(window).enumerate() {
        let sum: f64 = slice.iter().sum();
        out[start + lead] = Some(sum / window as f64);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_has_no_values() {
        let values = vec![1.0; 29];
        assert!(centered_mean(&values, 30).iter().all(Option::is_none));
    }

    #[test]
    fn exact_window_defines_single_center() {
        let values: Vec<f64> = (0..30).map(f64::from).collect();
        let out = centered_mean(&values, 30);

        let defined: Vec<usize> = out
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();
        assert_eq!(defined, vec![14]);
        assert_eq!(out[14], Some(14.5));
    }

    #[test]
    fn window_spans_fourteen_before_and_fifteen_after() {
        let values: Vec<f64> = (0..40).map(f64::from).collect();
        let out = centered_mean(&values, 30);

        for (i, v) in out.iter().enumerate() {
            if (14..=24).contains(&i) {
                // mean of i-14 ..= i+15
                assert_eq!(*v, Some(i as f64 + 0.5), "index {i}");
            } else {
                assert!(v.is_none(), "index {i} should be undefined");
            }
        }
    }

    #[test]
    fn odd_window_is_symmetric() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(
            centered_mean(&values, 3),
            vec![None, Some(2.0), Some(3.0), Some(4.0), None]
        );
    }
}
