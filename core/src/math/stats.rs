/// Kernel statistics over moment values that may hold a missing marker.
pub struct StatsHelper;

/// Minimum valid samples for a standard deviation or mode.
pub const MIN_VALID_FOR_SDEV: usize = 3;

impl StatsHelper {
    pub fn is_valid(val: f64, missing: f64) -> bool {
        val != missing && val.is_finite()
    }

    /// Mean of the valid samples, `None` if there are none.
    pub fn mean(vals: &[f64], missing: f64) -> Option<f64> {
        let (count, sum) = vals
            .iter()
            .filter(|&&v| Self::is_valid(v, missing))
            .fold((0usize, 0.0), |(n, s), &v| (n + 1, s + v));
        if count == 0 {
            return None;
        }
        Some(sum / count as f64).filter(|mean| mean.is_finite())
    }

    /// Population standard deviation, sqrt(E[x^2] - E[x]^2).
    ///
    /// `None` with fewer than three valid samples, if rounding drives
    /// the variance negative, or if the sums overflow.
    pub fn sdev(vals: &[f64], missing: f64) -> Option<f64> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for &v in vals.iter().filter(|&&v| Self::is_valid(v, missing)) {
            count += 1;
            sum += v;
            sum_sq += v * v;
        }
        if count < MIN_VALID_FOR_SDEV {
            return None;
        }
        let n = count as f64;
        let mean = sum / n;
        let term1 = sum_sq / n;
        let term2 = mean * mean;
        if term1 < term2 {
            return None;
        }
        Some((term1 - term2).sqrt()).filter(|sdev| sdev.is_finite())
    }

    /// Centre of the most populated histogram bin of width `bin_width`.
    ///
    /// Ties go to the lowest bin.
    pub fn mode(vals: &[f64], missing: f64, bin_width: f64) -> Option<f64> {
        if bin_width.is_nan() || bin_width <= 0.0 {
            return None;
        }
        let bin_of = |v: f64| (v / bin_width).floor() as i64;
        let mut n_valid = 0usize;
        let mut best: Option<(i64, usize)> = None;
        for &v in vals.iter().filter(|&&v| Self::is_valid(v, missing)) {
            n_valid += 1;
            let bin = bin_of(v);
            let count = vals
                .iter()
                .filter(|&&w| Self::is_valid(w, missing) && bin_of(w) == bin)
                .count();
            best = match best {
                Some((best_bin, best_count))
                    if best_count > count || (best_count == count && best_bin <= bin) =>
                {
                    Some((best_bin, best_count))
                }
                _ => Some((bin, count)),
            };
        }
        if n_valid < MIN_VALID_FOR_SDEV {
            return None;
        }
        best.map(|(bin, _)| (bin as f64 + 0.5) * bin_width)
    }

    /// Median of the valid samples, using `scratch` as sort space.
    pub fn median(vals: &[f64], missing: f64, scratch: &mut Vec<f64>) -> Option<f64> {
        scratch.clear();
        scratch.extend(vals.iter().copied().filter(|&v| Self::is_valid(v, missing)));
        if scratch.is_empty() {
            return None;
        }
        scratch.sort_by(|a, b| a.total_cmp(b));
        let mid = scratch.len() / 2;
        if scratch.len() % 2 == 0 {
            Some((scratch[mid - 1] + scratch[mid]) / 2.0)
        } else {
            Some(scratch[mid])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const MISS: f64 = -9999.0;

    #[test]
    fn mean_skips_missing() {
        assert_eq!(StatsHelper::mean(&[1.0, MISS, 3.0], MISS), Some(2.0));
        assert_eq!(StatsHelper::mean(&[MISS, MISS], MISS), None);
        assert_eq!(StatsHelper::mean(&[], MISS), None);
    }

    #[test]
    fn sdev_of_constant_is_zero() {
        assert_eq!(StatsHelper::sdev(&[10.0; 9], MISS), Some(0.0));
    }

    #[test]
    fn sdev_needs_three_valid_samples() {
        assert_eq!(StatsHelper::sdev(&[1.0, 2.0, MISS, MISS], MISS), None);
        assert!(StatsHelper::sdev(&[1.0, 2.0, 3.0, MISS], MISS).is_some());
    }

    #[test]
    fn overflowing_sums_give_none() {
        assert_eq!(StatsHelper::sdev(&[1.0e200; 9], MISS), None);
        assert_eq!(StatsHelper::mean(&[1.0e308; 4], MISS), None);
    }

    #[test]
    fn sdev_of_alternating_values() {
        let vals = [10.0, 12.0, 10.0, 12.0];
        assert_abs_diff_eq!(StatsHelper::sdev(&vals, MISS).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_counts_as_missing() {
        assert_eq!(StatsHelper::mean(&[f64::NAN, 4.0], MISS), Some(4.0));
    }

    #[test]
    fn mode_picks_most_populated_bin() {
        let vals = [10.2, 10.7, 10.1, 14.0, 3.0, MISS];
        assert_abs_diff_eq!(
            StatsHelper::mode(&vals, MISS, 1.0).unwrap(),
            10.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn mode_ties_resolve_to_lowest_bin() {
        let vals = [5.5, 5.2, 1.1, 1.9, 8.0];
        assert_abs_diff_eq!(
            StatsHelper::mode(&vals, MISS, 1.0).unwrap(),
            1.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn mode_needs_three_valid_samples() {
        assert_eq!(StatsHelper::mode(&[1.0, 1.0, MISS], MISS, 1.0), None);
        assert_eq!(StatsHelper::mode(&[1.0, 1.0, 1.0], MISS, 0.0), None);
    }

    #[test]
    fn median_handles_even_and_odd_counts() {
        let mut scratch = Vec::new();
        assert_eq!(
            StatsHelper::median(&[3.0, 1.0, MISS, 2.0], MISS, &mut scratch),
            Some(2.0)
        );
        assert_eq!(
            StatsHelper::median(&[4.0, 1.0, 3.0, 2.0], MISS, &mut scratch),
            Some(2.5)
        );
        assert_eq!(StatsHelper::median(&[MISS], MISS, &mut scratch), None);
    }
}
