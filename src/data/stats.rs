//! Small descriptive statistics used by the review view and the box plots.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator), `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - m;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// For each value, whether `|v - mean| / std <= threshold`.
///
/// When the standard deviation is zero or undefined no value is an outlier.
pub fn zscore_mask(values: &[f64], threshold: f64) -> Vec<bool> {
    let (Some(m), Some(sd)) = (mean(values), sample_std(values)) else {
        return vec![true; values.len()];
    };
    if sd == 0.0 || !sd.is_finite() {
        return vec![true; values.len()];
    }
    values
        .iter()
        .map(|v| ((v - m) / sd).abs() <= threshold)
        .collect()
}

/// Linear-interpolated quantile of already sorted values, `p` in `[0, 1]`.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Five-number summary with Tukey whiskers (1.5 × IQR, clamped to data).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub count: usize,
}

impl BoxSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let fence = 1.5 * (q3 - q1);
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|v| *v >= q1 - fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= q3 + fence)
            .unwrap_or(q3);

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            count: sorted.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_sample_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        let sd = sample_std(&values).unwrap();
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn zscore_flags_far_values() {
        let mut values = vec![10.0; 20];
        values.push(1000.0);
        let mask = zscore_mask(&values, 3.0);
        assert_eq!(mask.iter().filter(|keep| !**keep).count(), 1);
        assert!(!mask[20]);
    }

    #[test]
    fn zscore_with_constant_values_keeps_everything() {
        assert_eq!(zscore_mask(&[3.0, 3.0, 3.0], 3.0), vec![true; 3]);
        assert_eq!(zscore_mask(&[3.0], 3.0), vec![true]);
        assert!(zscore_mask(&[], 3.0).is_empty());
    }

    #[test]
    fn box_summary_uses_tukey_whiskers() {
        let summary = BoxSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(summary.q1, 2.25);
        assert_eq!(summary.median, 3.5);
        assert_eq!(summary.q3, 4.75);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 5.0);
        assert_eq!(summary.count, 6);
        assert!(BoxSummary::from_values(&[]).is_none());
    }
}
