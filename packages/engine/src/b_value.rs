//! Gutenberg–Richter b-value estimation.
//!
//! Uses the Aki maximum-likelihood estimator
//! `b = log10(e) / (mean(M) - Mc)` over magnitudes at or above the
//! completeness cutoff `Mc`.

/// `log10(e)`, rounded as in the classic Aki formula.
#[allow(clippy::approx_constant)]
pub const AKI_CONSTANT: f64 = 0.4343;

/// Estimates the b-value of a magnitude sample.
///
/// Returns `None` when fewer than `min_samples` magnitudes reach `cutoff`.
/// A sample whose mean equals the cutoff exactly returns `1.0` instead of
/// dividing by zero.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn estimate<I>(magnitudes: I, cutoff: f64, min_samples: usize) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (count, sum) = magnitudes
        .into_iter()
        .filter(|m| *m >= cutoff)
        .fold((0_usize, 0.0_f64), |(n, s), m| (n + 1, s + m));

    if count < min_samples {
        return None;
    }

    let mean = sum / count as f64;
    if mean == cutoff {
        return Some(1.0);
    }

    Some(AKI_CONSTANT / (mean - cutoff))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUTOFF: f64 = 3.5;

    #[test]
    fn undefined_below_min_samples() {
        let mags = vec![4.0; 14];
        assert!(estimate(mags, CUTOFF, 15).is_none());
    }

    #[test]
    fn ignores_magnitudes_below_cutoff() {
        let mut mags = vec![4.0; 14];
        mags.extend([2.0, 3.0, 3.4]);
        assert!(estimate(mags, CUTOFF, 15).is_none());
    }

    #[test]
    fn classic_formula() {
        let mags = vec![4.0; 15];
        let b = estimate(mags, CUTOFF, 15).unwrap();
        assert!((b - 0.8686).abs() < 1e-12, "got {b}");
    }

    #[test]
    fn mean_at_cutoff_is_one() {
        let mags = vec![CUTOFF; 20];
        assert_eq!(estimate(mags, CUTOFF, 15), Some(1.0));
    }

    #[test]
    fn higher_mean_means_lower_b() {
        let low = estimate(vec![3.9; 20], CUTOFF, 15).unwrap();
        let high = estimate(vec![4.4; 20], CUTOFF, 15).unwrap();
        assert!(high < low);
    }
}
