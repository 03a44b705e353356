// Threshold tests on the difference of two published figures.
//
// Provider values carry one or two decimals, so their f64 difference can land
// a hair either side of the printed gap. Comparisons allow for that.

const TOLERANCE: f64 = 1e-9;

/// `gap >= threshold`, counting a gap that prints as the threshold.
pub fn reaches(gap: f64, threshold: f64) -> bool {
    gap >= threshold - TOLERANCE
}

/// `gap > threshold`, not counting a gap that prints as the threshold.
pub fn exceeds(gap: f64, threshold: f64) -> bool {
    gap > threshold + TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printed_gap_on_the_threshold_reaches_it() {
        assert!(reaches(32.3 - 27.3, 5.0));
        assert!(reaches(64.1 - 61.1, 3.0));
        assert!(!reaches(32.2 - 27.3, 5.0));
    }

    #[test]
    fn printed_gap_on_the_threshold_does_not_exceed_it() {
        assert!(!exceeds(33.1 - 30.1, 3.0));
        assert!(!exceeds(2.6 - 2.1, 0.5));
        assert!(exceeds(33.2 - 30.1, 3.0));
    }

    #[test]
    fn every_tenth_on_the_threshold_reaches_it() {
        for tenths in 300..700 {
            let a = f64::from(tenths) / 10.0;
            assert!(reaches(a - (a - 5.0), 5.0), "{a}");
            assert!(reaches((a - 5.0 - a).abs(), 5.0), "{a}");
        }
    }
}
