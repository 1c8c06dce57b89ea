//! Summary Statistics over Calibration Samples

/// Summary of one feature's calibration samples
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryStats {
    /// Mean value
    pub mean: f32,
    /// Population standard deviation
    pub std_dev: f32,
    /// Minimum value
    pub min: f32,
    /// Maximum value
    pub max: f32,
}

impl SummaryStats {
    /// Compute summary statistics from a slice of values
    pub fn compute(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;

        // Accumulate in f64; identical f32 samples still yield std == 0
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        let min = values.iter().copied().fold(f32::MAX, f32::min);
        let max = values.iter().copied().fold(f32::MIN, f32::max);

        Self {
            mean: mean as f32,
            std_dev: variance.sqrt() as f32,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let stats = SummaryStats::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((stats.mean - 3.0).abs() < 0.001);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_population_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = SummaryStats::compute(&values);
        // Population (not sample) deviation is exactly 2 here
        assert!((stats.std_dev - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_values() {
        let stats = SummaryStats::compute(&[0.3; 25]);
        assert_eq!(stats.std_dev, 0.0);
        assert!((stats.mean - 0.3).abs() < 1e-7);
    }

    #[test]
    fn test_empty_values() {
        let stats = SummaryStats::compute(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
    }
}
