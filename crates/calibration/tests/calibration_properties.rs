use calibration::{CalibrationStatus, Calibrator, TemporalSmoother};
use feature_engine::{NormalizedFeatures, RawFeatures};
use proptest::prelude::*;

fn feature() -> impl Strategy<Value = [f32; 4]> {
    prop::array::uniform4(0.0f32..3.0)
}

#[test]
fn calibrated_baseline_normalizes_to_zero_mean() {
    proptest!(|(frames in prop::collection::vec(feature(), 25))| {
        let mut calibrator = Calibrator::default();
        let mut params = None;
        for f in &frames {
            if let CalibrationStatus::Complete(p) = calibrator.calibrate(&RawFeatures::new(*f)) {
                params = Some(p);
            }
        }
        let params = params.expect("25 frames complete calibration");

        let mut sums = [0.0f64; 4];
        for f in &frames {
            let normalized = params.normalize(&RawFeatures::new(*f));
            prop_assert!(normalized.is_finite());
            for (sum, v) in sums.iter_mut().zip(normalized.values()) {
                *sum += v as f64;
            }
        }
        // Zero-deviation features also normalize to exactly zero
        for sum in sums {
            prop_assert!((sum / 25.0).abs() < 1e-2);
        }
    });
}

#[test]
fn smoothed_values_stay_within_input_range() {
    proptest!(|(inputs in prop::collection::vec(-10.0f32..10.0, 1..50))| {
        let mut smoother = TemporalSmoother::default();
        let mut last = 0.0;
        for &x in &inputs {
            last = smoother.smooth(&NormalizedFeatures::new([x; 4])).ear();
        }

        let lo = inputs.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = inputs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        prop_assert!(last >= lo - 1e-4 && last <= hi + 1e-4);
    });
}
