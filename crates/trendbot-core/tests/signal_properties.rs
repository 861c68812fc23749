//! 신호 엔진 속성 테스트.

use proptest::prelude::*;
use trendbot_core::{compute_signal, PriceSample, PriceSeries, SignalError};

fn sample_strategy() -> impl Strategy<Value = PriceSample> {
    prop_oneof![
        8 => (1.0f64..10_000.0).prop_map(PriceSample::close),
        1 => Just(PriceSample::missing()),
        1 => Just(PriceSample::close(f64::NAN)),
    ]
}

proptest! {
    #[test]
    fn moving_average_within_window_bounds(
        samples in prop::collection::vec(sample_strategy(), 0..300),
        window in 1usize..50,
    ) {
        let series = PriceSeries::with_samples("SPY", samples);
        let valid = series.valid_closes();

        match compute_signal("SPY", &series, window) {
            Ok(signal) => {
                let recent = &valid[valid.len() - window..];
                let min = recent.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = recent.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

                prop_assert!(signal.moving_average >= min - 1e-6);
                prop_assert!(signal.moving_average <= max + 1e-6);
                prop_assert_eq!(signal.last_close, *valid.last().unwrap());
                prop_assert_eq!(signal.below_average, signal.last_close < signal.moving_average);
            }
            Err(SignalError::InsufficientData { required, available }) => {
                prop_assert_eq!(required, window);
                prop_assert_eq!(available, valid.len());
                prop_assert!(available < window);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
