use racing_env::components::QuadState;

/// Assert that every entry of a state is finite
#[track_caller]
pub fn assert_state_finite(state: &QuadState) {
    for (i, v) in state.x.iter().enumerate() {
        assert!(v.is_finite(), "State entry {} is not finite: {}", i, v);
    }
    assert!(state.t.is_finite(), "State time is not finite");
}

/// Assert that a caller buffer still holds its fill value
#[track_caller]
pub fn assert_untouched<T: PartialEq + std::fmt::Debug>(buffer: &[T], fill: T) {
    if let Some(i) = buffer.iter().position(|v| *v != fill) {
        panic!(
            "Buffer was written at index {}: {:?} (expected {:?})",
            i, buffer[i], fill
        );
    }
}

/// Assert two slices are equal bit for bit, not just numerically
#[track_caller]
pub fn assert_bits_eq(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "Length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            a.to_bits(),
            e.to_bits(),
            "Entry {} differs: {} vs {}",
            i,
            a,
            e
        );
    }
}

/// Extremes of a float slice as (min, max)
pub fn extrema(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
