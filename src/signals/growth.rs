//! Percentage growth between two observations

/// Percent change from `past` to `present`.
///
/// A zero `past` yields `0.0` instead of dividing by zero.
pub fn percent_change(past: f64, present: f64) -> f64 {
    if past == 0.0 {
        return 0.0;
    }
    (present - past) / past * 100.0
}
