/// Commercial grid for repaired prices (EUR).
pub const PRICE_ROUNDING_STEP: f64 = 10.0;

/// Prices closer than this are treated as equal.
pub const PRICE_TOLERANCE: f64 = 1e-6;

/// Nearest multiple of `step`; exact halves go to the even multiple.
///
/// `185.0` on a step of 10 becomes `180.0`, `195.0` becomes `200.0`.
pub fn round_to_grid(value: f64, step: f64) -> f64 {
    step * (value / step).round_ties_even()
}

/// Smallest grid value a repaired price may take for `required`: the nearest
/// grid value, or the next step up when the nearest one falls below the
/// requirement.
pub fn lift_to_grid(required: f64, step: f64) -> f64 {
    let nearest = round_to_grid(required, step);
    if nearest < required - PRICE_TOLERANCE {
        nearest + step
    } else {
        nearest
    }
}

/// Nearest multiple of `step`, halves rounding up.
pub fn round_half_up(value: f64, step: f64) -> f64 {
    let quotient = value / step;
    let lower = quotient.floor();
    if quotient - lower < 0.5 {
        lower * step
    } else {
        (lower + 1.0) * step
    }
}
