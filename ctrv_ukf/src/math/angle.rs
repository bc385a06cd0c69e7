use core::f64::consts::{PI, TAU};

/// Wrap an angle into the half-open interval (-π, π].
///
/// Closed form, so arbitrarily large inputs cost the same as small ones.
/// Non-finite input yields NaN.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}
