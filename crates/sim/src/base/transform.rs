//! Compressive transform applied to reaction-norm genes.

/// Natural log of 3, the divisor of the transform.
const LN_3: f64 = 1.098_612_288_668_109_8;

/// Symmetric logarithmic compression of a raw gene value.
///
/// `scale(x) = sign(x) * ln(|x| + 1) / ln(3)`. The transform is odd,
/// maps 0 to 0, has unit-order slope near the origin and grows only
/// logarithmically for large magnitudes, so mutation drift in `I0`/`b`
/// genes translates into bounded insulation responses.
#[inline]
pub fn scale(x: f64) -> f64 {
    let magnitude = x.abs().ln_1p() / LN_3;
    if x < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}
