//! Fast normalization primitives shared by the attitude filter

use nalgebra::{Quaternion, Vector3};

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Fast inverse square root: approximates `1/sqrt(x)`.
///
/// Bit-pattern reinterpretation seed (the Quake magic constant) followed by a
/// single Newton-Raphson refinement, giving roughly 0.17% maximum relative
/// error. Branch-free and deterministic; assumes IEEE-754 single precision.
///
/// The input must be positive. Callers feed sums of squared components and
/// are responsible for rejecting zero-magnitude vectors beforehand.
#[inline]
pub fn fast_inverse_sqrt(x: f32) -> f32 {
    let half_x = 0.5 * x;
    let i = 0x5f3759df_u32.wrapping_sub(x.to_bits() >> 1);
    let y = f32::from_bits(i);
    y * (1.5 - half_x * y * y)
}

/// Normalizes a vector to unit length in place using [`fast_inverse_sqrt`].
///
/// A zero-magnitude input is a precondition violation and produces an
/// unusable scale factor; callers must reject it first.
#[inline]
pub fn fast_normalize(vector: &mut Vector3<f32>) {
    let scale = fast_inverse_sqrt(vector.norm_squared());
    *vector *= scale;
}

/// Normalizes a quaternion to unit norm in place using [`fast_inverse_sqrt`].
#[inline]
pub fn fast_normalize_quaternion(quaternion: &mut Quaternion<f32>) {
    let scale = fast_inverse_sqrt(quaternion.norm_squared());
    quaternion.coords *= scale;
}
