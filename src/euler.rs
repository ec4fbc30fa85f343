//! Quaternion to Euler angle conversion

use nalgebra::{ComplexField, Quaternion, RealField};

use crate::math::RAD_TO_DEG;

/// Euler angles in degrees, derived on demand from the attitude quaternion.
///
/// Never authoritative state; the quaternion is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Converts a unit quaternion to Euler angles in degrees.
///
/// The asin argument is clamped to [-1, 1] so floating-point overshoot of a
/// nominally unit quaternion cannot produce a not-a-number pitch.
///
/// # Example
/// ```
/// use nalgebra::Quaternion;
/// use marg_ahrs::euler_angles_from;
///
/// let identity = Quaternion::new(1.0, 0.0, 0.0, 0.0);
/// let angles = euler_angles_from(&identity);
/// assert_eq!((angles.pitch, angles.yaw, angles.roll), (0.0, 0.0, 0.0));
/// ```
pub fn euler_angles_from(quaternion: &Quaternion<f32>) -> EulerAngles {
    let q0 = quaternion.w;
    let q1 = quaternion.i;
    let q2 = quaternion.j;
    let q3 = quaternion.k;

    let sin_pitch = (-2.0 * q1 * q3 + 2.0 * q0 * q2).clamp(-1.0, 1.0);

    EulerAngles {
        pitch: sin_pitch.asin() * RAD_TO_DEG,
        yaw: (2.0 * q1 * q2 + 2.0 * q0 * q3).atan2(-2.0 * q2 * q2 - 2.0 * q3 * q3 + 1.0)
            * RAD_TO_DEG,
        roll: (2.0 * q2 * q3 + 2.0 * q0 * q1).atan2(-2.0 * q1 * q1 - 2.0 * q2 * q2 + 1.0)
            * RAD_TO_DEG,
    }
}
