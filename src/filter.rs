//! Mahony-style complementary attitude filter
//!
//! Fuses one raw (accelerometer, gyroscope, magnetometer) sample triplet per
//! tick into a persistent unit quaternion. Gravity and the horizontal
//! magnetic field serve as reference directions; the cross-product
//! discrepancy between their predicted and measured body-frame directions
//! drives a proportional-integral correction of the gyroscope rates before
//! first-order quaternion integration.

use nalgebra::{Quaternion, Vector3};

use crate::euler::{EulerAngles, euler_angles_from};
use crate::math::{DEG_TO_RAD, fast_normalize, fast_normalize_quaternion};
use crate::types::{FilterError, FilterGains, RawSample};

/// Attitude estimator state: unit quaternion plus integral error accumulator.
///
/// One instance per estimated body, created at startup and updated once per
/// tick for the life of the process. The quaternion starts at identity and
/// holds unit norm after every successful [`update`](Self::update); the
/// integral accumulator starts at zero and is never reset outside a full
/// [`reset`](Self::reset).
///
/// There is no internal synchronization: callers must guarantee exclusive,
/// sequential invocation per tick. No update blocks or allocates, so each
/// tick is a short, bounded computation suitable for hard real-time
/// deadlines.
pub struct AttitudeFilter {
    /// Gain and scaling constants
    gains: FilterGains,
    /// Quaternion integration scale, derived once from the gains
    rate_scale: f32,
    /// Current orientation (w, x, y, z), unit norm
    quaternion: Quaternion<f32>,
    /// Running sum of the integral correction error
    integral_error: Vector3<f32>,
}

impl AttitudeFilter {
    /// Creates a filter with the default gains at the identity orientation.
    pub fn new() -> Self {
        Self::with_gains(FilterGains::default())
    }

    /// Creates a filter with explicit gains.
    pub fn with_gains(gains: FilterGains) -> Self {
        Self {
            gains,
            rate_scale: gains.gyro_sensitivity * gains.sample_half_period * DEG_TO_RAD,
            quaternion: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            integral_error: Vector3::zeros(),
        }
    }

    /// Restarts the filter: identity quaternion, zero integral accumulator.
    pub fn reset(&mut self) {
        self.quaternion = Quaternion::new(1.0, 0.0, 0.0, 0.0);
        self.integral_error = Vector3::zeros();
    }

    /// Current orientation quaternion.
    pub fn quaternion(&self) -> Quaternion<f32> {
        self.quaternion
    }

    /// Current integral error accumulator.
    pub fn integral_error(&self) -> Vector3<f32> {
        self.integral_error
    }

    /// Configured gains.
    pub fn gains(&self) -> FilterGains {
        self.gains
    }

    /// Euler angles of the current orientation, in degrees.
    pub fn euler_angles(&self) -> EulerAngles {
        euler_angles_from(&self.quaternion)
    }

    /// Fuses one tick's raw sensor triplet into the attitude state.
    ///
    /// On success the quaternion and integral accumulator are committed as
    /// the new persistent state. On any error the state is left untouched:
    /// a degenerate sample cannot produce a reference direction, and a
    /// not-a-number in the corrected rates or a non-finite component in the
    /// updated quaternion means the attitude would be corrupted, which is
    /// fatal for a motion-control consumer.
    pub fn update(
        &mut self,
        accelerometer: RawSample,
        gyroscope: RawSample,
        magnetometer: RawSample,
    ) -> Result<(), FilterError> {
        // Measured gravity direction.
        let mut a = accelerometer.map(f32::from);
        if a.norm_squared() == 0.0 {
            return Err(FilterError::DegenerateAccelerometer);
        }
        fast_normalize(&mut a);

        // Measured heading direction: strip the gravity-aligned component of
        // the field so only the horizontal part contributes to yaw
        // correction, without building a full rotation matrix.
        let mut m = magnetometer.map(f32::from);
        m -= a * m.dot(&a);
        if m.norm_squared() == 0.0 {
            return Err(FilterError::DegenerateMagnetometer);
        }
        fast_normalize(&mut m);

        let q0 = self.quaternion.w;
        let q1 = self.quaternion.i;
        let q2 = self.quaternion.j;
        let q3 = self.quaternion.k;

        // Predicted gravity (third rotation-matrix row) and horizontal field
        // (first row) in the body frame.
        let predicted_gravity = Vector3::new(
            2.0 * (q1 * q3 - q0 * q2),
            2.0 * (q0 * q1 + q2 * q3),
            q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3,
        );
        let predicted_field = Vector3::new(
            q0 * q0 + q1 * q1 - q2 * q2 - q3 * q3,
            2.0 * (q1 * q2 - q0 * q3),
            2.0 * (q1 * q3 + q0 * q2),
        );

        let error = predicted_gravity.cross(&a) + predicted_field.cross(&m);

        let integral_error = self.integral_error + error * self.gains.ki;
        let rates = gyroscope.map(f32::from) + error * self.gains.kp + integral_error;

        if rates.x.is_nan() || rates.y.is_nan() || rates.z.is_nan() {
            return Err(FilterError::DivergedRates);
        }

        // First-order integration of the quaternion derivative, every
        // component from the pre-update snapshot.
        let (gx, gy, gz) = (rates.x, rates.y, rates.z);
        let mut q = Quaternion::new(
            q0 + (-q1 * gx - q2 * gy - q3 * gz) * self.rate_scale,
            q1 + (q0 * gx + q2 * gz - q3 * gy) * self.rate_scale,
            q2 + (q0 * gy - q1 * gz + q3 * gx) * self.rate_scale,
            q3 + (q0 * gz + q1 * gy - q2 * gx) * self.rate_scale,
        );
        fast_normalize_quaternion(&mut q);

        // Overflowed components normalize to infinities rather than NaN, so
        // the committed quaternion must be finite, not merely non-NaN.
        if !(q.w.is_finite() && q.i.is_finite() && q.j.is_finite() && q.k.is_finite()) {
            return Err(FilterError::DivergedQuaternion);
        }

        self.quaternion = q;
        self.integral_error = integral_error;
        Ok(())
    }
}

impl Default for AttitudeFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::ComplexField;

    const ONE_G: RawSample = RawSample::new(0, 0, 1000);
    const NORTH: RawSample = RawSample::new(1000, 0, 0);
    const STILL: RawSample = RawSample::new(0, 0, 0);

    /// Residual of a single fast-inverse-sqrt normalization pass.
    const UNIT_NORM_TOLERANCE: f32 = 5e-3;

    #[test]
    fn test_new_filter_is_identity() {
        let filter = AttitudeFilter::new();
        assert_eq!(filter.quaternion(), Quaternion::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(filter.integral_error(), Vector3::zeros());
    }

    #[test]
    fn test_zero_rotation_fixed_point() {
        // Accel and mag exactly match the identity quaternion's predicted
        // reference directions, so the error vector is exactly zero and the
        // state may only move by renormalization residue.
        let mut filter = AttitudeFilter::new();
        for _ in 0..100 {
            filter.update(ONE_G, STILL, NORTH).unwrap();
        }

        let q = filter.quaternion();
        assert!((q.w - 1.0).abs() < UNIT_NORM_TOLERANCE);
        assert!(q.i.abs() < 1e-6);
        assert!(q.j.abs() < 1e-6);
        assert!(q.k.abs() < 1e-6);
        assert_eq!(filter.integral_error(), Vector3::zeros());
    }

    #[test]
    fn test_quaternion_stays_unit_norm() {
        let mut filter = AttitudeFilter::new();
        let accel = RawSample::new(30, -40, 990);
        let gyro = RawSample::new(12, -7, 4);
        let mag = RawSample::new(410, 80, -230);

        for _ in 0..500 {
            filter.update(accel, gyro, mag).unwrap();
            assert!((filter.quaternion().norm() - 1.0).abs() < UNIT_NORM_TOLERANCE);
        }
    }

    #[test]
    fn test_degenerate_accelerometer_is_fatal() {
        let mut filter = AttitudeFilter::new();
        let before = filter.quaternion();

        let result = filter.update(STILL, STILL, NORTH);
        assert_eq!(result, Err(FilterError::DegenerateAccelerometer));
        assert_eq!(filter.quaternion(), before);
    }

    #[test]
    fn test_degenerate_magnetometer_is_fatal() {
        let mut filter = AttitudeFilter::new();
        let result = filter.update(ONE_G, STILL, STILL);
        assert_eq!(result, Err(FilterError::DegenerateMagnetometer));
    }

    #[test]
    fn test_nan_rates_are_fatal_and_state_is_preserved() {
        // At the fixed point the error vector is exactly zero, so an
        // infinite integral gain turns the accumulation into 0 * inf = NaN.
        let gains = FilterGains {
            ki: f32::INFINITY,
            ..Default::default()
        };
        let mut filter = AttitudeFilter::with_gains(gains);
        let before = filter.quaternion();

        let result = filter.update(ONE_G, STILL, NORTH);
        assert_eq!(result, Err(FilterError::DivergedRates));
        assert_eq!(filter.quaternion(), before);
        assert_eq!(filter.integral_error(), Vector3::zeros());
    }

    #[test]
    fn test_overflowed_quaternion_is_fatal() {
        // Sub-unit error components times a huge proportional gain stay
        // finite, but the integrated quaternion components are large enough
        // that the norm's sum of squares overflows to infinity and
        // normalization yields infinite components. The guard must reject
        // them even though nothing is NaN.
        let gains = FilterGains {
            kp: f32::MAX,
            ki: 0.0,
            ..Default::default()
        };
        let mut filter = AttitudeFilter::with_gains(gains);
        let before = filter.quaternion();

        let result = filter.update(
            RawSample::new(600, 600, 600),
            STILL,
            RawSample::new(500, -300, 400),
        );
        assert_eq!(result, Err(FilterError::DivergedQuaternion));
        assert_eq!(filter.quaternion(), before);
        assert!(filter.quaternion().norm().is_finite());
    }

    #[test]
    fn test_nan_quaternion_is_fatal() {
        // A field strongly opposed to the predicted heading pushes one error
        // component above 1, so the proportional path overflows that rate to
        // infinity. The infinite rate passes the rate guard, then 0 * inf
        // inside the integration produces a NaN quaternion.
        let gains = FilterGains {
            kp: f32::MAX,
            ki: 0.0,
            ..Default::default()
        };
        let mut filter = AttitudeFilter::with_gains(gains);
        let before = filter.quaternion();

        let result = filter.update(
            RawSample::new(600, 600, 600),
            STILL,
            RawSample::new(100, 0, -800),
        );
        assert_eq!(result, Err(FilterError::DivergedQuaternion));
        assert_eq!(filter.quaternion(), before);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut filter = AttitudeFilter::new();
        for _ in 0..20 {
            filter
                .update(RawSample::new(100, 200, 970), RawSample::new(50, 0, -30), NORTH)
                .unwrap();
        }

        filter.reset();
        assert_eq!(filter.quaternion(), Quaternion::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(filter.integral_error(), Vector3::zeros());
    }

    #[test]
    fn test_rate_scale_derivation() {
        let filter = AttitudeFilter::new();
        let expected = 0.00875 * 0.05 * DEG_TO_RAD;
        assert!((filter.rate_scale - expected).abs() < 1e-12);
    }
}
