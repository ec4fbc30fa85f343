//! Core types and configuration for the attitude filter

use nalgebra::Vector3;

/// One raw triaxial sensor sample, in signed 16-bit LSB units.
///
/// Produced once per tick by the external bus-acquisition drivers for each of
/// the accelerometer, gyroscope, and magnetometer. The filter is agnostic to
/// bus protocol and transaction timing; it only ever sees these parsed
/// triplets.
pub type RawSample = Vector3<i16>;

/// Attitude filter gain and scaling constants.
///
/// The defaults are tuned for raw LSB sensor units rather than physical
/// units, which is why the proportional and integral gains are several orders
/// of magnitude above textbook complementary-filter values: the sensor-unit
/// scaling is baked into the gains. Renormalizing them to literature scale
/// changes the filter numerics.
///
/// # Example
/// ```
/// use marg_ahrs::{AttitudeFilter, FilterGains};
///
/// let gains = FilterGains {
///     kp: 8000.0, // softer proportional correction
///     ..Default::default()
/// };
/// let filter = AttitudeFilter::with_gains(gains);
/// assert_eq!(filter.gains().kp, 8000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterGains {
    /// Proportional gain applied to the reference-vector error
    pub kp: f32,
    /// Integral gain accumulated into the running error sum
    pub ki: f32,
    /// Gyroscope sensitivity in degrees per second per LSB
    pub gyro_sensitivity: f32,
    /// Half of the fixed sample period in seconds
    pub sample_half_period: f32,
}

impl Default for FilterGains {
    fn default() -> Self {
        Self {
            kp: 10000.0,
            ki: 6000.0,
            gyro_sensitivity: 0.00875,
            sample_half_period: 0.05,
        }
    }
}

/// Fatal filter faults.
///
/// The filter never recovers from these inline: a fault means the tick's
/// output would have been derived from corrupted or unusable state, and the
/// embedding control system owns the failsafe response (e.g. disarming
/// actuators). On any fault the persistent attitude state is left exactly as
/// it was before the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    /// Zero-magnitude accelerometer sample; no gravity direction can be
    /// derived from it
    DegenerateAccelerometer,
    /// Magnetometer sample with no component orthogonal to gravity; no
    /// heading direction can be derived from it
    DegenerateMagnetometer,
    /// Not-a-number in the corrected body rates
    DivergedRates,
    /// Non-finite component in the updated quaternion
    DivergedQuaternion,
}

impl core::fmt::Display for FilterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DegenerateAccelerometer => f.write_str("zero-magnitude accelerometer sample"),
            Self::DegenerateMagnetometer => {
                f.write_str("magnetometer sample parallel to gravity estimate")
            }
            Self::DivergedRates => f.write_str("numeric divergence in corrected body rates"),
            Self::DivergedQuaternion => f.write_str("numeric divergence in attitude quaternion"),
        }
    }
}

impl core::error::Error for FilterError {}
