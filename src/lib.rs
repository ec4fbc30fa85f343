#![no_std]

//! Mahony-style attitude estimation for raw MARG sensor data.
//!
//! This crate fuses noisy triaxial accelerometer, gyroscope, and magnetometer
//! readings into a real-time orientation estimate for a motion-control
//! consumer such as a flight controller. Sensor acquisition stays outside:
//! bus drivers hand the filter one already-parsed signed 16-bit sample
//! triplet per tick, and the filter maintains a persistent unit quaternion
//! plus an integral error accumulator.
//!
//! # Features
//!
//! - Complementary (Mahony-style) quaternion filter driven by gravity and
//!   tilt-compensated magnetic reference directions
//! - Gains pre-scaled for raw LSB sensor units
//! - Fatal fault codes instead of silent recovery when the numerics diverge
//! - On-demand Euler angle conversion
//! - Windowed trimmed-range magnetometer bias estimation
//! - `#![no_std]` compatible for embedded targets
//!
//! # Quick Start
//!
//! ```rust
//! use marg_ahrs::{AttitudeFilter, FilterError, MagnetometerCalibrator, RawSample};
//!
//! let mut filter = AttitudeFilter::new();
//! let mut calibrator = MagnetometerCalibrator::new();
//!
//! // One tick's raw samples, as delivered by the sensor bus drivers.
//! let accelerometer = RawSample::new(0, 0, 1000); // gravity on +Z
//! let gyroscope = RawSample::new(0, 0, 0);
//! let magnetometer = RawSample::new(400, 30, -250);
//!
//! // Refine the magnetometer bias estimate, then fuse.
//! let (_offsets, _amplitudes) = calibrator.correct_all(magnetometer);
//! filter.update(accelerometer, gyroscope, magnetometer)?;
//!
//! let angles = filter.euler_angles();
//! assert!(angles.pitch.abs() < 1.0);
//! # Ok::<(), FilterError>(())
//! ```
//!
//! A fault from [`AttitudeFilter::update`] is fatal for the tick: the filter
//! state is untouched and the embedding system owns the failsafe response.

pub mod calibration;
mod euler;
mod filter;
mod math;
mod types;

pub use calibration::{
    Axis, CalibrationWindow, MagnetometerCalibrator, WINDOW_SIZE, apply_deadband,
    apply_magnetic_bias,
};
pub use euler::{EulerAngles, euler_angles_from};
pub use filter::AttitudeFilter;
pub use math::{DEG_TO_RAD, RAD_TO_DEG, fast_inverse_sqrt, fast_normalize,
    fast_normalize_quaternion};
pub use types::{FilterError, FilterGains, RawSample};
