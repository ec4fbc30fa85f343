//! Magnetometer bias estimation and raw sample conditioning

use nalgebra::Vector3;

use crate::types::RawSample;

/// Number of slots in a per-axis calibration window.
pub const WINDOW_SIZE: usize = 20;

/// The single slot overwritten by each new sample.
const OVERWRITE_SLOT: usize = 10;

/// Sorted indices of the trimmed range used for the bias estimate.
const LOWER_TRIM: usize = 3;
const UPPER_TRIM: usize = 16;

/// Sensor axis selector for per-axis calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Fixed 20-slot sample window for one magnetometer axis.
///
/// Each new sample overwrites slot 10 of the previous *sorted* contents and
/// the window is re-sorted ascending; values are never shifted, so this is
/// not a sliding window or a FIFO. The bias estimate is the trimmed-range
/// midpoint of the sorted window. Deterministic given the exact insertion
/// sequence.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationWindow {
    samples: [i16; WINDOW_SIZE],
}

impl CalibrationWindow {
    /// Creates an empty (all-zero) window.
    pub const fn new() -> Self {
        Self {
            samples: [0; WINDOW_SIZE],
        }
    }

    /// Ingests one raw sample and returns the `(offset, amplitude)` bias
    /// estimate for this axis.
    ///
    /// `offset` is the midpoint of the 4th-lowest and 4th-highest samples
    /// (a trimmed range robust to outliers); `amplitude` is the distance
    /// from that midpoint to the 4th-highest sample.
    pub fn correct(&mut self, raw: i16) -> (i16, i16) {
        self.samples[OVERWRITE_SLOT] = raw;
        self.samples.sort_unstable();

        // 32-bit intermediate with truncating division
        let offset =
            ((i32::from(self.samples[LOWER_TRIM]) + i32::from(self.samples[UPPER_TRIM])) / 2)
                as i16;
        let amplitude = self.samples[UPPER_TRIM] - offset;
        (offset, amplitude)
    }

    /// Current window contents, sorted ascending.
    pub fn samples(&self) -> &[i16; WINDOW_SIZE] {
        &self.samples
    }
}

impl Default for CalibrationWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-axis magnetometer hard-iron offset and amplitude estimator.
///
/// Maintains one [`CalibrationWindow`] per axis. Not thread-safe: the
/// exclusive borrow on `correct` is the required serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagnetometerCalibrator {
    windows: [CalibrationWindow; 3],
}

impl MagnetometerCalibrator {
    /// Creates a calibrator with empty windows on all three axes.
    pub const fn new() -> Self {
        Self {
            windows: [CalibrationWindow::new(); 3],
        }
    }

    /// Ingests one axis's raw magnetometer value and returns that axis's
    /// `(offset, amplitude)` estimate.
    pub fn correct(&mut self, axis: Axis, raw: i16) -> (i16, i16) {
        self.windows[axis.index()].correct(raw)
    }

    /// Ingests a full triaxial sample and returns the per-axis offsets and
    /// amplitudes.
    pub fn correct_all(&mut self, raw: RawSample) -> (RawSample, RawSample) {
        let (x_offset, x_amplitude) = self.correct(Axis::X, raw.x);
        let (y_offset, y_amplitude) = self.correct(Axis::Y, raw.y);
        let (z_offset, z_amplitude) = self.correct(Axis::Z, raw.z);
        (
            RawSample::new(x_offset, y_offset, z_offset),
            RawSample::new(x_amplitude, y_amplitude, z_amplitude),
        )
    }
}

/// Applies hard/soft-iron correction to a raw magnetometer sample:
/// per axis, `(raw - offset) * scale`, saturating back to i16.
pub fn apply_magnetic_bias(raw: RawSample, offset: RawSample, scale: Vector3<f32>) -> RawSample {
    RawSample::new(
        ((i32::from(raw.x) - i32::from(offset.x)) as f32 * scale.x) as i16,
        ((i32::from(raw.y) - i32::from(offset.y)) as f32 * scale.y) as i16,
        ((i32::from(raw.z) - i32::from(offset.z)) as f32 * scale.z) as i16,
    )
}

/// Zeroes every component whose magnitude does not exceed `threshold`.
///
/// Suppresses idle jitter on rate sensors so a stationary body integrates to
/// a stationary attitude.
pub fn apply_deadband(raw: RawSample, threshold: i16) -> RawSample {
    let clip = |value: i16| {
        if (i32::from(value)).abs() <= i32::from(threshold) {
            0
        } else {
            value
        }
    };
    RawSample::new(clip(raw.x), clip(raw.y), clip(raw.z))
}
