use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// One volume measurement over a block of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeReading {
    /// Linear amplitude: `sqrt(meanSquare)` of the raw sample values.
    pub amplitude: f64,
    /// Logarithmic magnitude: `10 * log10(meanSquare)`. `None` for a silent
    /// block, where the logarithm is undefined.
    pub decibels: Option<f64>,
}

/// Measure a block of samples.
///
/// Returns `None` for an empty block so callers retain their previous
/// readings instead of dividing by zero.
pub fn measure(samples: &[i16]) -> Option<VolumeReading> {
    if samples.is_empty() {
        return None;
    }
    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let v = s as f64;
            v * v
        })
        .sum();
    let mean_square = sum_squares / samples.len() as f64;
    let decibels = if mean_square > 0.0 {
        Some(10.0 * mean_square.log10())
    } else {
        None
    };
    Some(VolumeReading {
        amplitude: mean_square.sqrt(),
        decibels,
    })
}

/// Last-known volume, readable lock-free from any thread.
///
/// The capture loop calls `update` once per read cycle; hosts poll the
/// accessors from their own context. Readings are at most one read cycle
/// stale. Clones share the same cells.
#[derive(Debug, Clone, Default)]
pub struct VolumeMeter {
    cells: Arc<MeterCells>,
}

#[derive(Debug, Default)]
struct MeterCells {
    amplitude: AtomicI32,
    decibels: AtomicI32,
}

impl VolumeMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the readings from the valid region of the latest chunk.
    ///
    /// Empty blocks leave both values unchanged; silent blocks zero the
    /// amplitude but keep the previous decibel value (never NaN).
    pub fn update(&self, samples: &[i16]) {
        let Some(reading) = measure(samples) else {
            return;
        };
        self.cells
            .amplitude
            .store(reading.amplitude as i32, Ordering::Relaxed);
        if let Some(db) = reading.decibels {
            self.cells.decibels.store(db as i32, Ordering::Relaxed);
        }
    }

    /// Last linear amplitude, 0 before any data has been read.
    pub fn amplitude(&self) -> i32 {
        self.cells.amplitude.load(Ordering::Relaxed)
    }

    /// Last logarithmic magnitude in dB, 0 before any data has been read.
    pub fn decibels(&self) -> i32 {
        self.cells.decibels.load(Ordering::Relaxed)
    }
}
