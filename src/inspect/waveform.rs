//! Min/max amplitude envelope for the waveform plot.
//!
//! # Example
//!
//! ```rust
//! use audio_classifier::inspect::Envelope;
//!
//! let audio: Vec<f32> = (0..16_000)
//!     .map(|i| (i as f32 * 0.01).sin() * 0.5)
//!     .collect();
//!
//! let envelope = Envelope::compute(&audio, 200);
//! assert_eq!(envelope.len(), 200);
//! for &(lo, hi) in &envelope.columns {
//!     assert!(lo <= hi);
//! }
//! ```

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Per-column `(min, max)` sample values over equal-width chunks of audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub columns: Vec<(f32, f32)>,
}

impl Envelope {
    /// Split `samples` into `num_columns` chunks and keep each chunk's extremes.
    ///
    /// Audio shorter than `num_columns` yields one column per sample.
    /// Non-finite chunks collapse to `(0.0, 0.0)`.
    pub fn compute(samples: &[f32], num_columns: usize) -> Self {
        if samples.is_empty() || num_columns == 0 {
            return Self::default();
        }

        let len = samples.len();
        let step = (len as f64 / num_columns as f64).max(1.0);
        let mut columns = Vec::with_capacity(num_columns.min(len));
        let mut pos = 0.0_f64;

        while columns.len() < num_columns {
            let start = pos as usize;
            let end = ((pos + step) as usize).min(len);
            if start >= end {
                break;
            }
            let (lo, hi) = samples[start..end]
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            if lo.is_finite() && hi.is_finite() {
                columns.push((lo, hi));
            } else {
                columns.push((0.0, 0.0));
            }
            pos += step;
        }

        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_number_of_columns() {
        let audio = vec![0.3_f32; 16_000];
        assert_eq!(Envelope::compute(&audio, 20).len(), 20);
    }

    #[test]
    fn columns_track_extremes() {
        // Two halves: first ramps 0..1, second is constant -0.5.
        let mut audio: Vec<f32> = (0..100).map(|i| i as f32 / 99.0).collect();
        audio.extend(std::iter::repeat(-0.5_f32).take(100));

        let env = Envelope::compute(&audio, 2);
        assert_eq!(env.columns[0], (0.0, 1.0));
        assert_eq!(env.columns[1], (-0.5, -0.5));
    }

    #[test]
    fn short_audio_gives_one_column_per_sample() {
        let env = Envelope::compute(&[0.1, -0.2, 0.3], 10);
        assert_eq!(env.columns, vec![(0.1, 0.1), (-0.2, -0.2), (0.3, 0.3)]);
    }

    #[test]
    fn non_finite_chunk_is_zeroed() {
        let env = Envelope::compute(&[f32::NAN, f32::NAN, 0.5, 0.5], 2);
        assert_eq!(env.columns[0], (0.0, 0.0));
        assert_eq!(env.columns[1], (0.5, 0.5));
    }

    #[test]
    fn empty_inputs() {
        assert!(Envelope::compute(&[], 10).is_empty());
        assert!(Envelope::compute(&[0.5; 100], 0).is_empty());
    }
}
