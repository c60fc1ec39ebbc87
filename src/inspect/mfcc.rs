//! Mel-frequency cepstral coefficients.
//!
//! Parameters follow the common librosa defaults so the heatmap looks the
//! same as the one audio people already know:
//!
//! | Step | Setting |
//! |------|---------|
//! | STFT | `n_fft = 2048`, hop `512`, periodic Hann, centred with zero padding |
//! | Mel  | 128 Slaney-scale bands, Slaney area normalisation, `0..sr/2` |
//! | dB   | `10·log10(max(P, 1e-10))`, floor at `max - 80` |
//! | DCT  | type II, orthonormal, first 13 coefficients |

use rustfft::{num_complex::Complex, FftPlanner};

pub const N_FFT: usize = 2048;
pub const HOP_LENGTH: usize = 512;
pub const N_MELS: usize = 128;
pub const N_MFCC: usize = 13;
pub const TOP_DB: f32 = 80.0;
const AMIN: f32 = 1e-10;

// ---------------------------------------------------------------------------
// Mfcc
// ---------------------------------------------------------------------------

/// Coefficient matrix, stored coefficient-major (`values[coef * frames + frame]`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mfcc {
    pub n_coefficients: usize,
    pub frames: usize,
    pub values: Vec<f32>,
}

impl Mfcc {
    /// Compute [`N_MFCC`] coefficients for mono `samples` at `sample_rate`.
    pub fn compute(samples: &[f32], sample_rate: u32) -> Self {
        if samples.is_empty() || sample_rate == 0 {
            return Self::default();
        }

        let (frames, power) = power_spectrogram(samples);
        let filters = mel_filterbank(sample_rate, N_FFT, N_MELS);

        let bins = N_FFT / 2 + 1;
        let mut mel_db = Vec::with_capacity(frames * N_MELS);
        for frame in power.chunks_exact(bins) {
            for filter in &filters {
                let energy: f32 = filter
                    .weights
                    .iter()
                    .zip(&frame[filter.start..])
                    .map(|(w, p)| w * p)
                    .sum();
                mel_db.push(energy);
            }
        }
        power_to_db(&mut mel_db, TOP_DB);

        let basis = dct_basis(N_MELS, N_MFCC);
        let mut values = vec![0.0_f32; N_MFCC * frames];
        for (f, mel_frame) in mel_db.chunks_exact(N_MELS).enumerate() {
            for (k, row) in basis.chunks_exact(N_MELS).enumerate() {
                values[k * frames + f] = row.iter().zip(mel_frame).map(|(b, x)| b * x).sum();
            }
        }

        Self {
            n_coefficients: N_MFCC,
            frames,
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    pub fn get(&self, coefficient: usize, frame: usize) -> f32 {
        self.values[coefficient * self.frames + frame]
    }

    /// Smallest and largest coefficient, for colour scaling.
    pub fn value_range(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

// ---------------------------------------------------------------------------
// STFT
// ---------------------------------------------------------------------------

/// Frame count for a centred STFT of `len` samples.
pub fn frame_count(len: usize) -> usize {
    1 + len / HOP_LENGTH
}

/// `|X|²` per frame, `N_FFT / 2 + 1` bins each, frame-major.
fn power_spectrogram(samples: &[f32]) -> (usize, Vec<f32>) {
    let len = samples.len();
    let frames = frame_count(len);
    let bins = N_FFT / 2 + 1;
    let pad = N_FFT / 2;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(N_FFT);
    let window = hann_window(N_FFT);
    let mut buffer = vec![Complex { re: 0.0, im: 0.0 }; N_FFT];
    let mut power = Vec::with_capacity(frames * bins);

    for frame in 0..frames {
        // Index into the signal padded by `pad` zeros on both sides.
        let start = frame * HOP_LENGTH;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let sample = (start + i)
                .checked_sub(pad)
                .and_then(|idx| samples.get(idx))
                .copied()
                .unwrap_or(0.0);
            *slot = Complex {
                re: sample * window[i],
                im: 0.0,
            };
        }
        fft.process(&mut buffer);
        power.extend(buffer[..bins].iter().map(|c| c.norm_sqr()));
    }

    (frames, power)
}

/// Periodic Hann window.
fn hann_window(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    let n_f = n as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n_f).cos())
        .collect()
}

// ---------------------------------------------------------------------------
// Mel filterbank
// ---------------------------------------------------------------------------

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4_f64.ln() / 27.0
}

/// Slaney mel scale: linear below 1 kHz, logarithmic above.
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        mel * F_SP
    }
}

/// One triangular filter; only the non-zero span is stored.
#[derive(Debug, Clone)]
struct MelFilter {
    start: usize,
    weights: Vec<f32>,
}

fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Vec<MelFilter> {
    let bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..bins)
        .map(|i| i as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    let mel_max = hz_to_mel(sample_rate as f64 / 2.0);
    let mel_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
        .collect();

    (0..n_mels)
        .map(|m| {
            let (lo, center, hi) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
            let enorm = 2.0 / (hi - lo);
            let dense: Vec<f32> = fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - lo) / (center - lo);
                    let upper = (hi - f) / (hi - center);
                    (lower.min(upper).max(0.0) * enorm) as f32
                })
                .collect();

            let start = dense.iter().position(|&w| w > 0.0).unwrap_or(0);
            let end = dense.iter().rposition(|&w| w > 0.0).map_or(start, |e| e + 1);
            MelFilter {
                start,
                weights: dense[start..end].to_vec(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// dB + DCT
// ---------------------------------------------------------------------------

/// Convert power to dB (reference 1.0) in place, clamping to `max - top_db`.
fn power_to_db(values: &mut [f32], top_db: f32) {
    let mut max = f32::NEG_INFINITY;
    for v in values.iter_mut() {
        *v = 10.0 * v.max(AMIN).log10();
        max = max.max(*v);
    }
    let floor = max - top_db;
    for v in values.iter_mut() {
        *v = v.max(floor);
    }
}

/// Orthonormal DCT-II basis, `n_out` rows of length `n`.
fn dct_basis(n: usize, n_out: usize) -> Vec<f32> {
    let n_f = n as f64;
    let mut basis = Vec::with_capacity(n * n_out);
    for k in 0..n_out {
        let scale = if k == 0 {
            (1.0 / n_f).sqrt()
        } else {
            (2.0 / n_f).sqrt()
        };
        for i in 0..n {
            let angle = std::f64::consts::PI / n_f * (i as f64 + 0.5) * k as f64;
            basis.push((scale * angle.cos()) as f32);
        }
    }
    basis
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
