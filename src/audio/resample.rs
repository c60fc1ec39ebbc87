//! Channel mixing and sample-rate conversion for playback.
//!
//! Files are decoded at their native rate and channel count; the output
//! device usually wants something else.  Two steps bridge the gap:
//!
//! 1. [`remix_channels`]: map interleaved frames onto the device channel
//!    count (downmix through mono when the layouts differ).
//! 2. [`resample_interleaved`]: linear interpolation to the device rate.
//!
//! The inspector never resamples: waveform and MFCC use the native rate.

// ---------------------------------------------------------------------------
// Channel mixing
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// * If `channels == 1` the input is returned as an owned `Vec`.
/// * If `channels == 0` an empty vector is returned.
///
/// ```rust
/// use audio_classifier::audio::stereo_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = stereo_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Convert interleaved audio from `from` channels to `to` channels.
///
/// Equal layouts pass through unchanged.  Otherwise each frame is averaged
/// to mono and copied into every output channel.
pub fn remix_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to {
        return samples.to_vec();
    }
    if to == 0 {
        return Vec::new();
    }
    let mono = stereo_to_mono(samples, from);
    let to = to as usize;
    let mut out = Vec::with_capacity(mono.len() * to);
    for s in mono {
        out.extend(std::iter::repeat(s).take(to));
    }
    out
}

// ---------------------------------------------------------------------------
// Resampling
// ---------------------------------------------------------------------------

/// Resample interleaved `samples` from `source_rate` to `target_rate` Hz
/// using linear interpolation, each channel on its own.
///
/// Output length is `ceil(frames * target_rate / source_rate) * channels`.
///
/// ```rust
/// use audio_classifier::audio::resample_interleaved;
///
/// let hi = vec![0.5_f32; 480];
/// assert_eq!(resample_interleaved(&hi, 1, 48_000, 16_000).len(), 160);
/// assert_eq!(resample_interleaved(&hi, 2, 48_000, 16_000).len(), 160);
/// assert_eq!(resample_interleaved(&hi, 1, 48_000, 48_000).len(), 480);
/// ```
pub fn resample_interleaved(
    samples: &[f32],
    channels: u16,
    source_rate: u32,
    target_rate: u32,
) -> Vec<f32> {
    if source_rate == target_rate || source_rate == 0 || target_rate == 0 {
        return samples.to_vec();
    }
    let channels = channels.max(1) as usize;
    let frames = samples.len() / channels;
    if frames == 0 {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_frames = (frames as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_frames * channels);

    for i in 0..output_frames {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        for ch in 0..channels {
            let at = |frame: usize| samples[frame * channels + ch];
            let sample = if idx + 1 < frames {
                at(idx) * (1.0 - frac) + at(idx + 1) * frac
            } else if idx < frames {
                at(idx)
            } else {
                0.0
            };
            output.push(sample);
        }
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_to_mono_already_mono() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(stereo_to_mono(&input, 1), input);
    }

    #[test]
    fn stereo_to_mono_two_channel() {
        let out = stereo_to_mono(&[1.0_f32, -1.0, 0.5, 0.5], 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn stereo_to_mono_zero_channels() {
        assert!(stereo_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    #[test]
    fn remix_same_layout_passes_through() {
        let input = vec![0.1_f32, 0.2, 0.3, 0.4];
        assert_eq!(remix_channels(&input, 2, 2), input);
    }

    #[test]
    fn remix_mono_to_stereo_duplicates() {
        let out = remix_channels(&[0.25_f32, -0.5], 1, 2);
        assert_eq!(out, vec![0.25, 0.25, -0.5, -0.5]);
    }

    #[test]
    fn remix_stereo_to_quad_goes_through_mono() {
        let out = remix_channels(&[1.0_f32, 0.0], 2, 4);
        assert_eq!(out, vec![0.5; 4]);
    }

    #[test]
    fn resample_same_rate_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        assert_eq!(resample_interleaved(&input, 1, 44_100, 44_100), input);
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample_interleaved(&[], 1, 48_000, 44_100).is_empty());
    }

    #[test]
    fn resample_44100_to_48000_length() {
        let input = vec![0.0_f32; 44_100];
        let out = resample_interleaved(&input, 1, 44_100, 48_000);
        assert!(out.len().abs_diff(48_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn resample_constant_signal_preserves_amplitude() {
        let input = vec![0.5_f32; 480];
        for &s in &resample_interleaved(&input, 1, 48_000, 22_050) {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }

    #[test]
    fn resample_interleaved_keeps_channels_apart() {
        // Left constant 0.25, right constant -0.75.
        let input: Vec<f32> = (0..200).flat_map(|_| [0.25_f32, -0.75]).collect();
        let out = resample_interleaved(&input, 2, 8_000, 16_000);
        assert_eq!(out.len(), 400 * 2);
        for frame in out.chunks_exact(2) {
            assert!((frame[0] - 0.25).abs() < 1e-6);
            assert!((frame[1] + 0.75).abs() < 1e-6);
        }
    }
}
