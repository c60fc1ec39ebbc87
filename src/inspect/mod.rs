//! Per-file inspection: header text, waveform envelope and MFCC matrix.
//!
//! An [`Inspection`] is built once per selection change and replaces the
//! previous one; the plots in [`plot`] paint it every frame.

pub mod mfcc;
pub mod plot;
pub mod waveform;

use std::path::{Path, PathBuf};

use crate::audio::{self, AudioError};

pub use mfcc::Mfcc;
pub use waveform::Envelope;

/// Horizontal resolution of the waveform envelope.
pub const ENVELOPE_COLUMNS: usize = 1024;

#[derive(Debug, Clone)]
pub struct Inspection {
    pub path: PathBuf,
    pub header: String,
    pub sample_rate: u32,
    pub duration_secs: f32,
    pub envelope: Envelope,
    pub mfcc: Mfcc,
}

impl Inspection {
    /// Analyse already-decoded mono `samples`.
    pub fn from_samples(path: &Path, samples: &[f32], sample_rate: u32) -> Self {
        let duration_secs = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f32 / sample_rate as f32
        };
        Self {
            path: path.to_path_buf(),
            header: header_text(path),
            sample_rate,
            duration_secs,
            envelope: Envelope::compute(samples, ENVELOPE_COLUMNS),
            mfcc: Mfcc::compute(samples, sample_rate),
        }
    }

    /// Decode `path` at its native rate and analyse it.
    pub fn load(path: &Path) -> Result<Self, AudioError> {
        let (samples, sample_rate) = audio::load(path)?;
        log::debug!(
            "inspecting {} ({} samples @ {sample_rate} Hz)",
            path.display(),
            samples.len()
        );
        Ok(Self::from_samples(path, &samples, sample_rate))
    }
}

/// `File: <dir>/<name> (<.ext>)`; the extension keeps its dot and is empty
/// when the file has none.
pub fn header_text(path: &Path) -> String {
    let dir = path.parent().map(|p| p.display().to_string()).unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("File: {dir}/{name} ({ext})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn header_format() {
        assert_eq!(
            header_text(Path::new("/data/in/speech/a.wav")),
            "File: /data/in/speech/a.wav (.wav)"
        );
        assert_eq!(header_text(Path::new("/data/in/noext")), "File: /data/in/noext ()");
    }

    #[test]
    fn from_samples_fills_every_view() {
        let samples: Vec<f32> = (0..16_000).map(|i| (i as f32 * 0.05).sin() * 0.4).collect();
        let inspection = Inspection::from_samples(Path::new("/x/y.flac"), &samples, 16_000);

        assert_eq!(inspection.sample_rate, 16_000);
        assert!((inspection.duration_secs - 1.0).abs() < 1e-6);
        assert_eq!(inspection.envelope.len(), ENVELOPE_COLUMNS);
        assert_eq!(inspection.mfcc.frames, mfcc::frame_count(16_000));
        assert_eq!(inspection.header, "File: /x/y.flac (.flac)");
    }

    #[test]
    fn load_decodes_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 11_025,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..11_025_i32 {
            let s = ((i % 100) * 200) as i16;
            writer.write_sample(s).unwrap();
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let inspection = Inspection::load(&path).unwrap();
        assert_eq!(inspection.sample_rate, 11_025);
        assert!((inspection.duration_secs - 1.0).abs() < 1e-3);
        assert!(!inspection.mfcc.is_empty());
    }

    #[test]
    fn load_reports_decode_errors() {
        let dir = tempdir().unwrap();
        assert!(Inspection::load(&dir.path().join("gone.mp3")).is_err());
    }
}
