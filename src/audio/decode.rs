//! File decoding via `symphonia` at the file's native sample rate.

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use thiserror::Error;

use super::resample::stereo_to_mono;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Reasons a file could not be decoded.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognised audio format in {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: SymphoniaError,
    },

    #[error("no audio track in {0}")]
    NoTrack(PathBuf),

    #[error("unsupported codec in {path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: SymphoniaError,
    },

    #[error("decoding {path} failed: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: SymphoniaError,
    },

    #[error("unknown sample rate in {0}")]
    UnknownSampleRate(PathBuf),
}

// ---------------------------------------------------------------------------
// DecodedAudio
// ---------------------------------------------------------------------------

/// Whole-file PCM in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples.
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn to_mono(&self) -> Vec<f32> {
        stereo_to_mono(&self.samples, self.channels)
    }
}

/// Decode every packet of the default track.
///
/// Corrupt packets are skipped (and counted in the debug log); an
/// end-of-stream I/O error ends decoding normally.
pub fn decode(path: &Path) -> Result<DecodedAudio, AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|source| AudioError::Probe {
            path: path.to_path_buf(),
            source,
        })?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::NoTrack(path.to_path_buf()))?
        .clone();
    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|source| AudioError::Codec {
            path: path.to_path_buf(),
            source,
        })?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);
    let mut samples: Vec<f32> = Vec::new();
    let mut skipped = 0u32;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(SymphoniaError::DecodeError(_)) => {
                skipped += 1;
                continue;
            }
            Err(source) => {
                return Err(AudioError::Decode {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => {
                skipped += 1;
                continue;
            }
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(source) => {
                return Err(AudioError::Decode {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let spec = *decoded.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }
        if channels == 0 {
            channels = spec.channels.count() as u16;
        }

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    if sample_rate == 0 {
        return Err(AudioError::UnknownSampleRate(path.to_path_buf()));
    }
    if skipped > 0 {
        log::debug!("{}: skipped {skipped} undecodable packets", path.display());
    }

    Ok(DecodedAudio {
        samples,
        channels: channels.max(1),
        sample_rate,
    })
}

/// Mono samples and native sample rate, as used by the inspector.
pub fn load(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let audio = decode(path)?;
    Ok((audio.to_mono(), audio.sample_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[Vec<i16>]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for frame in frames {
            for &s in frame {
                writer.write_sample(s).expect("write sample");
            }
        }
        writer.finalize().expect("finalize wav");
    }

    #[test]
    fn decodes_mono_wav_at_native_rate() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("tone.wav");
        let frames: Vec<Vec<i16>> = (0..8_000).map(|_| vec![16_384]).collect();
        write_wav(&path, 1, 8_000, &frames);

        let audio = decode(&path).expect("decode");
        assert_eq!(audio.sample_rate, 8_000);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.frames(), 8_000);
        assert!((audio.duration_secs() - 1.0).abs() < 1e-3);
        assert!(audio.samples.iter().all(|&s| (s - 0.5).abs() < 1e-3));
    }

    #[test]
    fn load_downmixes_stereo() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("stereo.wav");
        let frames: Vec<Vec<i16>> = (0..1_000).map(|_| vec![16_384, -16_384]).collect();
        write_wav(&path, 2, 22_050, &frames);

        let (mono, rate) = load(&path).expect("load");
        assert_eq!(rate, 22_050);
        assert_eq!(mono.len(), 1_000);
        assert!(mono.iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempdir().expect("temp dir");
        let err = decode(&dir.path().join("absent.wav")).unwrap_err();
        assert!(matches!(err, AudioError::Open { .. }));
    }

    #[test]
    fn garbage_is_a_probe_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();
        let err = decode(&path).unwrap_err();
        assert!(matches!(err, AudioError::Probe { .. }), "got {err}");
    }
}
