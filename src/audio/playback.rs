//! Whole-file playback through the default output device.
//!
//! [`Player::play`] hands the work to the tokio blocking pool so the UI stays
//! responsive.  Every request takes the same `Mutex<()>` before touching the
//! device: a second request waits for the first to finish; there is no
//! queue limit, no cancellation and no timeout.
//!
//! Progress is reported back to the UI as [`PlaybackEvent`]s over a tokio
//! mpsc channel that the egui update loop drains with `try_recv`.

use std::path::{Path, PathBuf};
use std::sync::{mpsc as std_mpsc, Arc, Mutex, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::decode::{decode, AudioError, DecodedAudio};
use super::resample::{remix_channels, resample_interleaved};

// ---------------------------------------------------------------------------
// PlaybackError / PlaybackEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Decode(#[from] AudioError),

    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("output stream error: {0}")]
    Stream(String),

    #[error("unsupported output sample format {0}")]
    UnsupportedFormat(String),
}

/// Progress of one playback request.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Started { path: PathBuf },
    Finished { path: PathBuf },
    Failed { path: PathBuf, message: String },
}

// ---------------------------------------------------------------------------
// AudioOutput
// ---------------------------------------------------------------------------

/// Blocking sink for decoded audio.
pub trait AudioOutput: Send + Sync {
    /// Play `audio` and return once it has been fully rendered.
    fn play(&self, audio: &DecodedAudio) -> Result<(), PlaybackError>;
}

/// [`AudioOutput`] on the default cpal host and device.
///
/// The device keeps its preferred configuration; audio is remixed and
/// resampled to match it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalOutput;

impl AudioOutput for CpalOutput {
    fn play(&self, audio: &DecodedAudio) -> Result<(), PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoDevice)?;
        let supported = device.default_output_config()?;

        let channels = supported.channels();
        let rate = supported.sample_rate().0;
        let samples = remix_channels(&audio.samples, audio.channels, channels);
        let samples = resample_interleaved(&samples, channels, audio.sample_rate, rate);
        let config = supported.config();

        let (done_tx, done_rx) = std_mpsc::channel::<Result<(), String>>();
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, samples, done_tx)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, samples, done_tx)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, samples, done_tx)?,
            other => return Err(PlaybackError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream.play()?;

        // The stream owns the senders, so this only ends with a message.
        let result = done_rx
            .recv()
            .unwrap_or_else(|_| Err("output stream closed".into()));
        drop(stream);
        result.map_err(PlaybackError::Stream)
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Vec<f32>,
    done: std_mpsc::Sender<Result<(), String>>,
) -> Result<cpal::Stream, PlaybackError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let error_done = done.clone();
    let mut pos = 0usize;
    let mut signalled = false;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for out in data.iter_mut() {
                let s = samples.get(pos).copied().unwrap_or(0.0);
                *out = T::from_sample(s);
                pos += 1;
            }
            // Report only after one full buffer of trailing silence so the
            // last real samples reach the device before the stream drops.
            if !signalled && pos >= samples.len() + data.len() {
                signalled = true;
                let _ = done.send(Ok(()));
            }
        },
        move |err: cpal::StreamError| {
            log::error!("cpal stream error: {err}");
            let _ = error_done.send(Err(err.to_string()));
        },
        None,
    )?;
    Ok(stream)
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Scale samples linearly by `volume_percent / 100`.
pub fn apply_volume(samples: &mut [f32], volume_percent: f32) {
    let gain = volume_percent / 100.0;
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

/// Serialised, non-blocking playback front end.
#[derive(Clone)]
pub struct Player {
    runtime: Handle,
    output: Arc<dyn AudioOutput>,
    device_lock: Arc<Mutex<()>>,
    events: mpsc::Sender<PlaybackEvent>,
}

impl Player {
    /// Create a player and the receiver for its [`PlaybackEvent`]s.
    pub fn new(
        runtime: Handle,
        output: Arc<dyn AudioOutput>,
    ) -> (Self, mpsc::Receiver<PlaybackEvent>) {
        let (events, rx) = mpsc::channel(32);
        let player = Self {
            runtime,
            output,
            device_lock: Arc::new(Mutex::new(())),
            events,
        };
        (player, rx)
    }

    /// Queue `path` for playback at `volume_percent` (100 = unchanged).
    pub fn play(&self, path: &Path, volume_percent: f32) {
        let path = path.to_path_buf();
        let output = Arc::clone(&self.output);
        let lock = Arc::clone(&self.device_lock);
        let events = self.events.clone();

        self.runtime.spawn_blocking(move || {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

            let event = match play_file(&path, volume_percent, output.as_ref(), &events) {
                Ok(()) => {
                    log::info!("playback finished: {}", path.display());
                    PlaybackEvent::Finished { path }
                }
                Err(e) => {
                    log::warn!("playback of {} failed: {e}", path.display());
                    PlaybackEvent::Failed {
                        path,
                        message: e.to_string(),
                    }
                }
            };
            let _ = events.blocking_send(event);
        });
    }
}

fn play_file(
    path: &Path,
    volume_percent: f32,
    output: &dyn AudioOutput,
    events: &mpsc::Sender<PlaybackEvent>,
) -> Result<(), PlaybackError> {
    let mut audio = decode(path)?;
    apply_volume(&mut audio.samples, volume_percent);

    log::info!(
        "playback started: {} ({} Hz, {} ch, volume {volume_percent:.0}%)",
        path.display(),
        audio.sample_rate,
        audio.channels
    );
    let _ = events.blocking_send(PlaybackEvent::Started {
        path: path.to_path_buf(),
    });
    output.play(&audio)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    /// Output that records when each play ran and the peak sample it saw.
    #[derive(Default)]
    struct RecordingOutput {
        runs: Mutex<Vec<(Instant, Instant, f32)>>,
    }

    impl AudioOutput for RecordingOutput {
        fn play(&self, audio: &DecodedAudio) -> Result<(), PlaybackError> {
            let start = Instant::now();
            std::thread::sleep(Duration::from_millis(60));
            let peak = audio.samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
            self.runs.lock().unwrap().push((start, Instant::now(), peak));
            Ok(())
        }
    }

    fn write_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..800 {
            writer.write_sample(16_384_i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    async fn next_event(rx: &mut mpsc::Receiver<PlaybackEvent>) -> PlaybackEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event in time")
            .expect("channel open")
    }

    #[test]
    fn volume_scales_linearly() {
        let mut samples = vec![0.5_f32, -0.5, 0.25];
        apply_volume(&mut samples, 50.0);
        assert_eq!(samples, vec![0.25, -0.25, 0.125]);

        let mut loud = vec![0.25_f32];
        apply_volume(&mut loud, 200.0);
        assert_eq!(loud, vec![0.5]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn plays_with_volume_and_reports_progress() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_wav(&path);

        let output = Arc::new(RecordingOutput::default());
        let (player, mut rx) = Player::new(Handle::current(), output.clone());
        player.play(&path, 50.0);

        assert_eq!(next_event(&mut rx).await, PlaybackEvent::Started { path: path.clone() });
        assert_eq!(next_event(&mut rx).await, PlaybackEvent::Finished { path: path.clone() });

        let runs = output.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert!((runs[0].2 - 0.25).abs() < 1e-3, "peak = {}", runs[0].2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_requests_never_overlap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.wav");
        write_wav(&path);

        let output = Arc::new(RecordingOutput::default());
        let (player, mut rx) = Player::new(Handle::current(), output.clone());
        player.play(&path, 100.0);
        player.play(&path, 100.0);

        let mut finished = 0;
        while finished < 2 {
            if let PlaybackEvent::Finished { .. } = next_event(&mut rx).await {
                finished += 1;
            }
        }

        let mut runs = output.runs.lock().unwrap().clone();
        runs.sort_by_key(|r| r.0);
        assert_eq!(runs.len(), 2);
        assert!(runs[1].0 >= runs[0].1, "second playback started before the first ended");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn decode_failure_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.wav");

        let (player, mut rx) = Player::new(Handle::current(), Arc::new(RecordingOutput::default()));
        player.play(&path, 100.0);

        match next_event(&mut rx).await {
            PlaybackEvent::Failed { path: failed, message } => {
                assert_eq!(failed, path);
                assert!(message.contains("cannot open"), "message = {message}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
