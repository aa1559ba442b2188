//! Audio playback and spectrum analysis.
//!
//! `AudioEngine` is the seam between the animation core and the platform:
//! the director only ever sees transport operations plus a byte-scaled
//! spectrum sample and its average. `RodioEngine` implements it with a
//! rodio sink whose played samples are tapped into a bounded shared buffer
//! and analyzed on demand with rustfft.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use thiserror::Error;

use crate::params::AnalyzerParams;

/// Maximum byte-scale magnitude a spectrum bin can report
pub const SPECTRUM_MAX: f32 = 255.0;

/// Tapped samples kept for analysis (oldest dropped first)
const TAP_CAPACITY: usize = 16384;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable")]
    Stream(#[from] rodio::StreamError),

    #[error("audio sink unavailable")]
    Sink(#[from] rodio::PlayError),

    #[error("could not open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("no track loaded")]
    NoTrack,
}

/// Playback and analysis operations the animation core consumes.
pub trait AudioEngine {
    /// Decode a track and queue it, paused. Replaces whatever was loaded.
    fn load_track(&mut self, path: &Path) -> Result<(), AudioError>;

    /// Begin or resume playback. Fails with [`AudioError::NoTrack`] until
    /// a track has been loaded, so animation never starts against silence
    /// that can't become sound.
    fn play(&mut self) -> Result<(), AudioError>;

    fn pause(&mut self);

    fn set_volume(&mut self, volume: f32);

    /// Loop setting applies to the next [`load_track`](Self::load_track);
    /// the playing source is already configured.
    fn set_loop(&mut self, looping: bool);

    /// Fill `out` with the current spectrum sample, one byte-scaled
    /// magnitude (0–255) per bin.
    fn frequency_spectrum(&mut self, out: &mut [f32]);

    /// Mean magnitude of the most recent spectrum sample.
    fn average_loudness(&self) -> f32;
}

/// Hann window coefficient for FFT analysis
fn hann_window(index: usize, size: usize) -> f32 {
    use std::f32::consts::PI;
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Converts raw samples into the byte-scaled spectrum the mapping
/// constants assume: Hann window → FFT → normalized magnitude →
/// exponential time smoothing → dB → linear map onto 0–255.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<f32>,
    average: f32,
    params: AnalyzerParams,
}

impl SpectrumAnalyzer {
    pub fn new(params: AnalyzerParams) -> Self {
        let n = params.fft_size;
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(n),
            window: (0..n).map(|i| hann_window(i, n)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; n / 2],
            bytes: vec![0.0; n / 2],
            average: 0.0,
            params,
        }
    }

    /// Analyze the newest window of `samples` (zero-padded at the front
    /// when fewer than `fft_size` are available).
    pub fn analyze(&mut self, samples: &[f32]) {
        let n = self.params.fft_size;
        let offset = samples.len().saturating_sub(n);
        let available = samples.len() - offset;
        let pad = n - available;

        for i in 0..n {
            let s = if i < pad { 0.0 } else { samples[offset + i - pad] };
            self.buffer[i] = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let tau = self.params.smoothing_time_constant;
        let db_span = self.params.max_decibels - self.params.min_decibels;
        let mut sum = 0.0;
        for k in 0..n / 2 {
            let magnitude = self.buffer[k].norm() / n as f32;
            self.smoothed[k] = tau * self.smoothed[k] + (1.0 - tau) * magnitude;

            let db = 20.0 * self.smoothed[k].max(f32::MIN_POSITIVE).log10();
            self.bytes[k] = (SPECTRUM_MAX * (db - self.params.min_decibels) / db_span)
                .clamp(0.0, SPECTRUM_MAX);
            sum += self.bytes[k];
        }
        self.average = sum / (n / 2) as f32;
    }

    pub fn spectrum(&self) -> &[f32] {
        &self.bytes
    }

    pub fn average(&self) -> f32 {
        self.average
    }
}

/// Pass-through source that copies every played sample into a bounded
/// shared buffer for analysis.
struct TapSource<S>
where
    S: Source<Item = f32>,
{
    inner: S,
    tap: Arc<Mutex<Vec<f32>>>,
}

impl<S> TapSource<S>
where
    S: Source<Item = f32>,
{
    fn new(inner: S, tap: Arc<Mutex<Vec<f32>>>) -> Self {
        Self { inner, tap }
    }
}

impl<S> Iterator for TapSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.inner.next()?;
        let mut tap = self.tap.lock().unwrap();
        tap.push(sample);
        if tap.len() > TAP_CAPACITY {
            let drop = tap.len() - TAP_CAPACITY;
            tap.drain(0..drop);
        }
        Some(sample)
    }
}

impl<S> Source for TapSource<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}

/// Rodio-backed implementation of [`AudioEngine`].
pub struct RodioEngine {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Sink,
    analyzer: SpectrumAnalyzer,
    tap: Arc<Mutex<Vec<f32>>>,
    scratch: Vec<f32>,
    volume: f32,
    looping: bool,
    loaded: bool,
}

impl RodioEngine {
    pub fn new(params: &AnalyzerParams) -> Result<Self, AudioError> {
        let (_stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;
        sink.pause();
        Ok(Self {
            _stream,
            handle,
            sink,
            analyzer: SpectrumAnalyzer::new(params.clone()),
            tap: Arc::new(Mutex::new(Vec::with_capacity(TAP_CAPACITY))),
            scratch: Vec::with_capacity(TAP_CAPACITY),
            volume: 1.0,
            looping: true,
            loaded: false,
        })
    }
}

impl AudioEngine for RodioEngine {
    fn load_track(&mut self, path: &Path) -> Result<(), AudioError> {
        let file = File::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        // Tear down the old sink before touching shared state so no frame
        // observes a half-swapped track.
        self.sink.stop();
        self.sink = Sink::try_new(&self.handle)?;
        self.sink.pause();
        self.sink.set_volume(self.volume);
        self.tap.lock().unwrap().clear();

        let source = decoder.convert_samples::<f32>();
        if self.looping {
            self.sink
                .append(TapSource::new(source.repeat_infinite(), Arc::clone(&self.tap)));
        } else {
            self.sink.append(TapSource::new(source, Arc::clone(&self.tap)));
        }
        self.loaded = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if !self.loaded {
            return Err(AudioError::NoTrack);
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn frequency_spectrum(&mut self, out: &mut [f32]) {
        {
            let tap = self.tap.lock().unwrap();
            self.scratch.clear();
            self.scratch.extend_from_slice(&tap);
        }
        self.analyzer.analyze(&self.scratch);
        let spectrum = self.analyzer.spectrum();
        let len = out.len().min(spectrum.len());
        out[..len].copy_from_slice(&spectrum[..len]);
    }

    fn average_loudness(&self) -> f32 {
        self.analyzer.average()
    }
}
