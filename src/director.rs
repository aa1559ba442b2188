//! Per-frame orchestration and the player state machine.
//!
//! The director owns everything that animates: the engine seam, the signal
//! analyzer, both entity populations and the camera. The UI layer talks to
//! it exclusively through the four entry points; nothing else mutates the
//! scene.

use std::path::Path;

use log::info;
use rand::rngs::StdRng;

use crate::analysis::{FrequencyAnalyzer, SmoothedSignal};
use crate::audio::{AudioEngine, AudioError};
use crate::camera::CameraRig;
use crate::params::{AnalyzerParams, FieldParams, MotionParams, RenderConfig, RingParams};
use crate::scene::{Cuboid, SpawnField, SpectrumRing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Running,
}

pub struct AnimationDirector<E: AudioEngine> {
    engine: E,
    analyzer: FrequencyAnalyzer,
    field: SpawnField,
    ring: SpectrumRing,
    camera: CameraRig,
    motion: MotionParams,

    /// Loudness level treated as "nothing happening"; only the excess
    /// above it displaces the cube field
    loudness_baseline: f32,

    camera_roll: SmoothedSignal,
    direction_factor: f32,
    frame_count: u64,
    state: PlayerState,
    track_title: Option<String>,
    spectrum: Vec<f32>,
}

impl<E: AudioEngine> AnimationDirector<E> {
    pub fn new(
        engine: E,
        field_params: FieldParams,
        ring_params: RingParams,
        motion: MotionParams,
        analyzer_params: &AnalyzerParams,
        render_config: &RenderConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            engine,
            analyzer: FrequencyAnalyzer::new(analyzer_params),
            field: SpawnField::new(field_params, rng),
            ring: SpectrumRing::new(ring_params),
            camera: CameraRig::new(render_config),
            motion,
            loudness_baseline: analyzer_params.average_frequency_clamp,
            camera_roll: SmoothedSignal::new(0.0),
            direction_factor: 1.0,
            frame_count: 0,
            state: PlayerState::Stopped,
            track_title: None,
            spectrum: vec![0.0; analyzer_params.bin_count()],
        }
    }

    /// Begin animating. Fails (and stays Stopped) if the engine refuses
    /// playback, e.g. because no track has been loaded yet.
    pub fn start(&mut self) -> Result<(), AudioError> {
        self.engine.play()?;
        self.state = PlayerState::Running;
        info!("playback started");
        Ok(())
    }

    pub fn pause(&mut self) {
        self.engine.pause();
        self.state = PlayerState::Stopped;
        info!("playback paused");
    }

    /// Swap in a new track. Playback is paused first so no frame reads a
    /// half-swapped buffer; on failure the director stays Stopped with its
    /// previous track and the error is returned for the UI to display.
    pub fn load_new_track(&mut self, path: &Path, title: &str) -> Result<(), AudioError> {
        self.pause();
        self.engine.load_track(path)?;
        self.track_title = Some(title.to_string());
        info!("loaded track '{}'", title);
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume);
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlayerState::Running
    }

    pub fn track_title(&self) -> Option<&str> {
        self.track_title.as_deref()
    }

    /// Advance the whole scene by one frame. A no-op while Stopped.
    ///
    /// The steps run in a fixed order — each later stage consumes signals
    /// computed earlier in the same frame.
    pub fn advance_frame(&mut self) {
        if self.state != PlayerState::Running {
            return;
        }

        // 1–2: raw sample in, derived signals out
        self.engine.frequency_spectrum(&mut self.spectrum);
        let loudness = self.engine.average_loudness();
        let signals = self.analyzer.analyze(&self.spectrum, loudness);

        // 3: ease the camera roll toward the loudness-driven target, with
        // a sharper kick while bass is active
        let roll_target =
            signals.average_frequency * self.direction_factor * self.motion.camera_rotation_speed;
        self.camera_roll.set_target(roll_target);
        let alpha = if signals.has_bass {
            (self.motion.smoothing_factor * self.motion.bass_kick_multiplier).min(1.0)
        } else {
            self.motion.smoothing_factor
        };
        self.camera.set_roll(self.camera_roll.step(alpha));

        // 4: loudness excess above the baseline, scaled and capped
        let excess = (signals.average_frequency - self.loudness_baseline).max(0.0);
        let audio_effect = (excess * self.motion.sensitivity).min(self.motion.max_displacement);

        // 5–6: populations
        let time_hue = self.frame_count as f32 * self.motion.hue_speed;
        self.field.update(audio_effect, time_hue);
        self.ring.update(&self.spectrum, signals.has_bass, time_hue);

        // 7: periodic reversal of the camera sweep
        self.frame_count += 1;
        if self.frame_count % self.motion.direction_flip_interval == 0 {
            self.direction_factor = -self.direction_factor;
        }
    }

    pub fn cubes(&self) -> &[Cuboid] {
        self.field.cubes()
    }

    pub fn bars(&self) -> &[Cuboid] {
        self.ring.bars()
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn direction_factor(&self) -> f32 {
        self.direction_factor
    }
}
