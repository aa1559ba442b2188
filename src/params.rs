//! Parameter tables with documented semantics.
//!
//! Every tunable of the visualizer lives here as a plain struct with a
//! `Default` carrying the stock tuning. All of them are fixed at
//! initialization: changing field or ring parameters requires rebuilding
//! the corresponding population.

use std::ops::RangeInclusive;

/// Drift-cube field parameters
#[derive(Debug, Clone)]
pub struct FieldParams {
    /// Number of cubes in the field (constant for the run)
    pub shape_count: usize,

    /// Smallest cube edge length (world units, integer-valued)
    pub min_size: i32,

    /// Largest cube edge length (world units, integer-valued)
    pub max_size: i32,

    /// Lower bound for spawn x/y (world units)
    pub min_pos: i32,

    /// Upper bound for spawn x/y (world units)
    pub max_pos: i32,

    /// Half-width of the central band spawn positions must avoid,
    /// keeping the camera's immediate foreground clear
    pub excluded_pos_range: i32,

    /// Far end of the spawn band on the depth axis (negative = away
    /// from the camera); also the depth a respawned cube resets to
    pub spawn_depth: f32,

    /// Depth extent of the initial spawn band
    pub spawn_band: f32,

    /// Depth at which a cube has reached the camera and respawns
    pub respawn_depth: f32,

    /// Per-frame easing fraction for depth drift
    pub drift_smoothing: f32,

    /// Divisor for the outward x/y divergence nudge (position / divisor,
    /// scaled by the drift smoothing, per frame)
    pub divergence_divisor: f32,

    /// Per-frame rotation increment on the x and y axes (radians)
    pub tumble_rate: f32,

    /// Emissive strength of the cubes' hue cycle
    pub cube_emissive_intensity: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            shape_count: 200,
            min_size: 1,
            max_size: 10,
            min_pos: -30,
            max_pos: 30,
            excluded_pos_range: 5,
            spawn_depth: -100.0,
            spawn_band: 100.0,
            respawn_depth: 0.0,
            drift_smoothing: 0.1,
            divergence_divisor: 10.0,
            tumble_rate: 0.01,
            cube_emissive_intensity: 0.3,
        }
    }
}

/// Spectrum-ring parameters
#[derive(Debug, Clone)]
pub struct RingParams {
    /// Number of bars on the ring; also fixes the spectrum resolution
    /// consumed per frame (the FFT size is twice this)
    pub vertex_count: usize,

    /// Ring radius (world units)
    pub radius: f32,

    /// Bar cross-section width/depth (world units)
    pub bar_width: f32,

    /// Bar base height before frequency scaling (world units)
    pub bar_height: f32,

    /// Divisor mapping a bin magnitude to a bar's target y-scale
    pub scale_divisor: f32,

    /// Substitute magnitude for zero or NaN bins, so bars never
    /// collapse to zero height on silent input
    pub frequency_floor: f32,

    /// Hue offset between adjacent bars (fraction of a full color cycle)
    pub hue_spread: f32,

    /// Per-frame easing fraction for bar scale
    pub scale_smoothing: f32,

    /// Per-frame easing fraction pulling a bar back to its rest position
    pub settle_smoothing: f32,

    /// Scale multiplier applied to inner-band bars while bass is active
    pub boost_scale: f32,

    /// Emissive intensity outside a bass boost
    pub base_intensity: f32,

    /// Emissive intensity while boosted
    pub boost_intensity: f32,

    /// Outward y-offset applied per frame to boosted bars
    pub jump_offset: f32,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            vertex_count: 1024,
            radius: 5.0,
            bar_width: 0.05,
            bar_height: 0.1,
            scale_divisor: 8.0,
            frequency_floor: 10.0,
            hue_spread: 0.001,
            scale_smoothing: 0.3,
            settle_smoothing: 0.1,
            boost_scale: 3.0,
            base_intensity: 1.0,
            boost_intensity: 3.0,
            jump_offset: 0.1,
        }
    }
}

impl RingParams {
    /// Index band (within the mirrored half-loop) that receives the bass
    /// boost. The outermost 3/16 of indices on each side are excluded,
    /// centering the band on the middle of the frequency sweep.
    pub fn inner_band(&self) -> RangeInclusive<usize> {
        let margin = self.vertex_count * 3 / 16;
        margin..=(self.vertex_count / 2).saturating_sub(margin)
    }
}

/// Global motion and signal-mapping parameters
#[derive(Debug, Clone)]
pub struct MotionParams {
    /// Default easing fraction for smoothed signals (camera roll, bar scale)
    pub smoothing_factor: f32,

    /// Scales average loudness into a camera roll target (radians per unit)
    pub camera_rotation_speed: f32,

    /// Easing multiplier for the camera roll while bass is active
    pub bass_kick_multiplier: f32,

    /// Upper bound on the per-frame loudness displacement
    pub max_displacement: f32,

    /// Gain applied to loudness excess before clamping
    pub sensitivity: f32,

    /// Hue advance per frame (fraction of a full color cycle)
    pub hue_speed: f32,

    /// Frames between sign flips of the camera drift direction
    pub direction_flip_interval: u64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.3,
            camera_rotation_speed: 0.00001,
            bass_kick_multiplier: 3.0,
            max_displacement: 10.0,
            sensitivity: 1.0,
            hue_speed: 0.001,
            direction_flip_interval: 10,
        }
    }
}

/// Spectrum analysis configuration
#[derive(Debug, Clone)]
pub struct AnalyzerParams {
    /// Audio sample rate (Hz)
    pub sample_rate_hz: usize,

    /// FFT window size (must be a power of 2; twice the ring's bar count)
    pub fft_size: usize,

    /// Substitute for an exactly-zero average loudness — silence is
    /// treated as baseline activity, not as a freeze
    pub average_frequency_clamp: f32,

    /// Bass cutoff (Hz). Also reused, as-is, as the magnitude threshold
    /// the bass energy is compared against.
    pub bass_frequency_limit: f32,

    /// Exponential smoothing applied to bin magnitudes between frames
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to 0 on the byte scale (dB)
    pub min_decibels: f32,

    /// Magnitude mapped to 255 on the byte scale (dB)
    pub max_decibels: f32,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 2048,
            average_frequency_clamp: 80.0,
            bass_frequency_limit: 150.0,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyzerParams {
    /// Configuration matching a ring of `vertex_count` bars
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        Self {
            fft_size: vertex_count * 2,
            ..Self::default()
        }
    }

    /// Number of magnitude bins a spectrum sample carries
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Convert a frequency (Hz) to an FFT bin index
    pub fn hz_to_bin(&self, hz: f32) -> usize {
        (hz / (self.sample_rate_hz as f32 / self.fft_size as f32)) as usize
    }

    /// Exclusive end of the bass band, fixed once from constants
    pub fn bass_bin_end(&self) -> usize {
        self.hz_to_bin(self.bass_frequency_limit)
    }

    /// Validate configuration (FFT size must be a power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() {
            return Err(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        Ok(())
    }
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane
    pub near_plane: f32,

    /// Far clipping plane
    pub far_plane: f32,

    /// Camera distance from the ring along +Z
    pub camera_z: f32,

    /// Exponential fog density (fades everything toward black)
    pub fog_density: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 60.0,
            near_plane: 0.1,
            far_plane: 2000.0,
            camera_z: 10.0,
            fog_density: 0.01,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }
}

/// Cross-check the ring and analyzer tables against each other: the ring
/// consumes one bin per bar up to the Nyquist midpoint, so the spectrum
/// must carry exactly `vertex_count` bins.
pub fn validate(ring: &RingParams, analyzer: &AnalyzerParams) -> Result<(), String> {
    analyzer.validate()?;
    if analyzer.bin_count() != ring.vertex_count {
        return Err(format!(
            "FFT size {} yields {} bins but the ring has {} bars",
            analyzer.fft_size,
            analyzer.bin_count(),
            ring.vertex_count
        ));
    }
    if ring.vertex_count < 16 {
        return Err(format!(
            "ring needs at least 16 bars for a meaningful inner band, got {}",
            ring.vertex_count
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bass_bin_end_is_fixed_by_constants() {
        let params = AnalyzerParams::default();

        // 44100 Hz / 2048 bins ≈ 21.53 Hz per bin; 150 Hz lands in bin 6
        assert_eq!(params.bass_bin_end(), 6);

        // Same constants, same answer — nothing frame-dependent here
        assert_eq!(
            params.bass_bin_end(),
            AnalyzerParams::default().bass_bin_end()
        );
    }

    #[test]
    fn test_hz_to_bin() {
        let params = AnalyzerParams::default();
        assert_eq!(params.hz_to_bin(0.0), 0);
        assert_eq!(params.hz_to_bin(21.6), 1);
        assert_eq!(params.hz_to_bin(100.0), 4);
    }

    #[test]
    fn test_inner_band_is_centered() {
        let ring = RingParams::default();
        let band = ring.inner_band();

        assert_eq!(*band.start(), 192);
        assert_eq!(*band.end(), 320);

        // Centered on the middle of the half-spectrum sweep
        assert_eq!((band.start() + band.end()) / 2, ring.vertex_count / 4);
    }

    #[test]
    fn test_validate_rejects_mismatched_resolution() {
        let ring = RingParams::default();
        let mut analyzer = AnalyzerParams::for_vertex_count(ring.vertex_count);
        assert!(validate(&ring, &analyzer).is_ok());

        analyzer.fft_size = 1024;
        assert!(validate(&ring, &analyzer).is_err());
    }

    #[test]
    fn test_validate_rejects_non_power_of_two_fft() {
        let mut analyzer = AnalyzerParams::default();
        analyzer.fft_size = 1000;
        assert!(analyzer.validate().is_err());
    }
}
