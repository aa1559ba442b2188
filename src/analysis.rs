//! Per-frame control signals derived from the raw spectrum.
//!
//! The analyzer is a pure function of its inputs: no state beyond the
//! bass-band index precomputed from constants, no side effects. Smoothing
//! state lives with whoever owns the animated value.

use crate::params::AnalyzerParams;

/// Move `current` toward `target` by fraction `alpha` of the remaining
/// distance. For `alpha` in [0, 1] the result never overshoots.
pub fn approach(current: f32, target: f32, alpha: f32) -> f32 {
    current + (target - current) * alpha
}

/// Exponential-smoothing state for a single scalar signal.
///
/// The caller persists the instance across frames and may vary the easing
/// fraction per step (the camera roll triples it while bass is active).
#[derive(Debug, Clone, Copy)]
pub struct SmoothedSignal {
    current: f32,
    target: f32,
}

impl SmoothedSignal {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Advance one frame toward the target; returns the new value.
    pub fn step(&mut self, alpha: f32) -> f32 {
        self.current = approach(self.current, self.target, alpha);
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }
}

/// Signals driving one frame of animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSignals {
    /// Engine-reported average loudness, floored when the engine reports
    /// exactly zero (no signal yet is baseline activity, not a freeze)
    pub average_frequency: f32,

    /// Mean magnitude over the bass band
    pub bass_energy: f32,

    /// Whether the bass energy exceeds the threshold this frame; stateless,
    /// no hysteresis
    pub has_bass: bool,
}

/// Wraps a raw spectrum sample into derived control signals.
pub struct FrequencyAnalyzer {
    bass_bin_end: usize,
    bass_threshold: f32,
    loudness_floor: f32,
}

impl FrequencyAnalyzer {
    pub fn new(params: &AnalyzerParams) -> Self {
        Self {
            bass_bin_end: params.bass_bin_end(),
            // The Hz cutoff doubles as the magnitude threshold. The units
            // do not match; the numeric behavior is intentional.
            bass_threshold: params.bass_frequency_limit,
            loudness_floor: params.average_frequency_clamp,
        }
    }

    /// Derive this frame's signals from the engine's spectrum sample.
    pub fn analyze(&self, spectrum: &[f32], average_loudness: f32) -> FrameSignals {
        let average_frequency = if average_loudness == 0.0 {
            self.loudness_floor
        } else {
            average_loudness
        };

        let end = self.bass_bin_end.min(spectrum.len());
        let bass_energy = if end > 0 {
            spectrum[..end].iter().sum::<f32>() / end as f32
        } else {
            0.0
        };

        FrameSignals {
            average_frequency,
            bass_energy,
            has_bass: bass_energy > self.bass_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_never_overshoots() {
        for &alpha in &[0.0, 0.1, 0.3, 0.5, 0.9, 1.0] {
            for &(current, target) in &[(0.0, 10.0), (10.0, 0.0), (-5.0, 5.0), (3.0, 3.0)] {
                let next = approach(current, target, alpha);
                let lo = current.min(target);
                let hi = current.max(target);
                assert!(
                    next >= lo && next <= hi,
                    "approach({}, {}, {}) = {} left [{}, {}]",
                    current,
                    target,
                    alpha,
                    next,
                    lo,
                    hi
                );
            }
        }
    }

    #[test]
    fn test_smoothed_signal_steps_toward_target() {
        let mut signal = SmoothedSignal::new(0.0);
        signal.set_target(10.0);

        let first = signal.step(0.3);
        assert!((first - 3.0).abs() < 1e-6);

        // Converges monotonically while the target holds still
        let mut prev = first;
        for _ in 0..50 {
            let next = signal.step(0.3);
            assert!(next >= prev && next <= 10.0);
            prev = next;
        }
        assert!((prev - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_smoothed_signal_alpha_one_lands_exactly() {
        let mut signal = SmoothedSignal::new(-4.0);
        signal.set_target(2.5);
        assert_eq!(signal.step(1.0), 2.5);
    }

    #[test]
    fn test_zero_loudness_is_floored() {
        let analyzer = FrequencyAnalyzer::new(&AnalyzerParams::default());
        let spectrum = vec![0.0; 1024];

        let signals = analyzer.analyze(&spectrum, 0.0);
        assert_eq!(signals.average_frequency, 80.0);

        // Nonzero input passes through untouched
        let signals = analyzer.analyze(&spectrum, 5.0);
        assert_eq!(signals.average_frequency, 5.0);
    }

    #[test]
    fn test_bass_energy_is_mean_of_bass_band() {
        let params = AnalyzerParams::default();
        let analyzer = FrequencyAnalyzer::new(&params);

        let mut spectrum = vec![0.0; params.bin_count()];
        let end = params.bass_bin_end();
        for (i, bin) in spectrum.iter_mut().enumerate().take(end) {
            *bin = (i + 1) as f32 * 10.0;
        }
        // Values past the band must not contribute
        spectrum[end] = 10_000.0;

        let expected = (1..=end).map(|i| i as f32 * 10.0).sum::<f32>() / end as f32;
        let signals = analyzer.analyze(&spectrum, 1.0);
        assert!((signals.bass_energy - expected).abs() < 1e-4);
    }

    #[test]
    fn test_has_bass_threshold() {
        let params = AnalyzerParams::default();
        let analyzer = FrequencyAnalyzer::new(&params);
        let bins = params.bin_count();

        let quiet = vec![100.0; bins];
        assert!(!analyzer.analyze(&quiet, 1.0).has_bass);

        let loud = vec![200.0; bins];
        assert!(analyzer.analyze(&loud, 1.0).has_bass);

        // Exactly at the threshold does not trigger
        let edge = vec![params.bass_frequency_limit; bins];
        assert!(!analyzer.analyze(&edge, 1.0).has_bass);
    }
}
