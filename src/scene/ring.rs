//! Circular spectrum visualizer: one bar per frequency bin, mirrored
//! around the vertical axis.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;

use crate::analysis::approach;
use crate::params::RingParams;
use crate::scene::entity::{Cuboid, Pose};

const BAR_COLOR: [f32; 3] = [0.25, 0.25, 0.25];

/// Fixed population of bars on a circle in the XY plane. Bars are created
/// once; only scale, position and color mutate afterwards.
pub struct SpectrumRing {
    bars: Vec<Cuboid>,
    params: RingParams,
}

impl SpectrumRing {
    pub fn new(params: RingParams) -> Self {
        let n = params.vertex_count;
        let mut bars = Vec::with_capacity(n);
        for i in 0..n {
            let angle = i as f32 * TAU / n as f32;
            let mut pose = Pose::at(Vec3::new(
                params.radius * angle.cos(),
                params.radius * angle.sin(),
                0.0,
            ));
            // Face tangentially so every bar grows along the ring normal
            pose.rotation.z = angle + FRAC_PI_2;
            bars.push(Cuboid::new(
                pose,
                Vec3::new(params.bar_width, params.bar_height, params.bar_width),
                BAR_COLOR,
            ));
        }
        Self { bars, params }
    }

    /// Advance every bar one frame from the given spectrum sample.
    ///
    /// One pass over the first half of the ring; each computed
    /// (hue, target scale) pair is applied to bar `i` and, with the nudge
    /// direction flipped, to its mirror `n - i`. The two halves therefore
    /// always agree within a single frame.
    pub fn update(&mut self, spectrum: &[f32], has_bass: bool, time_hue: f32) {
        let n = self.params.vertex_count;
        let inner = self.params.inner_band();

        for i in 0..=n / 2 {
            let mut frequency = spectrum.get(i).copied().unwrap_or(0.0);
            if frequency == 0.0 || frequency.is_nan() {
                frequency = self.params.frequency_floor;
            }
            let target_scale = frequency / self.params.scale_divisor;
            let hue = (time_hue + i as f32 * self.params.hue_spread).rem_euclid(1.0);
            let boosted = has_bass && inner.contains(&i);

            self.apply(i, hue, target_scale, boosted, 1.0);
            if i != 0 {
                self.apply(n - i, hue, target_scale, boosted, -1.0);
            }
        }
    }

    fn apply(&mut self, index: usize, hue: f32, target_scale: f32, boosted: bool, nudge_sign: f32) {
        let p = &self.params;
        let bar = &mut self.bars[index];

        let intensity = if boosted {
            bar.pose.scale.y = approach(
                bar.pose.scale.y,
                target_scale * p.boost_scale,
                p.scale_smoothing,
            );
            bar.pose.position.y += p.jump_offset * nudge_sign;
            p.boost_intensity
        } else {
            bar.pose.scale.y = approach(bar.pose.scale.y, target_scale, p.scale_smoothing);
            bar.pose.position.y = approach(
                bar.pose.position.y,
                bar.rest().position.y,
                p.settle_smoothing,
            );
            p.base_intensity
        };
        bar.set_emissive_hsl(hue, 1.0, 0.5, intensity);
    }

    pub fn bars(&self) -> &[Cuboid] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_ring(vertex_count: usize) -> SpectrumRing {
        SpectrumRing::new(RingParams {
            vertex_count,
            ..RingParams::default()
        })
    }

    #[test]
    fn test_bars_sit_on_the_circle() {
        let ring = small_ring(16);
        let radius = ring.params.radius;

        let first = &ring.bars()[0];
        assert!((first.pose.position - Vec3::new(radius, 0.0, 0.0)).length() < 1e-5);
        assert!((first.pose.rotation.z - FRAC_PI_2).abs() < 1e-6);

        let quarter = &ring.bars()[4];
        assert!((quarter.pose.position - Vec3::new(0.0, radius, 0.0)).length() < 1e-4);

        for bar in ring.bars() {
            assert!((bar.pose.position.truncate().length() - radius).abs() < 1e-4);
            assert_eq!(bar.pose.position.z, 0.0);
        }
    }

    #[test]
    fn test_mirrored_bars_agree_within_a_frame() {
        let mut ring = small_ring(16);
        let spectrum: Vec<f32> = (0..16).map(|i| 20.0 + i as f32 * 7.0).collect();

        ring.update(&spectrum, false, 0.123);

        for i in 1..=8usize {
            let a = &ring.bars()[i];
            let b = &ring.bars()[16 - i];
            assert_eq!(a.pose.scale.y, b.pose.scale.y, "scale mismatch at {}", i);
            assert_eq!(a.emissive, b.emissive, "hue mismatch at {}", i);
        }
    }

    #[test]
    fn test_degenerate_bins_are_floored() {
        let mut ring = small_ring(8);
        let spectrum = [80.0, 0.0, f32::NAN, 40.0, 80.0, 0.0, f32::NAN, 40.0];

        ring.update(&spectrum, false, 0.0);

        // Bin 1 reads zero, so both bar 1 and its mirror are driven by the
        // floor value 10: target scale 10/8 = 1.25, eased from 1.0.
        let expected = 1.0 + (1.25 - 1.0) * ring.params.scale_smoothing;
        let a = ring.bars()[1].pose.scale.y;
        let b = ring.bars()[7].pose.scale.y;
        assert!((a - expected).abs() < 1e-6);
        assert_eq!(a, b);

        // Held input converges to the target
        for _ in 0..100 {
            ring.update(&spectrum, false, 0.0);
        }
        assert!((ring.bars()[1].pose.scale.y - 1.25).abs() < 1e-3);
        assert!((ring.bars()[7].pose.scale.y - 1.25).abs() < 1e-3);
    }

    #[test]
    fn test_bass_boost_hits_only_the_inner_band() {
        let mut ring = small_ring(16);
        let spectrum = vec![80.0; 16];

        ring.update(&spectrum, true, 0.0);

        // 16 bars: margin 3, boosted indices 3..=5 of the half-loop
        let boosted = &ring.bars()[4];
        let rest_y = boosted.rest().position.y;
        assert!((boosted.pose.position.y - rest_y - ring.params.jump_offset).abs() < 1e-6);
        assert_eq!(boosted.emissive_intensity, ring.params.boost_intensity);

        // The mirror jumps the opposite way
        let mirror = &ring.bars()[12];
        assert!((mirror.pose.position.y - mirror.rest().position.y + ring.params.jump_offset)
            .abs()
            < 1e-6);

        // Outside the band: normal intensity, no jump
        let outer = &ring.bars()[1];
        assert_eq!(outer.emissive_intensity, ring.params.base_intensity);
        assert!((outer.pose.position.y - outer.rest().position.y).abs() < 1e-5);
    }

    #[test]
    fn test_boosted_scale_triples_the_target() {
        let mut ring = small_ring(16);
        let spectrum = vec![80.0; 16];

        for _ in 0..200 {
            ring.update(&spectrum, true, 0.0);
        }
        // 80 / 8 = 10, tripled while the boost holds
        assert!((ring.bars()[4].pose.scale.y - 30.0).abs() < 1e-2);
        assert!((ring.bars()[1].pose.scale.y - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_bars_settle_back_after_boost() {
        let mut ring = small_ring(16);
        let spectrum = vec![80.0; 16];

        for _ in 0..10 {
            ring.update(&spectrum, true, 0.0);
        }
        let jumped = ring.bars()[4].pose.position.y;
        let rest_y = ring.bars()[4].rest().position.y;
        assert!(jumped > rest_y);

        for _ in 0..200 {
            ring.update(&spectrum, false, 0.0);
        }
        assert!((ring.bars()[4].pose.position.y - rest_y).abs() < 1e-3);
    }
}
