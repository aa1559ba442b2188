//! Background cube field: spawn, drift, respawn.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;

use crate::analysis::approach;
use crate::params::FieldParams;
use crate::scene::entity::{Cuboid, Pose};

const CUBE_COLOR: [f32; 3] = [0.25, 0.25, 0.25];

/// Uniform random integer avoiding a central band: picks one of the two
/// disjoint sub-intervals `[min, -excluded]` / `[excluded, max]` with
/// equal probability.
fn ring_excluded(rng: &mut StdRng, min: i32, max: i32, excluded: i32) -> i32 {
    if rng.gen_bool(0.5) {
        rng.gen_range(min..=-excluded)
    } else {
        rng.gen_range(excluded..=max)
    }
}

/// Fixed-size population of drift cubes. The count never changes after
/// construction; cubes that reach the camera are reset in place.
pub struct SpawnField {
    cubes: Vec<Cuboid>,
    params: FieldParams,
    rng: StdRng,
}

impl SpawnField {
    pub fn new(params: FieldParams, mut rng: StdRng) -> Self {
        let mut cubes = Vec::with_capacity(params.shape_count);
        for _ in 0..params.shape_count {
            let size = rng.gen_range(params.min_size..=params.max_size) as f32;
            let position = Vec3::new(
                ring_excluded(&mut rng, params.min_pos, params.max_pos, params.excluded_pos_range)
                    as f32,
                ring_excluded(&mut rng, params.min_pos, params.max_pos, params.excluded_pos_range)
                    as f32,
                params.spawn_depth + rng.gen_range(0.0..params.spawn_band),
            );
            cubes.push(Cuboid::new(
                Pose::at(position),
                Vec3::splat(size),
                CUBE_COLOR,
            ));
        }
        Self { cubes, params, rng }
    }

    /// Advance every cube one frame. `audio_effect` is the clamped
    /// loudness displacement pushing cubes toward the camera; `time_hue`
    /// drives the shared emissive color cycle.
    pub fn update(&mut self, audio_effect: f32, time_hue: f32) {
        let p = &self.params;
        for cube in &mut self.cubes {
            let pos = &mut cube.pose.position;

            // Depth eases toward a target that itself advances with the
            // music, so loud passages pull the field forward faster.
            let target_z = pos.z + audio_effect;
            pos.z = approach(pos.z, target_z, p.drift_smoothing);

            // Diverging drift away from the center line
            pos.x += pos.x / p.divergence_divisor * p.drift_smoothing;
            pos.y += pos.y / p.divergence_divisor * p.drift_smoothing;

            if pos.z >= p.respawn_depth {
                let fresh = Vec3::new(
                    ring_excluded(&mut self.rng, p.min_pos, p.max_pos, p.excluded_pos_range) as f32,
                    ring_excluded(&mut self.rng, p.min_pos, p.max_pos, p.excluded_pos_range) as f32,
                    p.spawn_depth,
                );
                cube.respawn_at(fresh);
            }

            cube.pose.rotation.x += p.tumble_rate;
            cube.pose.rotation.y += p.tumble_rate;
            cube.set_emissive_hsl(time_hue, 1.0, 0.5, p.cube_emissive_intensity);
        }
    }

    pub fn cubes(&self) -> &[Cuboid] {
        &self.cubes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_ring_excluded_avoids_central_band() {
        let mut rng = rng();
        let mut low = 0usize;
        let mut high = 0usize;
        for _ in 0..10_000 {
            let v = ring_excluded(&mut rng, -30, 30, 5);
            assert!(
                !(-5 < v && v < 5),
                "sample {} fell strictly inside the excluded band",
                v
            );
            assert!((-30..=30).contains(&v));
            if v < 0 {
                low += 1;
            } else {
                high += 1;
            }
        }
        // Both branches get taken about half the time
        assert!(low > 4_000 && high > 4_000);
    }

    #[test]
    fn test_initial_spawn_respects_bounds() {
        let params = FieldParams::default();
        let field = SpawnField::new(params.clone(), rng());

        assert_eq!(field.cubes().len(), params.shape_count);
        for cube in field.cubes() {
            let pos = cube.pose.position;
            assert!(pos.x.abs() >= params.excluded_pos_range as f32);
            assert!(pos.y.abs() >= params.excluded_pos_range as f32);
            assert!(pos.z >= params.spawn_depth && pos.z < params.spawn_depth + params.spawn_band);

            let size = cube.dimensions.x;
            assert!(size >= params.min_size as f32 && size <= params.max_size as f32);
            assert_eq!(cube.dimensions, Vec3::splat(size));
        }
    }

    #[test]
    fn test_loudness_pulls_cubes_forward() {
        let params = FieldParams::default();
        let mut field = SpawnField::new(params, rng());

        // Park well clear of the respawn threshold so the step is pure drift
        for cube in &mut field.cubes {
            cube.pose.position.z = -50.0;
        }
        field.update(10.0, 0.0);

        for cube in field.cubes() {
            // Each depth moved by audio_effect * drift_smoothing
            assert!((cube.pose.position.z - (-49.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_respawn_resets_depth_exactly_once() {
        let params = FieldParams::default();
        let mut field = SpawnField::new(params.clone(), rng());

        // Park every cube just shy of the threshold
        for cube in &mut field.cubes {
            cube.pose.position.z = -0.01;
        }
        field.update(10.0, 0.0);

        for cube in field.cubes() {
            assert_eq!(cube.pose.position.z, params.spawn_depth);
            assert!(cube.pose.position.x.abs() >= params.excluded_pos_range as f32);
        }

        // The following quiet frame must not re-trigger the reset
        field.update(0.0, 0.0);
        for cube in field.cubes() {
            assert!(cube.pose.position.z < params.respawn_depth);
            assert!(cube.pose.position.z <= params.spawn_depth + 1.0);
        }
    }

    #[test]
    fn test_cubes_tumble_every_frame() {
        let params = FieldParams::default();
        let mut field = SpawnField::new(params.clone(), rng());

        for _ in 0..3 {
            field.update(0.0, 0.0);
        }
        for cube in field.cubes() {
            assert!((cube.pose.rotation.x - 3.0 * params.tumble_rate).abs() < 1e-6);
            assert!((cube.pose.rotation.y - 3.0 * params.tumble_rate).abs() < 1e-6);
            assert_eq!(cube.pose.rotation.z, 0.0);
        }
    }
}
