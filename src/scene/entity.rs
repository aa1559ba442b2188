//! The one visual entity kind: a positioned, scaled, colored cuboid.

use glam::Vec3;

/// Live transform of an entity. `scale` is a multiplier on the entity's
/// fixed dimensions, so a bar growing to twice its rest height reads as
/// `scale.y == 2.0` regardless of the geometry's base size.
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Reference transform recorded at creation, used as the elastic "rest"
/// target when an entity eases back after a boost.
#[derive(Debug, Clone, Copy)]
pub struct RestPose {
    pub position: Vec3,
    pub scale: Vec3,
}

/// A box in the scene: drift cube or spectrum bar.
#[derive(Debug, Clone)]
pub struct Cuboid {
    pub pose: Pose,
    rest: RestPose,

    /// Fixed geometry size (world units); animation never touches this
    pub dimensions: Vec3,

    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl Cuboid {
    pub fn new(pose: Pose, dimensions: Vec3, color: [f32; 3]) -> Self {
        let rest = RestPose {
            position: pose.position,
            scale: pose.scale,
        };
        Self {
            pose,
            rest,
            dimensions,
            color,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
        }
    }

    pub fn rest(&self) -> &RestPose {
        &self.rest
    }

    /// Recreate the entity in place at a new position: same slot, same
    /// geometry, fresh rest pose. This is the respawn path — no
    /// allocation, no identity churn.
    pub fn respawn_at(&mut self, position: Vec3) {
        self.pose.position = position;
        self.rest.position = position;
    }

    pub fn set_emissive_hsl(&mut self, hue: f32, saturation: f32, lightness: f32, intensity: f32) {
        self.emissive = hsl_to_rgb(hue, saturation, lightness);
        self.emissive_intensity = intensity;
    }
}

/// HSL to linear RGB. Hue is a fraction of a full cycle; saturation 1.0
/// and lightness 0.5 give the pure, vibrant colors the ring uses.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(1.0);
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let hp = h * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_pose_survives_mutation() {
        let mut cuboid = Cuboid::new(
            Pose::at(Vec3::new(1.0, 2.0, 3.0)),
            Vec3::ONE,
            [0.5; 3],
        );
        cuboid.pose.position.y += 10.0;
        cuboid.pose.scale.y = 4.0;

        assert_eq!(cuboid.rest().position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cuboid.rest().scale, Vec3::ONE);
    }

    #[test]
    fn test_respawn_resets_rest_position() {
        let mut cuboid = Cuboid::new(Pose::at(Vec3::ZERO), Vec3::ONE, [0.5; 3]);
        cuboid.respawn_at(Vec3::new(-7.0, 4.0, -100.0));

        assert_eq!(cuboid.pose.position, Vec3::new(-7.0, 4.0, -100.0));
        assert_eq!(cuboid.rest().position, Vec3::new(-7.0, 4.0, -100.0));
    }

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-5 && red[1].abs() < 1e-5 && red[2].abs() < 1e-5);

        let green = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
        assert!(green[0].abs() < 1e-5 && (green[1] - 1.0).abs() < 1e-5);

        // Hue wraps past a full cycle
        let wrapped = hsl_to_rgb(1.25, 1.0, 0.5);
        let quarter = hsl_to_rgb(0.25, 1.0, 0.5);
        for (a, b) in wrapped.iter().zip(quarter.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
