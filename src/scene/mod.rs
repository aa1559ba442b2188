//! Visual entities and the two populations driving them.

mod entity;
mod field;
mod ring;

pub use entity::{hsl_to_rgb, Cuboid, Pose, RestPose};
pub use field::SpawnField;
pub use ring::SpectrumRing;
