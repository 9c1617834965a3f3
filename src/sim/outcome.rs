//! Reading the winning face off a settled die
//!
//! Cubes are scored face-by-face against world-up. Other shapes do not have a
//! single unambiguous up face in this model: the coin uses a direct up/down
//! test and everything else draws uniformly, keeping the body where it lies.

use glam::{Quat, Vec3};
use rand::Rng;

use super::variant::{CUBE_FACES, DieVariant, FaceEntry, OutcomePolicy};
use crate::consts::WORLD_UP;

/// Resolved result of a throw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Face number, 1..=face_count
    pub number: u32,
    /// Orientation to recenter into
    pub orientation: Quat,
    /// Read from geometry rather than drawn
    pub deterministic: bool,
}

/// Face whose world-space normal points most along `direction`.
///
/// Faces are scored in table order with a strict comparison, so exact ties
/// go to the first-listed face.
pub fn face_toward(faces: &[FaceEntry], orientation: Quat, direction: Vec3) -> Option<&FaceEntry> {
    let mut best: Option<(&FaceEntry, f32)> = None;
    for face in faces {
        let score = (orientation * face.normal).dot(direction);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((face, score)),
        }
    }
    best.map(|(face, _)| face)
}

/// Cube face pointing up for this orientation
pub fn resolve_top_face(orientation: Quat) -> u32 {
    face_toward(&CUBE_FACES, orientation, WORLD_UP)
        .map(|face| face.number)
        .unwrap_or(CUBE_FACES[0].number)
}

/// Coin: local +Y facing up (or exactly sideways) is heads
pub fn resolve_coin(orientation: Quat) -> u32 {
    if (orientation * Vec3::Y).dot(WORLD_UP) >= 0.0 { 1 } else { 2 }
}

/// Resolve a settled die according to its variant's policy
pub fn resolve_outcome<R: Rng + ?Sized>(
    variant: &DieVariant,
    orientation: Quat,
    rng: &mut R,
) -> Outcome {
    match variant.policy {
        OutcomePolicy::FaceTable(faces) => match face_toward(faces, orientation, WORLD_UP) {
            Some(face) => Outcome {
                number: face.number,
                orientation: face.canonical,
                deterministic: true,
            },
            None => uniform(variant, orientation, rng),
        },
        OutcomePolicy::UpDown => Outcome {
            number: resolve_coin(orientation),
            orientation,
            deterministic: true,
        },
        OutcomePolicy::Uniform => uniform(variant, orientation, rng),
    }
}

fn uniform<R: Rng + ?Sized>(variant: &DieVariant, orientation: Quat, rng: &mut R) -> Outcome {
    Outcome {
        number: rng.random_range(1..=variant.face_count),
        orientation,
        deterministic: false,
    }
}
