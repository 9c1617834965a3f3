//! Die variants
//!
//! A face count maps to exactly one immutable [`DieVariant`]. The outcome
//! policy is an explicit field rather than something inferred from shape.

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FACE_COUNT, MIN_FACE_COUNT};
use crate::error::{DiceError, Result};

/// Physical shape family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DieShape {
    Coin,
    Tetrahedron,
    Cube,
    Dodecahedron,
    /// n-sided prism rolling on its rectangular faces
    Prism { sides: u32 },
}

impl DieShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            DieShape::Coin => "coin",
            DieShape::Tetrahedron => "tetrahedron",
            DieShape::Cube => "cube",
            DieShape::Dodecahedron => "dodecahedron",
            DieShape::Prism { .. } => "prism",
        }
    }
}

/// One readable face: local normal, printed number, and the orientation
/// that puts that normal exactly on world-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceEntry {
    pub normal: Vec3,
    pub number: u32,
    pub canonical: Quat,
}

/// Cube faces in resolution order: up, down, front, back, right, left.
/// Opposite faces sum to 7.
pub const CUBE_FACES: [FaceEntry; 6] = [
    FaceEntry {
        normal: Vec3::Y,
        number: 6,
        canonical: Quat::IDENTITY,
    },
    FaceEntry {
        normal: Vec3::NEG_Y,
        number: 1,
        // 180° about X
        canonical: Quat::from_xyzw(1.0, 0.0, 0.0, 0.0),
    },
    FaceEntry {
        normal: Vec3::Z,
        number: 2,
        // -90° about X
        canonical: Quat::from_xyzw(-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2),
    },
    FaceEntry {
        normal: Vec3::NEG_Z,
        number: 5,
        // +90° about X
        canonical: Quat::from_xyzw(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2),
    },
    FaceEntry {
        normal: Vec3::X,
        number: 3,
        // +90° about Z
        canonical: Quat::from_xyzw(0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    },
    FaceEntry {
        normal: Vec3::NEG_X,
        number: 4,
        // -90° about Z
        canonical: Quat::from_xyzw(0.0, 0.0, -FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    },
];

/// How a settled die is read
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutcomePolicy {
    /// Highest-scoring face normal wins, then snap to its canonical pose
    FaceTable(&'static [FaceEntry]),
    /// Local +Y up is heads (1), otherwise tails (2)
    UpDown,
    /// No unambiguous winning face; uniform draw, no snap
    Uniform,
}

/// Immutable die descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct DieVariant {
    pub face_count: u32,
    pub shape: DieShape,
    pub policy: OutcomePolicy,
    /// Characteristic size (edge length or diameter), meters
    pub size: f32,
    /// Height of the body origin when resting on the floor
    pub rest_height: f32,
}

impl DieVariant {
    pub fn is_supported(face_count: u32) -> bool {
        (MIN_FACE_COUNT..=MAX_FACE_COUNT).contains(&face_count)
    }

    /// Look up the variant for a face count
    pub fn for_face_count(face_count: u32) -> Result<Self> {
        if !Self::is_supported(face_count) {
            return Err(DiceError::UnsupportedFaceCount(face_count));
        }
        Ok(match face_count {
            2 => Self::coin(),
            4 => Self::tetrahedron(),
            6 => Self::cube(),
            12 => Self::dodecahedron(),
            sides => Self::prism(sides),
        })
    }

    pub fn cube() -> Self {
        let size = 1.0;
        Self {
            face_count: 6,
            shape: DieShape::Cube,
            policy: OutcomePolicy::FaceTable(&CUBE_FACES),
            size,
            rest_height: size / 2.0,
        }
    }

    pub fn coin() -> Self {
        let thickness = 0.12;
        Self {
            face_count: 2,
            shape: DieShape::Coin,
            policy: OutcomePolicy::UpDown,
            size: 1.2,
            rest_height: thickness / 2.0,
        }
    }

    pub fn tetrahedron() -> Self {
        let edge = 1.3;
        Self {
            face_count: 4,
            shape: DieShape::Tetrahedron,
            policy: OutcomePolicy::Uniform,
            size: edge,
            // Centroid sits at a quarter of the height above a resting face
            rest_height: edge * (2.0_f32 / 3.0).sqrt() / 4.0,
        }
    }

    pub fn dodecahedron() -> Self {
        let edge = 0.55;
        Self {
            face_count: 12,
            shape: DieShape::Dodecahedron,
            policy: OutcomePolicy::Uniform,
            size: edge,
            // Inradius
            rest_height: edge * 1.113_516,
        }
    }

    pub fn prism(sides: u32) -> Self {
        let circumradius = 0.6;
        Self {
            face_count: sides,
            shape: DieShape::Prism { sides },
            policy: OutcomePolicy::Uniform,
            size: circumradius * 2.0,
            // Apothem of the n-gon cross-section
            rest_height: circumradius * (PI / sides as f32).cos(),
        }
    }

    /// True only for variants read off a face-normal table
    pub fn supports_deterministic_outcome(&self) -> bool {
        matches!(self.policy, OutcomePolicy::FaceTable(_))
    }

    /// Radius of the sphere enclosing the die in any orientation
    pub fn bounding_radius(&self) -> f32 {
        match self.shape {
            DieShape::Coin => (self.size / 2.0).hypot(self.rest_height),
            DieShape::Cube => self.size * 3.0_f32.sqrt() / 2.0,
            DieShape::Tetrahedron => self.size * 6.0_f32.sqrt() / 4.0,
            DieShape::Dodecahedron => self.size * 1.401_259,
            // Cross-section circumradius, length equal to the diameter
            DieShape::Prism { .. } => (self.size / 2.0) * 2.0_f32.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_covers_supported_range() {
        for n in MIN_FACE_COUNT..=MAX_FACE_COUNT {
            let variant = DieVariant::for_face_count(n).unwrap();
            assert_eq!(variant.face_count, n);
            assert!(variant.rest_height > 0.0);
        }
        assert_eq!(DieVariant::for_face_count(6).unwrap().shape, DieShape::Cube);
        assert_eq!(DieVariant::for_face_count(2).unwrap().shape, DieShape::Coin);
        assert_eq!(
            DieVariant::for_face_count(7).unwrap().shape,
            DieShape::Prism { sides: 7 }
        );
    }

    #[test]
    fn test_unsupported_counts_rejected() {
        for n in [0, 1, 13, 20, 100] {
            assert!(matches!(
                DieVariant::for_face_count(n),
                Err(DiceError::UnsupportedFaceCount(c)) if c == n
            ));
        }
    }

    #[test]
    fn test_only_cube_is_deterministic() {
        for n in MIN_FACE_COUNT..=MAX_FACE_COUNT {
            let variant = DieVariant::for_face_count(n).unwrap();
            assert_eq!(variant.supports_deterministic_outcome(), n == 6, "d{n}");
        }
    }

    #[test]
    fn test_bounding_radius_encloses_resting_die() {
        for n in MIN_FACE_COUNT..=MAX_FACE_COUNT {
            let variant = DieVariant::for_face_count(n).unwrap();
            assert!(variant.bounding_radius() >= variant.rest_height, "d{n}");
        }
        assert!((DieVariant::cube().bounding_radius() - 0.866_025).abs() < 1e-4);
        assert!((DieVariant::dodecahedron().bounding_radius() - 0.770_692).abs() < 1e-4);
        assert!((DieVariant::tetrahedron().bounding_radius() - 0.796_084).abs() < 1e-4);
    }

    #[test]
    fn test_cube_table_conventions() {
        for face in &CUBE_FACES {
            let up = face.canonical * face.normal;
            assert!((up - Vec3::Y).length() < 1e-5, "face {} -> {:?}", face.number, up);
            assert!((face.canonical.length() - 1.0).abs() < 1e-5);

            let opposite = CUBE_FACES
                .iter()
                .find(|f| (f.normal + face.normal).length() < 1e-6)
                .unwrap();
            assert_eq!(face.number + opposite.number, 7);
        }
    }
}
