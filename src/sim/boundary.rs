//! Playfield extents derived from the viewport
//!
//! Depth is fixed; width follows the viewport aspect ratio so the arena always
//! fills the screen. The floor's top surface is y = 0.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    Floor,
    Ceiling,
    Wall,
}

/// Static box collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryVolume {
    pub kind: BoundaryKind,
    pub center: Vec3,
    pub half_extents: Vec3,
}

/// Current playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub thickness: f32,
}

impl Boundary {
    /// Extents for a viewport in pixels; `None` for a degenerate viewport
    pub fn from_viewport(viewport_width: f32, viewport_height: f32, tuning: &Tuning) -> Option<Self> {
        if !(viewport_width > 0.0 && viewport_height > 0.0) {
            return None;
        }
        let aspect = viewport_width / viewport_height;
        Some(Self {
            width: tuning.arena_depth * aspect,
            depth: tuning.arena_depth,
            height: tuning.wall_height,
            thickness: tuning.wall_thickness,
        })
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn half_depth(&self) -> f32 {
        self.depth / 2.0
    }

    /// Floor, four walls and ceiling
    pub fn volumes(&self) -> [BoundaryVolume; 6] {
        let t = self.thickness / 2.0;
        let hw = self.half_width();
        let hd = self.half_depth();
        let hh = self.height / 2.0;
        // Slabs overhang the corners so nothing slips between them
        let span_x = hw + self.thickness;
        let span_z = hd + self.thickness;

        let slab = |kind, center, half_extents| BoundaryVolume {
            kind,
            center,
            half_extents,
        };
        [
            slab(BoundaryKind::Floor, Vec3::new(0.0, -t, 0.0), Vec3::new(span_x, t, span_z)),
            slab(
                BoundaryKind::Ceiling,
                Vec3::new(0.0, self.height + t, 0.0),
                Vec3::new(span_x, t, span_z),
            ),
            slab(BoundaryKind::Wall, Vec3::new(-hw - t, hh, 0.0), Vec3::new(t, hh, span_z)),
            slab(BoundaryKind::Wall, Vec3::new(hw + t, hh, 0.0), Vec3::new(t, hh, span_z)),
            slab(BoundaryKind::Wall, Vec3::new(0.0, hh, -hd - t), Vec3::new(span_x, hh, t)),
            slab(BoundaryKind::Wall, Vec3::new(0.0, hh, hd + t), Vec3::new(span_x, hh, t)),
        ]
    }

    /// Keep a point at least `margin` inside the walls and below the ceiling
    pub fn clamp_inside(&self, position: Vec3, margin: f32) -> Vec3 {
        let hw = (self.half_width() - margin).max(0.0);
        let hd = (self.half_depth() - margin).max(0.0);
        let top = (self.height - margin).max(margin);
        Vec3::new(
            position.x.clamp(-hw, hw),
            position.y.min(top),
            position.z.clamp(-hd, hd),
        )
    }
}
