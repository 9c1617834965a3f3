//! Dice simulation module
//!
//! Everything that decides a roll lives here. It must stay deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (bodies keyed by id)
//! - No rendering or platform dependencies

pub mod animate;
pub mod boundary;
pub mod box_world;
pub mod motion;
pub mod outcome;
pub mod roller;
pub mod session;
pub mod table;
pub mod variant;
pub mod world;

pub use animate::{Delay, RecenterAnimator, ScalePulse, TaskSlot, TaskToken};
pub use boundary::{Boundary, BoundaryKind, BoundaryVolume};
pub use box_world::{BodyId, BoxWorld, Impact};
pub use motion::{MotionClass, MotionMonitor, MotionSample};
pub use outcome::{Outcome, resolve_coin, resolve_outcome, resolve_top_face};
pub use roller::{DiceRoller, RollEvent, RollObserver};
pub use session::{PhaseKind, RollPhase, RollSession};
pub use table::DiceTable;
pub use variant::{CUBE_FACES, DieShape, DieVariant, FaceEntry, OutcomePolicy};
pub use world::{BodyMode, CollisionShape, GeometryFactory, PhysicsWorld, Pose, Velocity};
