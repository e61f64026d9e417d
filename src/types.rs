use glam::Vec2;
use thiserror::Error;

/// User-visible opaque key identifying an obstacle within its source
/// (e.g., a tile's cell index or an object slot).
pub type ObKey = u64;

/// Axis-aligned rectangle in world units. Value type; resolution never
/// mutates a rect in place, it always returns fresh ones.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Center + half extents constructor.
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(self) -> Vec2 {
        self.max - self.min
    }

    /// Smallest rect containing both `self` and `other`.
    pub fn union(self, other: Rect) -> Rect {
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Strict overlap: edge-touching rects do NOT overlap.
    pub fn overlaps(self, other: Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn translated(self, delta: Vec2) -> Rect {
        Rect {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    pub(crate) fn is_finite(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// A face of a rectangle. In notifications this is the face of the ACTOR
/// that made contact; in [`crate::ObstacleSource::blocks`] it is the face
/// of the OBSTACLE being approached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// The facing side: an actor's `Right` face meets an obstacle's `Left`.
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

/// Bitmask of sides, used for per-side blocking flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SideSet(pub u8);

impl SideSet {
    pub const NONE: SideSet = SideSet(0);
    pub const LEFT: SideSet = SideSet(1);
    pub const RIGHT: SideSet = SideSet(1 << 1);
    pub const TOP: SideSet = SideSet(1 << 2);
    pub const BOTTOM: SideSet = SideSet(1 << 3);
    pub const ALL: SideSet = SideSet(0b1111);

    fn bit(side: Side) -> u8 {
        match side {
            Side::Left => Self::LEFT.0,
            Side::Right => Self::RIGHT.0,
            Side::Top => Self::TOP.0,
            Side::Bottom => Self::BOTTOM.0,
        }
    }

    pub fn contains(self, side: Side) -> bool {
        self.0 & Self::bit(side) != 0
    }

    pub fn with(self, side: Side) -> SideSet {
        SideSet(self.0 | Self::bit(side))
    }

    pub fn without(self, side: Side) -> SideSet {
        SideSet(self.0 & !Self::bit(side))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for SideSet {
    type Output = SideSet;
    fn bitor(self, rhs: SideSet) -> SideSet {
        SideSet(self.0 | rhs.0)
    }
}

/// One candidate obstacle as reported by a source for this resolve call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub key: ObKey,
    pub rect: Rect,
}

/// A detected blocking contact: which obstacle, on which face of the actor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BumpEvent {
    pub obstacle: Obstacle,
    pub side: Side,
}

/// Velocity response applied once clipping is done.
#[derive(Copy, Clone, Debug, Default)]
pub enum BumpPolicy {
    /// Zero only the bumped axis, sliding along the other. The usual
    /// player-character response.
    #[default]
    Stop,
    /// A bump on either axis zeroes both components.
    StopAll,
    /// Negate the bumped axis, scaled by `restitution` (1.0 = elastic).
    Bounce { restitution: f32 },
    /// Caller-supplied response: `(velocity, bumped_x, bumped_y) -> velocity`.
    Custom(fn(Vec2, bool, bool) -> Vec2),
}

impl BumpPolicy {
    pub fn apply(self, vel: Vec2, bumped_x: bool, bumped_y: bool) -> Vec2 {
        match self {
            BumpPolicy::Stop => Vec2::new(
                if bumped_x { 0.0 } else { vel.x },
                if bumped_y { 0.0 } else { vel.y },
            ),
            BumpPolicy::StopAll => {
                if bumped_x || bumped_y {
                    Vec2::ZERO
                } else {
                    vel
                }
            }
            BumpPolicy::Bounce { restitution } => Vec2::new(
                if bumped_x { -vel.x * restitution } else { vel.x },
                if bumped_y { -vel.y * restitution } else { vel.y },
            ),
            BumpPolicy::Custom(f) => f(vel, bumped_x, bumped_y),
        }
    }
}

/// Collider configuration, immutable after construction.
#[derive(Copy, Clone, Debug)]
pub struct ColliderConfig {
    /// Velocity response strategy.
    pub policy: BumpPolicy,
    /// Tolerance when deciding whether an obstacle lies ahead of the
    /// pre-move rect (absorbs float error from earlier flush clips).
    pub contact_eps: f32,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            policy: BumpPolicy::Stop,
            contact_eps: 1e-4,
        }
    }
}

/// Outcome of one resolve call. The flags are call-scoped: reset on entry,
/// never carried across calls or actors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionResult {
    pub rect: Rect,
    pub velocity: Vec2,
    pub bumped_x: bool,
    pub bumped_y: bool,
}

/// Failure reported by an [`crate::ObstacleSource`] query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The region lies outside what this source can answer for. The stock
    /// tile sources treat out-of-grid cells as empty and never return this;
    /// it is available to strict custom sources.
    #[error("query region {0:?} out of bounds")]
    OutOfBounds(Rect),
    /// The region contains NaN or infinite coordinates.
    #[error("query region {0:?} is not finite")]
    NonFinite(Rect),
}

/// Failure of a whole resolve call. A broken map query breaks game
/// correctness immediately, so it is surfaced rather than swallowed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("obstacle query failed: {0}")]
    Query(#[from] QueryError),
}
