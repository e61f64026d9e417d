use crate::types::*;

/// Read-only supplier of candidate obstacles.
///
/// A single resolve call may query up to twice (once per axis), so `query`
/// must be repeatable and side-effect free. Returned order is unspecified;
/// the resolver does not depend on it for correctness, only the order of
/// same-call notifications follows it.
pub trait ObstacleSource {
    /// All obstacles overlapping or flush against `region`.
    fn query(&self, region: Rect) -> Result<Vec<Obstacle>, QueryError>;

    /// Whether `obstacle` blocks an actor approaching the given face of the
    /// obstacle (a one-way platform blocks only its `Top` face).
    fn blocks(&self, obstacle: Obstacle, face: Side) -> bool;
}

/// Per-side contact hooks invoked during resolution.
///
/// The side names the face of the ACTOR that made contact. Any hook may
/// fire several times within one resolve call (several tiles touched on the
/// same face, or bumps on both axes); none of them is at-most-once.
pub trait BumpListener {
    fn on_bump_left(&mut self, _obstacle: Obstacle) {}
    fn on_bump_right(&mut self, _obstacle: Obstacle) {}
    fn on_bump_top(&mut self, _obstacle: Obstacle) {}
    fn on_bump_bottom(&mut self, _obstacle: Obstacle) {}
}

/// No listener.
impl BumpListener for () {}

/// Buffering listener for callers that prefer polling over callbacks:
/// records every [`BumpEvent`] of a resolve call for later inspection.
#[derive(Debug, Default)]
pub struct EventSink {
    pub events: Vec<BumpEvent>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return the accumulated events.
    pub fn drain(&mut self) -> Vec<BumpEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, obstacle: Obstacle, side: Side) {
        self.events.push(BumpEvent { obstacle, side });
    }
}

impl BumpListener for EventSink {
    fn on_bump_left(&mut self, obstacle: Obstacle) {
        self.record(obstacle, Side::Left);
    }

    fn on_bump_right(&mut self, obstacle: Obstacle) {
        self.record(obstacle, Side::Right);
    }

    fn on_bump_top(&mut self, obstacle: Obstacle) {
        self.record(obstacle, Side::Top);
    }

    fn on_bump_bottom(&mut self, obstacle: Obstacle) {
        self.record(obstacle, Side::Bottom);
    }
}
