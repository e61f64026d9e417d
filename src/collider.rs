use glam::Vec2;
use tracing::{trace, warn};

use crate::api::{BumpListener, ObstacleSource};
use crate::types::*;

/// Axis-separated collision resolver.
///
/// Holds only immutable configuration; every per-call output lives in
/// locals and the returned [`CollisionResult`], so one collider may be
/// shared by any number of sequentially resolved actors.
pub struct MapCollider {
    pub cfg: ColliderConfig,
}

impl MapCollider {
    pub fn new(cfg: ColliderConfig) -> Self {
        Self { cfg }
    }

    /// Convenience constructor with the default config and a chosen policy.
    pub fn with_policy(policy: BumpPolicy) -> Self {
        Self {
            cfg: ColliderConfig {
                policy,
                ..ColliderConfig::default()
            },
        }
    }

    /// Resolve one tick of motion.
    ///
    /// `last` is the actor's rect before integration and must not overlap a
    /// blocking obstacle; `tentative` is `last` displaced by `vel * dt`.
    /// The X axis is clipped first, then Y against the already-x-corrected
    /// extent; this ordering is what gives corner contacts the usual
    /// platformer slide. Violated preconditions are logged and resolution
    /// continues best-effort rather than aborting the simulation; a failed
    /// obstacle query is fatal for the call and propagated.
    pub fn resolve<S, L>(
        &self,
        last: Rect,
        tentative: Rect,
        vel: Vec2,
        source: &S,
        listener: &mut L,
    ) -> Result<CollisionResult, ResolveError>
    where
        S: ObstacleSource,
        L: BumpListener,
    {
        let delta = tentative.min - last.min;
        if delta.x * vel.x < 0.0
            || delta.y * vel.y < 0.0
            || (vel.x == 0.0 && delta.x != 0.0)
            || (vel.y == 0.0 && delta.y != 0.0)
        {
            warn!(?delta, ?vel, "tentative rect displacement disagrees with velocity");
        }

        // X pass: tentative x-extent at the pre-move y-extent.
        let x_rect = Rect::new(
            Vec2::new(tentative.min.x, last.min.y),
            Vec2::new(tentative.max.x, last.max.y),
        );
        let (x_rect, bumped_x) = self.clip_x(last, tentative, x_rect, vel.x, source, listener)?;

        // Y pass: corrected x-extent, tentative y-extent.
        let y_rect = Rect::new(
            Vec2::new(x_rect.min.x, tentative.min.y),
            Vec2::new(x_rect.max.x, tentative.max.y),
        );
        let (rect, bumped_y) = self.clip_y(last, tentative, y_rect, vel.y, source, listener)?;

        let velocity = self.cfg.policy.apply(vel, bumped_x, bumped_y);
        trace!(bumped_x, bumped_y, ?rect, "resolved");
        Ok(CollisionResult {
            rect,
            velocity,
            bumped_x,
            bumped_y,
        })
    }

    fn clip_x<S, L>(
        &self,
        last: Rect,
        tentative: Rect,
        mut rect: Rect,
        vx: f32,
        source: &S,
        listener: &mut L,
    ) -> Result<(Rect, bool), ResolveError>
    where
        S: ObstacleSource,
        L: BumpListener,
    {
        // A resting actor must not re-bump against a wall it is flush with.
        if vx == 0.0 {
            return Ok((rect, false));
        }
        let start = Rect::new(
            Vec2::new(last.min.x, rect.min.y),
            Vec2::new(last.max.x, rect.max.y),
        );
        let eps = self.cfg.contact_eps;
        let mut bumped = false;
        for ob in source.query(last.union(rect))? {
            // Tiles merely slid along (edge-flush) never block this axis.
            if !(ob.rect.min.y < rect.max.y && ob.rect.max.y > rect.min.y) {
                continue;
            }
            if vx > 0.0 {
                if ob.rect.overlaps(start) {
                    if source.blocks(ob, Side::Left) {
                        warn!(key = ob.key, "actor starts inside a blocking obstacle; ignoring it this call");
                    }
                    continue;
                }
                let ahead = ob.rect.min.x >= last.max.x - eps;
                if ahead && tentative.max.x > ob.rect.min.x && source.blocks(ob, Side::Left) {
                    // Flush against the nearest near edge, width preserved.
                    if ob.rect.min.x < rect.max.x {
                        let w = rect.max.x - rect.min.x;
                        rect.max.x = ob.rect.min.x;
                        rect.min.x = rect.max.x - w;
                    }
                    bumped = true;
                    listener.on_bump_right(ob);
                }
            } else {
                if ob.rect.overlaps(start) {
                    if source.blocks(ob, Side::Right) {
                        warn!(key = ob.key, "actor starts inside a blocking obstacle; ignoring it this call");
                    }
                    continue;
                }
                let ahead = ob.rect.max.x <= last.min.x + eps;
                if ahead && tentative.min.x < ob.rect.max.x && source.blocks(ob, Side::Right) {
                    if ob.rect.max.x > rect.min.x {
                        let w = rect.max.x - rect.min.x;
                        rect.min.x = ob.rect.max.x;
                        rect.max.x = rect.min.x + w;
                    }
                    bumped = true;
                    listener.on_bump_left(ob);
                }
            }
        }
        Ok((rect, bumped))
    }

    fn clip_y<S, L>(
        &self,
        last: Rect,
        tentative: Rect,
        mut rect: Rect,
        vy: f32,
        source: &S,
        listener: &mut L,
    ) -> Result<(Rect, bool), ResolveError>
    where
        S: ObstacleSource,
        L: BumpListener,
    {
        if vy == 0.0 {
            return Ok((rect, false));
        }
        let start = Rect::new(
            Vec2::new(rect.min.x, last.min.y),
            Vec2::new(rect.max.x, last.max.y),
        );
        let eps = self.cfg.contact_eps;
        let mut bumped = false;
        for ob in source.query(start.union(rect))? {
            if !(ob.rect.min.x < rect.max.x && ob.rect.max.x > rect.min.x) {
                continue;
            }
            if vy > 0.0 {
                if ob.rect.overlaps(start) {
                    if source.blocks(ob, Side::Bottom) {
                        warn!(key = ob.key, "actor starts inside a blocking obstacle; ignoring it this call");
                    }
                    continue;
                }
                let ahead = ob.rect.min.y >= last.max.y - eps;
                if ahead && tentative.max.y > ob.rect.min.y && source.blocks(ob, Side::Bottom) {
                    if ob.rect.min.y < rect.max.y {
                        let h = rect.max.y - rect.min.y;
                        rect.max.y = ob.rect.min.y;
                        rect.min.y = rect.max.y - h;
                    }
                    bumped = true;
                    listener.on_bump_top(ob);
                }
            } else {
                if ob.rect.overlaps(start) {
                    if source.blocks(ob, Side::Top) {
                        warn!(key = ob.key, "actor starts inside a blocking obstacle; ignoring it this call");
                    }
                    continue;
                }
                let ahead = ob.rect.max.y <= last.min.y + eps;
                if ahead && tentative.min.y < ob.rect.max.y && source.blocks(ob, Side::Top) {
                    if ob.rect.max.y > rect.min.y {
                        let h = rect.max.y - rect.min.y;
                        rect.min.y = ob.rect.max.y;
                        rect.max.y = rect.min.y + h;
                    }
                    bumped = true;
                    listener.on_bump_bottom(ob);
                }
            }
        }
        Ok((rect, bumped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EventSink;
    use crate::sources::{FreeObjectSource, PropertyTileSource, UniformTileSource};

    fn collider() -> MapCollider {
        MapCollider::new(ColliderConfig::default())
    }

    fn rect(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Rect {
        Rect::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
    }

    #[test]
    fn test_free_space_returns_tentative_unchanged() {
        let src = FreeObjectSource::new();
        let last = rect(0.0, 0.0, 1.0, 1.0);
        let tent = last.translated(Vec2::new(0.7, -0.3));
        let vel = Vec2::new(7.0, -3.0);
        let out = collider().resolve(last, tent, vel, &src, &mut ()).unwrap();
        assert_eq!(out.rect, tent);
        assert_eq!(out.velocity, vel);
        assert!(!out.bumped_x && !out.bumped_y);
    }

    #[test]
    fn test_single_wall_right_stops_flush() {
        let mut src = FreeObjectSource::new();
        let wall = src.push(rect(1.2, 0.0, 2.2, 1.0));
        let last = rect(0.0, 0.0, 1.0, 1.0);
        let tent = last.translated(Vec2::new(0.5, 0.0));
        let mut sink = EventSink::new();
        let out = collider()
            .resolve(last, tent, Vec2::new(5.0, 0.0), &src, &mut sink)
            .unwrap();
        // Flush: zero gap, zero overlap.
        assert_eq!(out.rect, rect(0.2, 0.0, 1.2, 1.0));
        assert!(out.bumped_x);
        assert!(!out.bumped_y);
        assert_eq!(out.velocity, Vec2::ZERO);
        let events = sink.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].side, Side::Right);
        assert_eq!(events[0].obstacle.key, wall);
    }

    #[test]
    fn test_one_way_platform_pass_through_from_below() {
        let mut src = FreeObjectSource::new();
        src.push_with_sides(rect(0.0, 2.0, 3.0, 2.5), SideSet::TOP);
        let last = rect(1.0, 1.0, 2.0, 2.0);
        let tent = last.translated(Vec2::new(0.0, 1.0));
        let mut sink = EventSink::new();
        let out = collider()
            .resolve(last, tent, Vec2::new(0.0, 3.0), &src, &mut sink)
            .unwrap();
        assert_eq!(out.rect, tent);
        assert!(!out.bumped_y);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_one_way_platform_lands_from_above() {
        let mut src = FreeObjectSource::new();
        let plat = src.push_with_sides(rect(0.0, 2.0, 3.0, 2.5), SideSet::TOP);
        let last = rect(1.0, 3.0, 2.0, 4.0);
        let tent = last.translated(Vec2::new(0.0, -1.0));
        let mut sink = EventSink::new();
        let out = collider()
            .resolve(last, tent, Vec2::new(0.0, -3.0), &src, &mut sink)
            .unwrap();
        // Rests flush on top of the platform.
        assert_eq!(out.rect, rect(1.0, 2.5, 2.0, 3.5));
        assert!(out.bumped_y);
        assert_eq!(out.velocity, Vec2::ZERO);
        let events = sink.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].side, Side::Bottom);
        assert_eq!(events[0].obstacle.key, plat);
    }

    #[test]
    fn test_nearest_of_two_wins_both_notified() {
        // Push the far obstacle first so enumeration order cannot be what
        // picks the resting edge.
        let mut src = FreeObjectSource::new();
        let far = src.push(rect(3.5, 0.0, 4.5, 1.0));
        let near = src.push(rect(2.0, 0.0, 3.0, 1.0));
        let last = rect(0.0, 0.0, 1.0, 1.0);
        let tent = last.translated(Vec2::new(4.0, 0.0));
        let mut sink = EventSink::new();
        let out = collider()
            .resolve(last, tent, Vec2::new(8.0, 0.0), &src, &mut sink)
            .unwrap();
        assert_eq!(out.rect, rect(1.0, 0.0, 2.0, 1.0));
        assert!(out.bumped_x);
        let keys: Vec<ObKey> = sink.drain().iter().map(|e| e.obstacle.key).collect();
        assert!(keys.contains(&near));
        assert!(keys.contains(&far));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_zero_displacement_is_idempotent() {
        let mut src = FreeObjectSource::new();
        src.push(rect(1.0, 0.0, 2.0, 1.0)); // flush right wall
        src.push(rect(0.0, -1.0, 1.0, 0.0)); // flush floor
        let r = rect(0.0, 0.0, 1.0, 1.0);
        let out = collider()
            .resolve(r, r, Vec2::ZERO, &src, &mut ())
            .unwrap();
        assert_eq!(out.rect, r);
        assert_eq!(out.velocity, Vec2::ZERO);
        assert!(!out.bumped_x && !out.bumped_y);
    }

    #[test]
    fn test_inner_corner_flush_on_both_axes() {
        let mut src = FreeObjectSource::new();
        src.push(rect(2.0, 0.0, 3.0, 4.0)); // wall to the right
        src.push(rect(0.0, -1.0, 4.0, 0.5)); // floor below
        let last = rect(0.5, 0.5, 1.5, 1.5);
        let tent = last.translated(Vec2::new(1.0, -1.0));
        let mut sink = EventSink::new();
        let out = collider()
            .resolve(last, tent, Vec2::new(2.0, -2.0), &src, &mut sink)
            .unwrap();
        assert_eq!(out.rect, rect(1.0, 0.5, 2.0, 1.5));
        assert!(out.bumped_x && out.bumped_y);
        assert_eq!(out.velocity, Vec2::ZERO);
        let sides: Vec<Side> = sink.drain().iter().map(|e| e.side).collect();
        assert_eq!(sides, vec![Side::Right, Side::Bottom]);
    }

    #[test]
    fn test_slide_along_floor_keeps_vx() {
        let mut src = FreeObjectSource::new();
        src.push(rect(0.0, -1.0, 10.0, 0.0)); // floor, actor flush on top
        let last = rect(0.0, 0.0, 1.0, 1.0);
        let tent = last.translated(Vec2::new(1.0, 0.0));
        let out = collider()
            .resolve(last, tent, Vec2::new(4.0, 0.0), &src, &mut ())
            .unwrap();
        // Flush floor tiles are not x-blockers and y is not even queried.
        assert_eq!(out.rect, tent);
        assert_eq!(out.velocity, Vec2::new(4.0, 0.0));
        assert!(!out.bumped_x && !out.bumped_y);
    }

    #[test]
    fn test_stop_policy_slides_stop_all_freezes() {
        let mut src = FreeObjectSource::new();
        src.push(rect(1.5, -2.0, 2.5, 3.0));
        let last = rect(0.0, 0.0, 1.0, 1.0);
        let tent = last.translated(Vec2::new(1.0, 0.5));
        let vel = Vec2::new(2.0, 1.0);

        let out = MapCollider::with_policy(BumpPolicy::Stop)
            .resolve(last, tent, vel, &src, &mut ())
            .unwrap();
        assert!(out.bumped_x && !out.bumped_y);
        assert_eq!(out.velocity, Vec2::new(0.0, 1.0));

        let out = MapCollider::with_policy(BumpPolicy::StopAll)
            .resolve(last, tent, vel, &src, &mut ())
            .unwrap();
        assert_eq!(out.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_bounce_policy_reflects_bumped_axis() {
        let mut src = FreeObjectSource::new();
        src.push(rect(0.0, -2.0, 8.0, 0.0));
        let last = rect(1.0, 0.5, 2.0, 1.5);
        let tent = last.translated(Vec2::new(0.5, -1.0));
        let out = MapCollider::with_policy(BumpPolicy::Bounce { restitution: 0.5 })
            .resolve(last, tent, Vec2::new(1.0, -2.0), &src, &mut ())
            .unwrap();
        assert!(out.bumped_y && !out.bumped_x);
        assert_eq!(out.velocity, Vec2::new(1.0, 1.0));
        assert_eq!(out.rect.min.y, 0.0);
    }

    #[test]
    fn test_query_error_propagates() {
        struct BrokenSource;
        impl crate::api::ObstacleSource for BrokenSource {
            fn query(&self, region: Rect) -> Result<Vec<Obstacle>, QueryError> {
                Err(QueryError::OutOfBounds(region))
            }
            fn blocks(&self, _obstacle: Obstacle, _face: Side) -> bool {
                true
            }
        }
        let last = rect(0.0, 0.0, 1.0, 1.0);
        let tent = last.translated(Vec2::new(1.0, 0.0));
        let err = collider()
            .resolve(last, tent, Vec2::new(2.0, 0.0), &BrokenSource, &mut ())
            .unwrap_err();
        assert!(matches!(err, ResolveError::Query(QueryError::OutOfBounds(_))));
    }

    #[test]
    fn test_overlapping_start_is_skipped_best_effort() {
        let mut src = FreeObjectSource::new();
        src.push(rect(0.5, 0.0, 1.5, 1.0)); // already overlaps `last`
        let last = rect(0.0, 0.0, 1.0, 1.0);
        let tent = last.translated(Vec2::new(0.2, 0.0));
        let out = collider()
            .resolve(last, tent, Vec2::new(1.0, 0.0), &src, &mut ())
            .unwrap();
        // Logged and ignored: the call proceeds without clipping against it.
        assert_eq!(out.rect, tent);
        assert!(!out.bumped_x);
    }

    #[test]
    fn test_tile_column_notifies_every_touched_tile() {
        // 1x1 tiles; a wall column at x=2 spanning y=0..3.
        let mut src = UniformTileSource::new(8, 4, 1.0);
        for y in 0..3 {
            src.set(2, y, true);
        }
        // Actor two tiles tall, straddling y=0..2.
        let last = rect(0.5, 0.0, 1.5, 2.0);
        let tent = last.translated(Vec2::new(1.0, 0.0));
        let mut sink = EventSink::new();
        let out = collider()
            .resolve(last, tent, Vec2::new(4.0, 0.0), &src, &mut sink)
            .unwrap();
        assert_eq!(out.rect, rect(1.0, 0.0, 2.0, 2.0));
        assert!(out.bumped_x);
        let events = sink.drain();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.side == Side::Right));
    }

    #[test]
    fn test_secret_passage_side_cleared() {
        // Tile blocks every face except its left: walking in from the left
        // passes, dropping onto it from above still lands.
        let mut src = PropertyTileSource::new(4, 4, 1.0);
        src.set(2, 1, SideSet::ALL.without(Side::Left));
        let last = rect(0.5, 1.0, 1.5, 2.0);
        let tent = last.translated(Vec2::new(1.0, 0.0));
        let out = collider()
            .resolve(last, tent, Vec2::new(2.0, 0.0), &src, &mut ())
            .unwrap();
        assert_eq!(out.rect, tent);
        assert!(!out.bumped_x);

        let last = rect(2.0, 2.5, 3.0, 3.5);
        let tent = last.translated(Vec2::new(0.0, -1.0));
        let out = collider()
            .resolve(last, tent, Vec2::new(0.0, -2.0), &src, &mut ())
            .unwrap();
        assert!(out.bumped_y);
        assert_eq!(out.rect.min.y, 2.0);
    }
}
