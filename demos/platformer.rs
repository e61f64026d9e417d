use glam::Vec2;
use thud::*;

const DT: f32 = 1.0 / 60.0;
const GRAVITY: f32 = -30.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let map = UniformTileSource::from_rows(
        1.0,
        &[
            "#........#",
            "#........#",
            "#....#...#",
            "#....#...#",
            "##########",
        ],
    );

    let collider = MapCollider::with_policy(BumpPolicy::Stop);
    let mut sink = EventSink::new();

    // 1x1 actor dropped near the left wall, running right.
    let mut rect = Rect::from_center(Vec2::new(2.0, 3.5), Vec2::splat(0.5));
    let mut vel = Vec2::new(6.0, 0.0);

    for tick in 0..120 {
        vel.y += GRAVITY * DT;
        let tentative = rect.translated(vel * DT);
        let out = collider
            .resolve(rect, tentative, vel, &map, &mut sink)
            .expect("map query failed");
        rect = out.rect;
        vel = out.velocity;
        vel.x = 6.0; // keep running into the pillar

        for ev in sink.drain() {
            println!(
                "tick {tick:3}: bumped {:?} on tile {} at ({:.2}, {:.2})",
                ev.side,
                ev.obstacle.key,
                ev.obstacle.rect.min.x,
                ev.obstacle.rect.min.y
            );
        }
        if tick % 20 == 0 {
            let c = rect.center();
            println!("tick {tick:3}: center=({:.2}, {:.2}) vel=({:.2}, {:.2})", c.x, c.y, vel.x, vel.y);
        }
    }
}
