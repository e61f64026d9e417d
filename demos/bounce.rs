use glam::Vec2;
use thud::*;

const DT: f32 = 1.0 / 60.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // A 10x10 box made of four free-form walls.
    let mut walls = FreeObjectSource::new();
    walls.push(Rect::new(Vec2::new(-1.0, 0.0), Vec2::new(0.0, 10.0)));
    walls.push(Rect::new(Vec2::new(10.0, 0.0), Vec2::new(11.0, 10.0)));
    walls.push(Rect::new(Vec2::new(0.0, -1.0), Vec2::new(10.0, 0.0)));
    walls.push(Rect::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 11.0)));

    let collider = MapCollider::with_policy(BumpPolicy::Bounce { restitution: 0.9 });

    let mut rect = Rect::from_center(Vec2::new(5.0, 5.0), Vec2::splat(0.4));
    let mut vel = Vec2::new(9.0, 4.5);

    for tick in 0..600 {
        let tentative = rect.translated(vel * DT);
        let out = collider
            .resolve(rect, tentative, vel, &walls, &mut ())
            .expect("wall query failed");
        if out.bumped_x || out.bumped_y {
            let c = out.rect.center();
            println!(
                "tick {tick:3}: bounce at ({:.2}, {:.2}), vel ({:.2}, {:.2}) -> ({:.2}, {:.2})",
                c.x, c.y, vel.x, vel.y, out.velocity.x, out.velocity.y
            );
        }
        rect = out.rect;
        vel = out.velocity;
    }
}
