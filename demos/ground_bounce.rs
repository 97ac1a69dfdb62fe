use glam::Vec2;
use impulse2d::*;

fn main() -> Result<()> {
    let mut world = PhysicsWorld::new(WorldConfig::default())?;

    let ground_body = world.create_body();
    world.body_mut(ground_body)?.kind = BodyKind::Static;
    let ground = world.create_collider(ground_body)?;
    world.collider_mut(ground)?.shape =
        Rectangle::new(Vec2::new(-20.0, -1.0), Vec2::new(20.0, 0.0)).into();

    let mut balls = Vec::new();
    for i in 0..5 {
        let body = world.create_body();
        {
            let b = world.body_mut(body)?;
            b.position = Vec2::new(-8.0 + 4.0 * i as f32, 5.0 + i as f32);
            b.mass = 1.0 + i as f32;
        }
        let col = world.create_collider(body)?;
        {
            let c = world.collider_mut(col)?;
            c.shape = Circle::with_radius(0.5).into();
            c.restitution = 0.6;
        }
        balls.push(body);
    }

    let gravity = Vec2::new(0.0, -9.81);
    let dt = 1.0 / 60.0;
    for step in 0..240 {
        for &b in &balls {
            let body = world.body_mut(b)?;
            let weight = gravity * body.mass;
            body.apply_force(weight);
        }
        world.update(dt)?;

        if step % 30 == 0 {
            let heights: Vec<String> = balls
                .iter()
                .map(|&b| world.body(b).map(|b| format!("{:.2}", b.position.y)))
                .collect::<Result<_>>()?;
            println!("t={:.2}s heights=[{}]", step as f32 * dt, heights.join(", "));
        }
    }

    let stats = world.debug_stats();
    println!(
        "bodies={} colliders={} leaves={} candidate_pairs={}",
        stats.bodies, stats.colliders, stats.leaves, stats.candidate_pairs
    );
    Ok(())
}
